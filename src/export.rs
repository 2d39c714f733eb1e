//! Artifact Export
//!
//! Renders the three run artifacts into memory, then writes them:
//! - `species-hierarchy-index.json`: meta, flat group list, hierarchy
//! - `species/<id>.json`: one document per group
//! - `low-confidence-classifications.csv`: low/medium records for review
//!
//! Nothing is written until every artifact has rendered. Per-group files
//! left over from earlier runs are removed after the new ones are written.

use crate::aggregate::ClassifiedPost;
use crate::config::PipelineConfig;
use crate::data::Post;
use crate::hierarchy::{GroupSummary, HierarchyEntry};
use crate::pipeline::{ClassificationStats, PipelineOutput};
use crate::repair::FinalGroup;
use crate::species::PureSpecies;
use crate::utils::caption_preview;
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// Index document
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta<'a> {
    pub total_posts: usize,
    pub total_species: usize,
    pub total_classifications: usize,
    pub classification_stats: ClassificationStats,
    pub accuracy: f64,
    pub inconsistencies_repaired: usize,
    pub invalid_main_species_forced: usize,
    pub dictionary_version: &'a str,
}

#[derive(Debug, Serialize)]
pub struct IndexDocument<'a> {
    pub meta: IndexMeta<'a>,
    pub species: &'a [GroupSummary],
    pub hierarchy: &'a [HierarchyEntry],
}

impl<'a> IndexDocument<'a> {
    pub fn from_output(output: &'a PipelineOutput) -> Self {
        Self {
            meta: IndexMeta {
                total_posts: output.total_posts,
                total_species: output.index.groups.len(),
                total_classifications: output.stats.total(),
                classification_stats: output.stats,
                accuracy: output.stats.accuracy(),
                inconsistencies_repaired: output.index.report.inconsistencies_repaired,
                invalid_main_species_forced: output.index.report.invalid_main_species_forced,
                dictionary_version: &output.dictionary_version,
            },
            species: &output.hierarchy.species,
            hierarchy: &output.hierarchy.hierarchy,
        }
    }
}

// ============================================================================
// Per-group document
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LatestPost<'a> {
    pub id: &'a str,
    pub date: String,
    pub image: Option<&'a str>,
    pub caption: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupHeader<'a> {
    pub id: &'a str,
    pub main_species: Option<PureSpecies>,
    pub main_species_votes: Vec<VoteCount<'a>>,
    pub tag: &'a str,
    pub display_name: &'a str,
    pub count: usize,
    pub latest_post: Option<LatestPost<'a>>,
}

/// Votes of one species, in first-seen order
#[derive(Debug, Serialize)]
pub struct VoteCount<'a> {
    pub species: &'a str,
    pub votes: usize,
}

#[derive(Debug, Serialize)]
pub struct GroupDocument<'a> {
    pub species: GroupHeader<'a>,
    /// Member posts with `metadata.classification` merged in
    pub posts: Vec<Post>,
}

impl<'a> GroupDocument<'a> {
    pub fn from_group(group: &'a FinalGroup) -> Self {
        let latest_post = group.latest_post().map(|m| LatestPost {
            id: &m.post.id,
            date: m.post.display_date(),
            image: m.post.first_image(),
            caption: caption_preview(&m.post.caption),
        });

        Self {
            species: GroupHeader {
                id: &group.id,
                main_species: group.main_species,
                main_species_votes: group
                    .main_species_votes
                    .iter()
                    .map(|(species, votes)| VoteCount { species, votes: *votes })
                    .collect(),
                tag: &group.tag,
                display_name: &group.display_name,
                count: group.count(),
                latest_post,
            },
            posts: group.posts.iter().map(annotated_post).collect(),
        }
    }
}

/// The post with its classification added to (not replacing) its metadata.
fn annotated_post(member: &ClassifiedPost) -> Post {
    let mut post = member.post.clone();
    post.metadata.insert(
        "classification".to_string(),
        json!({
            "confidence": member.classification.confidence.as_str(),
            "reason": member.classification.reason,
        }),
    );
    post
}

// ============================================================================
// Review sheet
// ============================================================================

/// Review sheet columns, in output order
pub const REVIEW_COLUMNS: [&str; 10] = [
    "post_id",
    "date",
    "confidence",
    "species",
    "self_tag",
    "caption_variety",
    "hashtag_variety",
    "main_species",
    "reason",
    "caption_preview",
];

/// Cell text for a field the classification left empty
pub const MISSING_CELL: &str = "なし";

fn cell(value: Option<&str>) -> String {
    value.unwrap_or(MISSING_CELL).to_string()
}

/// One row per low/medium classification
pub fn review_frame<'a, I>(items: I) -> PolarsResult<DataFrame>
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    let mut post_id = Vec::new();
    let mut date = Vec::new();
    let mut confidence = Vec::new();
    let mut species = Vec::new();
    let mut self_tag = Vec::new();
    let mut caption_variety = Vec::new();
    let mut hashtag_variety = Vec::new();
    let mut main_species = Vec::new();
    let mut reason = Vec::new();
    let mut preview = Vec::new();

    for item in items {
        let c = &item.classification;
        post_id.push(item.post.id.clone());
        date.push(item.post.display_date());
        confidence.push(c.confidence.as_str().to_string());
        species.push(cell(c.species.as_deref()));
        self_tag.push(cell(c.self_tag.as_deref()));
        caption_variety.push(cell(c.caption_variety.as_deref()));
        hashtag_variety.push(cell(c.hashtag_variety.as_deref()));
        main_species.push(cell(c.main_species.map(PureSpecies::id)));
        reason.push(c.reason.clone());
        preview.push(caption_preview(&item.post.caption));
    }

    df! {
        REVIEW_COLUMNS[0] => post_id,
        REVIEW_COLUMNS[1] => date,
        REVIEW_COLUMNS[2] => confidence,
        REVIEW_COLUMNS[3] => species,
        REVIEW_COLUMNS[4] => self_tag,
        REVIEW_COLUMNS[5] => caption_variety,
        REVIEW_COLUMNS[6] => hashtag_variety,
        REVIEW_COLUMNS[7] => main_species,
        REVIEW_COLUMNS[8] => reason,
        REVIEW_COLUMNS[9] => preview
    }
}

// ============================================================================
// Rendering and writing
// ============================================================================

/// All artifacts of one run, serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub index: Vec<u8>,
    /// (file name, contents) per group, in first-sighting order
    pub groups: Vec<(String, Vec<u8>)>,
    pub review_csv: Vec<u8>,
}

pub fn render(output: &PipelineOutput) -> Result<RenderedArtifacts> {
    let index = serde_json::to_vec_pretty(&IndexDocument::from_output(output))
        .context("Failed to serialize species index")?;

    let groups = output
        .index
        .groups
        .iter()
        .map(|group| -> Result<(String, Vec<u8>)> {
            let contents = serde_json::to_vec_pretty(&GroupDocument::from_group(group))
                .with_context(|| format!("Failed to serialize group {:?}", group.tag))?;
            Ok((format!("{}.json", group.id), contents))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut frame = review_frame(output.review_items()).context("Failed to build review sheet")?;
    let mut review_csv = Vec::new();
    CsvWriter::new(&mut review_csv)
        .include_header(true)
        .finish(&mut frame)
        .context("Failed to render review sheet CSV")?;

    Ok(RenderedArtifacts {
        index,
        groups,
        review_csv,
    })
}

impl RenderedArtifacts {
    pub fn write(&self, config: &PipelineConfig) -> Result<()> {
        let groups_dir = config.groups_dir();
        fs::create_dir_all(&groups_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", groups_dir))?;

        for (name, contents) in &self.groups {
            let path = groups_dir.join(name);
            write_file(&path, contents)?;
        }
        let removed = prune_stale(&groups_dir, &self.groups)?;

        write_file(&config.index_path(), &self.index)?;
        write_file(&config.review_path(), &self.review_csv)?;

        info!(
            output_dir = %config.output_dir().display(),
            groups = self.groups.len(),
            stale_removed = removed,
            "wrote artifacts"
        );
        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Remove `*.json` files in `dir` that this run did not produce.
fn prune_stale(dir: &Path, groups: &[(String, Vec<u8>)]) -> Result<usize> {
    let current: FxHashSet<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
    let mut removed = 0;

    let entries = fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))?;
    for entry in entries {
        let path = entry.with_context(|| format!("Failed to list {:?}", dir))?.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if path.is_file() && is_json && !current.contains(name) {
            fs::remove_file(&path).with_context(|| format!("Failed to remove stale {:?}", path))?;
            debug!(path = %path.display(), "removed stale group file");
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, Confidence};
    use crate::data::PostImage;

    fn item(id: &str, confidence: Confidence, caption: &str) -> ClassifiedPost {
        ClassifiedPost {
            post: Post::new(id, 1_700_000_000, caption, &[]),
            classification: Classification {
                species: Some("ナノ".to_string()),
                self_tag: None,
                confidence,
                reason: "caption variety 'ナノ' only (no self-tag)".to_string(),
                main_species: Some(PureSpecies::Ridleyi),
                caption_variety: Some("ナノ".to_string()),
                hashtag_variety: None,
            },
        }
    }

    #[test]
    fn test_review_frame_columns() {
        let items = vec![item("a", Confidence::Low, "P.ridleyi nano\nsecond line")];
        let frame = review_frame(&items).unwrap();
        assert_eq!(frame.height(), 1);
        let names: Vec<&str> = frame.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, REVIEW_COLUMNS.to_vec());
    }

    #[test]
    fn test_review_rows_mark_missing_fields() {
        let items = vec![item("a", Confidence::Medium, "P.ridleyi nano")];
        let mut frame = review_frame(&items).unwrap();
        let mut csv = Vec::new();
        CsvWriter::new(&mut csv).include_header(true).finish(&mut frame).unwrap();
        let text = String::from_utf8(csv).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("a,2023-11-14,medium,ナノ,なし,ナノ,なし,ridleyi,"));
    }

    #[test]
    fn test_group_document_keeps_ingested_fields() {
        let mut member = item("a", Confidence::Low, "P.ridleyi nano");
        let mut image = PostImage::new("img/a.jpg");
        image.extra.insert("alt".to_string(), json!("frond"));
        member.post.images.push(image);
        member.post.metadata.insert("originalId".to_string(), json!("abc"));
        member.post.extra.insert("permalink".to_string(), json!("https://example.com/p/a"));

        let group = FinalGroup {
            id: "t".to_string(),
            tag: "#t".to_string(),
            posts: vec![member],
            main_species_votes: vec![("ridleyi".to_string(), 1)],
            main_species: Some(PureSpecies::Ridleyi),
            display_name: "P.ridleyi nano".to_string(),
        };
        let json = serde_json::to_value(GroupDocument::from_group(&group)).unwrap();

        let post = &json["posts"][0];
        assert_eq!(post["images"][0]["alt"], "frond");
        assert_eq!(post["permalink"], "https://example.com/p/a");
        assert_eq!(post["metadata"]["originalId"], "abc");
        assert_eq!(post["metadata"]["classification"]["confidence"], "low");
        assert_eq!(json["species"]["mainSpeciesVotes"][0]["species"], "ridleyi");
        assert_eq!(json["species"]["mainSpeciesVotes"][0]["votes"], 1);
    }

    #[test]
    fn test_empty_review_frame_still_has_header() {
        let items: Vec<ClassifiedPost> = Vec::new();
        let mut frame = review_frame(&items).unwrap();
        let mut csv = Vec::new();
        CsvWriter::new(&mut csv).include_header(true).finish(&mut frame).unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(text.trim_end(), REVIEW_COLUMNS.join(","));
    }

    #[test]
    fn test_prune_removes_only_stale_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.json"), "{}").unwrap();
        fs::write(dir.path().join("old.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let groups = vec![("keep.json".to_string(), Vec::new())];
        assert_eq!(prune_stale(dir.path(), &groups).unwrap(), 1);
        assert!(dir.path().join("keep.json").exists());
        assert!(!dir.path().join("old.json").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
