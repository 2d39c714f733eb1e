//! Pipeline Coordinator
//!
//! Runs the stages in order over one post archive:
//! 1. Classify every post (input order)
//! 2. Aggregate classifications by self-tag
//! 3. Repair display names and main species
//! 4. Build the hierarchical index
//!
//! `SpeciesPipeline::run` is pure; `run` adds archive loading and export.

use crate::aggregate::{aggregate, ClassifiedPost};
use crate::classify::{Classifier, Confidence};
use crate::config::PipelineConfig;
use crate::data::{Post, PostArchive};
use crate::export;
use crate::hierarchy::{build_hierarchy, SpeciesHierarchy};
use crate::repair::{repair, RepairReport, RepairedIndex};
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Classification count per confidence tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

impl ClassificationStats {
    pub fn record(&mut self, confidence: Confidence) {
        match confidence {
            Confidence::High => self.high += 1,
            Confidence::Medium => self.medium += 1,
            Confidence::Low => self.low += 1,
            Confidence::None => self.none += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.none
    }

    /// (high + medium) / (high + medium + low) as a percentage with one
    /// decimal; 0 when nothing was judged.
    pub fn accuracy(&self) -> f64 {
        let judged = self.high + self.medium + self.low;
        if judged == 0 {
            return 0.0;
        }
        let percent = (self.high + self.medium) as f64 / judged as f64 * 100.0;
        (percent * 10.0).round() / 10.0
    }
}

/// Everything one run derives from the posts
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub total_posts: usize,
    /// All classification records, in input order
    pub classified: Vec<ClassifiedPost>,
    pub stats: ClassificationStats,
    pub index: RepairedIndex,
    pub hierarchy: SpeciesHierarchy,
    pub dictionary_version: String,
}

impl PipelineOutput {
    /// Low and medium records, in input order
    pub fn review_items(&self) -> impl Iterator<Item = &ClassifiedPost> {
        self.classified
            .iter()
            .filter(|item| item.classification.confidence.needs_review())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_posts: self.total_posts,
            total_groups: self.index.groups.len(),
            stats: self.stats,
            accuracy: self.stats.accuracy(),
            repairs: self.index.report,
            review_items: self.review_items().count(),
        }
    }
}

/// Printed at the end of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_posts: usize,
    pub total_groups: usize,
    pub stats: ClassificationStats,
    pub accuracy: f64,
    pub repairs: RepairReport,
    pub review_items: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classification summary")?;
        writeln!(f, "  Posts:                    {}", self.total_posts)?;
        writeln!(f, "  Groups:                   {}", self.total_groups)?;
        writeln!(f, "  Classifications:          {}", self.stats.total())?;
        writeln!(f, "    high:                   {}", self.stats.high)?;
        writeln!(f, "    medium:                 {}", self.stats.medium)?;
        writeln!(f, "    low:                    {}", self.stats.low)?;
        writeln!(f, "    none:                   {}", self.stats.none)?;
        writeln!(f, "  Inconsistencies repaired: {}", self.repairs.inconsistencies_repaired)?;
        writeln!(f, "  Invalid species forced:   {}", self.repairs.invalid_main_species_forced)?;
        writeln!(f, "  Flagged for review:       {}", self.review_items)?;
        write!(f, "  Accuracy:                 {:.1}%", self.accuracy)
    }
}

pub struct SpeciesPipeline {
    classifier: Classifier,
}

impl SpeciesPipeline {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Dictionary and marker from the config; a bad dictionary file fails here.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let normalizer = Arc::new(config.normalizer()?);
        Ok(Self::new(Classifier::new(normalizer, config.self_tags())))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn classify_all(&self, posts: &[Post]) -> Vec<ClassifiedPost> {
        posts
            .iter()
            .flat_map(|post| {
                self.classifier
                    .classify(post)
                    .into_iter()
                    .map(move |classification| ClassifiedPost {
                        post: post.clone(),
                        classification,
                    })
            })
            .collect()
    }

    pub fn run(&self, posts: &[Post]) -> PipelineOutput {
        let start = Instant::now();

        let classified = self.classify_all(posts);
        let mut stats = ClassificationStats::default();
        for item in &classified {
            stats.record(item.classification.confidence);
        }
        info!(
            posts = posts.len(),
            classifications = classified.len(),
            "classified posts"
        );

        let provisional = aggregate(&classified);
        info!(groups = provisional.groups.len(), "aggregated self-tag groups");

        let index = repair(provisional);
        info!(
            inconsistencies = index.report.inconsistencies_repaired,
            forced_null = index.report.invalid_main_species_forced,
            "repaired groups"
        );

        let hierarchy = build_hierarchy(&index.groups);
        info!(
            entries = hierarchy.hierarchy.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built hierarchy"
        );

        PipelineOutput {
            total_posts: posts.len(),
            classified,
            stats,
            index,
            hierarchy,
            dictionary_version: self.classifier.normalizer().version().to_string(),
        }
    }
}

/// Load, classify, render and write one archive.
///
/// Every artifact is rendered before the first write, so any failure up to
/// that point leaves the output directory untouched.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let pipeline = SpeciesPipeline::from_config(config)?;

    info!(input = %config.input.display(), "loading post archive");
    let archive = PostArchive::load(&config.input)?;

    let output = pipeline.run(&archive.posts);
    let artifacts = export::render(&output)?;
    artifacts.write(config)?;

    Ok(output.summary())
}
