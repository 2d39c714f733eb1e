//! Post Classification
//!
//! Combines the caption and self-tag signals into classification records.
//! A post yields one classification per distinct self-tag (a post can show
//! several individually tracked plants), a single low-confidence record when
//! it has no self-tag but its caption names a variety, or nothing at all.
//!
//! Decision table per self-tag:
//!
//! | caption variety | tag variety | condition           | confidence |
//! |-----------------|-------------|---------------------|------------|
//! | present         | present     | similarity ≥ 0.9    | High       |
//! | present         | present     | similarity ≥ 0.7    | Medium     |
//! | present         | present     | similarity < 0.7    | Low        |
//! | present         | absent      |                     | Low        |
//! | absent          | present     | main species known  | High       |
//! | absent          | present     | hybrid              | High       |
//! | absent          | absent      |                     | None       |

use crate::data::Post;
use crate::extract::{
    extract_main_species, has_genus_prefix, is_hybrid, species_from_hashtags, CaptionExtractor,
    SelfTagExtractor,
};
use crate::species::PureSpecies;
use crate::utils::Normalizer;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Similarity at or above which both signals are taken to agree.
pub const HIGH_SIMILARITY: f64 = 0.9;

/// Similarity at or above which the signals partially agree.
pub const MEDIUM_SIMILARITY: f64 = 0.7;

/// How far the caption and tag signals agreed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Tier for two variety strings compared by `similarity`.
    pub fn from_similarity(score: f64) -> Self {
        if score >= HIGH_SIMILARITY {
            Confidence::High
        } else if score >= MEDIUM_SIMILARITY {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Whether a human should look at this record.
    pub fn needs_review(self) -> bool {
        matches!(self, Confidence::Low | Confidence::Medium)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one (post, self-tag) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Assigned variety (tag variety when tagged, caption variety otherwise)
    pub species: Option<String>,
    /// None only when the post had no self-tag
    pub self_tag: Option<String>,
    pub confidence: Confidence,
    /// Diagnostic text for reviewers; never branched on
    pub reason: String,
    pub main_species: Option<PureSpecies>,
    pub caption_variety: Option<String>,
    pub hashtag_variety: Option<String>,
}

/// Coarse four-tier similarity between two normalized variety strings.
///
/// 1.0 equal, 0.9 containment, 0.7 same first three characters, 0.3
/// otherwise; 0.0 when either side is empty. Comparison is on lowercased,
/// trimmed text.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a == b {
        return 1.0;
    }
    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        return 0.9;
    }

    let prefix_a: Vec<char> = a.chars().take(3).collect();
    let prefix_b: Vec<char> = b.chars().take(3).collect();
    if prefix_a.len() == 3 && prefix_a == prefix_b {
        return 0.7;
    }

    0.3
}

/// Turns posts into classification records
pub struct Classifier {
    captions: CaptionExtractor,
    self_tags: SelfTagExtractor,
}

impl Classifier {
    pub fn new(normalizer: Arc<Normalizer>, self_tags: SelfTagExtractor) -> Self {
        Self {
            captions: CaptionExtractor::new(normalizer),
            self_tags,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        self.captions.normalizer()
    }

    /// Main species of a post.
    ///
    /// Hybrid titles are always None. A title with a genus prefix decides
    /// on its own; otherwise the hashtags are consulted.
    pub fn main_species(&self, post: &Post) -> Option<PureSpecies> {
        if is_hybrid(&post.caption) {
            return None;
        }
        if has_genus_prefix(&post.caption) {
            return extract_main_species(&post.caption);
        }
        species_from_hashtags(post.hashtags.as_slice())
    }

    /// Classify one post.
    pub fn classify(&self, post: &Post) -> SmallVec<[Classification; 2]> {
        let main_species = self.main_species(post);
        let caption_variety = self.captions.extract_variety(&post.caption);
        let tags = self.self_tags.extract_self_tags(post.hashtags.as_slice());

        if tags.is_empty() {
            return match caption_variety {
                Some(variety) => SmallVec::from_elem(
                    Classification {
                        species: Some(variety.clone()),
                        self_tag: None,
                        confidence: Confidence::Low,
                        reason: format!("caption variety '{}' only (no self-tag)", variety),
                        main_species,
                        caption_variety: Some(variety),
                        hashtag_variety: None,
                    },
                    1,
                ),
                None => SmallVec::new(),
            };
        }

        tags.into_iter()
            .map(|tag| {
                let hashtag_variety = self
                    .self_tags
                    .tag_variety(&tag)
                    .and_then(|raw| self.normalizer().normalize(&raw));
                let (confidence, reason) = judge(
                    caption_variety.as_deref(),
                    hashtag_variety.as_deref(),
                    main_species,
                );
                Classification {
                    species: hashtag_variety.clone(),
                    self_tag: Some(tag),
                    confidence,
                    reason,
                    main_species,
                    caption_variety: caption_variety.clone(),
                    hashtag_variety,
                }
            })
            .collect()
    }
}

/// Confidence and reason for one self-tag.
fn judge(
    caption_variety: Option<&str>,
    hashtag_variety: Option<&str>,
    main_species: Option<PureSpecies>,
) -> (Confidence, String) {
    match (caption_variety, hashtag_variety) {
        (Some(caption), Some(tag)) => {
            let score = similarity(caption, tag);
            let confidence = Confidence::from_similarity(score);
            let percent = (score * 100.0).round();
            let reason = match confidence {
                Confidence::High => format!("normalized forms agree (similarity {}%)", percent),
                Confidence::Medium => format!("partial agreement (similarity {}%)", percent),
                _ => format!("forms disagree (caption '{}' vs tag '{}')", caption, tag),
            };
            (confidence, reason)
        }
        (Some(_), None) => (
            Confidence::Low,
            "caption extracted but no matching tag variety".to_string(),
        ),
        (None, Some(_)) => match main_species {
            Some(species) => (
                Confidence::High,
                format!("tag trusted + main species confirmed ({})", species),
            ),
            None => (Confidence::High, "self-tag trusted for hybrid".to_string()),
        },
        (None, None) => (
            Confidence::None,
            "self-tag carries no variety and caption names none".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn classifier() -> Classifier {
        Classifier::new(Arc::new(Normalizer::default()), SelfTagExtractor::default())
    }

    #[test]
    fn test_similarity_tiers() {
        assert_relative_eq!(similarity("ムーンライト", "ムーンライト"), 1.0);
        assert_relative_eq!(similarity("ムーンライト", "ムーンライトvp"), 0.9);
        assert_relative_eq!(similarity("ムーンライト", "ムーンストーン"), 0.7);
        assert_relative_eq!(similarity("ナノ", "オメガ"), 0.3);
        assert_relative_eq!(similarity("ab", "ac"), 0.3);
        assert_relative_eq!(similarity("", "x"), 0.0);
        assert_relative_eq!(similarity("Omega ", "omega"), 1.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let words = ["ムーンライト", "ムーンライトvp", "ムーンストーン", "nano", "nanox", "oz", ""];
        for a in words {
            for b in words {
                assert_relative_eq!(similarity(a, b), similarity(b, a));
            }
        }
    }

    #[test]
    fn test_confidence_is_monotonic_in_similarity() {
        let scores = [1.0, 0.9, 0.7];
        for (i, high) in scores.iter().enumerate() {
            for low in &scores[i..] {
                assert!(Confidence::from_similarity(*high) >= Confidence::from_similarity(*low));
            }
        }
        assert_eq!(Confidence::from_similarity(0.9), Confidence::High);
        assert_eq!(Confidence::from_similarity(0.7), Confidence::Medium);
        assert_eq!(Confidence::from_similarity(0.3), Confidence::Low);
    }

    #[test]
    fn test_tagged_post_with_agreeing_caption_is_high() {
        let post = Post::new("1", 0, "P.willinckii moonlight#vp", &["ジサクボムーンライトvp"]);
        let result = classifier().classify(&post);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].confidence, Confidence::High);
        assert_eq!(result[0].main_species, Some(PureSpecies::Willinckii));
        assert_eq!(result[0].self_tag.as_deref(), Some("#ジサクボムーンライトvp"));
        assert_eq!(result[0].species.as_deref(), Some("ムーンライトvp"));
    }

    #[test]
    fn test_untagged_post_with_caption_variety_is_low() {
        let c = classifier();
        let post = Post::new("2", 0, "P.ridleyi nano\nsmall original", &[]);
        let result = c.classify(&post);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].confidence, Confidence::Low);
        assert_eq!(result[0].species, c.normalizer().normalize("nano"));
        assert_eq!(result[0].main_species, Some(PureSpecies::Ridleyi));
        assert_eq!(result[0].self_tag, None);
    }

    #[test]
    fn test_post_without_signal_yields_nothing() {
        let post = Post::new("3", 0, "beautiful plant today", &["ビカクシダ"]);
        assert!(classifier().classify(&post).is_empty());
        let post = Post::new("4", 0, "", &[]);
        assert!(classifier().classify(&post).is_empty());
    }

    #[test]
    fn test_one_record_per_distinct_self_tag() {
        let post = Post::new(
            "5",
            0,
            "P.willinckii moonlight",
            &["ジサクボムーンライト", "ジサクボオメガ", "#ジサクボムーンライト"],
        );
        let result = classifier().classify(&post);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].confidence, Confidence::High);
        assert_eq!(result[1].confidence, Confidence::Low);
        assert!(result[1].reason.contains("disagree"));
    }

    #[test]
    fn test_partial_agreement_is_medium() {
        // "mutant" → ミュータント, tag ミューズ shares the first three characters
        let post = Post::new("6", 0, "P.hillii mutant", &["ジサクボミューズ"]);
        let result = classifier().classify(&post);
        assert_eq!(result[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_tag_only_rows() {
        let c = classifier();

        let pure = Post::new("7", 0, "P.veitchii", &["ジサクボシルバー"]);
        let result = c.classify(&pure);
        assert_eq!(result[0].confidence, Confidence::High);
        assert_eq!(result[0].main_species, Some(PureSpecies::Veitchii));

        let hybrid = Post::new("8", 0, "新芽が出ました", &["ジサクボエルサ"]);
        let result = c.classify(&hybrid);
        assert_eq!(result[0].confidence, Confidence::High);
        assert_eq!(result[0].main_species, None);
        assert_eq!(result[0].reason, "self-tag trusted for hybrid");
    }

    #[test]
    fn test_caption_without_tag_variety_is_low() {
        let post = Post::new("9", 0, "P.willinckii moonlight", &["#ジサクボ"]);
        let result = classifier().classify(&post);
        assert_eq!(result[0].confidence, Confidence::Low);
        assert_eq!(result[0].hashtag_variety, None);
    }

    #[test]
    fn test_bare_marker_without_caption_variety_is_none() {
        let post = Post::new("10", 0, "水やり", &["ジサクボ"]);
        let result = classifier().classify(&post);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].confidence, Confidence::None);
        assert_eq!(result[0].self_tag.as_deref(), Some("#ジサクボ"));
    }

    #[test]
    fn test_hashtag_fallback_only_without_prefix() {
        let c = classifier();
        let post = Post::new("11", 0, "ビーチーの貯水葉", &["ビーチー", "ジサクボシルバー"]);
        assert_eq!(c.main_species(&post), Some(PureSpecies::Veitchii));

        // a titled named hybrid does not fall back to hashtags
        let post = Post::new("12", 0, "P.Phenomenal", &["ビーチー"]);
        assert_eq!(c.main_species(&post), None);

        let post = Post::new("13", 0, "P.Elsa (willinckii x bifurcatum)", &["ビーチー"]);
        assert_eq!(c.main_species(&post), None);
    }
}
