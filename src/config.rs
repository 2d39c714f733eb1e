//! Run configuration

use crate::extract::{SelfTagExtractor, DEFAULT_MARKER};
use crate::utils::{Normalizer, VarietyDictionary};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "public/data/instagram-posts.json";
pub const DEFAULT_OUTPUT_DIR: &str = "public/data";

pub const INDEX_FILE: &str = "species-hierarchy-index.json";
pub const GROUPS_DIR: &str = "species";
pub const REVIEW_FILE: &str = "low-confidence-classifications.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Post archive (`{ "posts": [...] }`)
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Replacement variety dictionary; the built-in table when absent
    pub dictionary: Option<PathBuf>,
    /// Substring identifying self-tracking hashtags
    pub marker: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dictionary: None,
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(INDEX_FILE)
    }

    pub fn groups_dir(&self) -> PathBuf {
        self.output_dir.join(GROUPS_DIR)
    }

    pub fn review_path(&self) -> PathBuf {
        self.output_dir.join(REVIEW_FILE)
    }

    pub fn load_dictionary(&self) -> Result<VarietyDictionary> {
        match self.dictionary.as_deref() {
            Some(path) => VarietyDictionary::load(path),
            None => Ok(VarietyDictionary::builtin()),
        }
    }

    pub fn normalizer(&self) -> Result<Normalizer> {
        Ok(Normalizer::new(self.load_dictionary()?))
    }

    pub fn self_tags(&self) -> SelfTagExtractor {
        SelfTagExtractor::new(self.marker.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
