//! Post Archive Loading
//!
//! Reads the ingested archive document (`{ "posts": [...] }`) produced by the
//! monthly-post ingestion step. Posts are immutable input: the pipeline never
//! rewrites them, it only attaches classifications alongside.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Conditions that stop a run before any artifact is written
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("post archive not found: {0}")]
    NotFound(String),

    #[error("post archive {0} contains no posts")]
    Empty(String),
}

/// Image reference carried through to per-group files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostImage {
    pub path: String,

    /// Ingestion fields (timestamp, alt, ...) passed through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostImage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extra: Map::new(),
        }
    }
}

/// One social-media entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Post {
    pub id: String,

    /// Epoch seconds
    #[serde(default)]
    pub timestamp: i64,

    /// Free text; the first line is the title
    #[serde(default, deserialize_with = "null_as_empty")]
    pub caption: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub hashtags: Vec<String>,

    /// Display date as supplied by ingestion (e.g. "2024-03-01")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<PostImage>,

    /// Ingestion metadata (source, originalId, ...)
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,

    /// Any other ingestion fields, passed through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    /// Minimal post (tests and benchmarks).
    pub fn new(id: impl Into<String>, timestamp: i64, caption: impl Into<String>, hashtags: &[&str]) -> Self {
        Self {
            id: id.into(),
            timestamp,
            caption: caption.into(),
            hashtags: hashtags.iter().map(|h| h.to_string()).collect(),
            date: None,
            images: Vec::new(),
            metadata: Map::new(),
            extra: Map::new(),
        }
    }

    /// Supplied date, or the timestamp as a UTC calendar date.
    pub fn display_date(&self) -> String {
        if let Some(date) = self.date.as_deref().filter(|d| !d.trim().is_empty()) {
            return date.to_string();
        }
        chrono::DateTime::from_timestamp(self.timestamp, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(|img| img.path.as_str())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The archive document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostArchive {
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl PostArchive {
    /// Load and validate the archive
    ///
    /// Fails when the file is missing, is not valid JSON, or holds no posts.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ArchiveError::NotFound(path.display().to_string()).into());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read post archive: {:?}", path))?;

        let archive = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse post archive JSON: {:?}", path))?;

        if archive.posts.is_empty() {
            return Err(ArchiveError::Empty(path.display().to_string()).into());
        }

        Ok(archive)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}
