//! Self-Tag Extraction
//!
//! The poster tracks individual plants with hashtags carrying a fixed marker
//! (`#ジサクボ<name>`). Each distinct self-tag on a post becomes its own
//! classification.

use smallvec::SmallVec;

/// Marker used by the archive's author.
pub const DEFAULT_MARKER: &str = "ジサクボ";

/// Self-tags of one post; almost always one or two.
pub type SelfTags = SmallVec<[String; 2]>;

/// Pulls tracking tags out of a post's hashtag list
#[derive(Debug, Clone)]
pub struct SelfTagExtractor {
    marker: String,
}

impl SelfTagExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Hashtags containing the marker, each starting with `#`.
    ///
    /// Input order is kept and repeats are dropped, so grouping downstream
    /// is first-seen-first.
    pub fn extract_self_tags<S: AsRef<str>>(&self, hashtags: &[S]) -> SelfTags {
        let mut tags = SelfTags::new();
        if self.marker.is_empty() {
            return tags;
        }

        for raw in hashtags {
            let raw = raw.as_ref().trim();
            if !raw.contains(self.marker.as_str()) {
                continue;
            }
            let tag = if raw.starts_with('#') {
                raw.to_string()
            } else {
                format!("#{}", raw)
            };
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        tags
    }

    /// Raw variety text carried by a self-tag: the tag without its leading
    /// `#` and without the marker. None when nothing is left.
    pub fn tag_variety(&self, tag: &str) -> Option<String> {
        let body = tag.trim_start_matches('#');
        let variety = if self.marker.is_empty() {
            body.to_string()
        } else {
            body.replace(self.marker.as_str(), "")
        };
        let variety = variety.trim();
        if variety.is_empty() {
            None
        } else {
            Some(variety.to_string())
        }
    }
}

impl Default for SelfTagExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}
