//! Utility modules for species classification
//!
//! Contains shared functionality used across the pipeline stages:
//! - Normalization: dictionary-backed variety name canonicalization
//! - Tally: frequency counting with first-seen tie-break
//! - Text: caption title helpers

pub mod normalization;
pub mod tally;
pub mod text;

// Re-export commonly used types
pub use normalization::{clean_token, Normalizer, VarietyDictionary, BUILTIN_DICTIONARY_VERSION};
pub use tally::{most_frequent, OrderedTally};
pub use text::{caption_preview, first_line};
