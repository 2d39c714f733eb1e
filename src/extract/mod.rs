//! Signal extractors
//!
//! Each extractor reads one noisy signal from a post:
//! - `caption`: title line → hybrid flag, main species, variety
//! - `self_tag`: hashtags → tracking tags and their variety text
//! - `hashtag_species`: hashtags → main species (fallback for untitled posts)

pub mod caption;
pub mod hashtag_species;
pub mod self_tag;

pub use caption::{
    extract_main_species, has_genus_prefix, is_hybrid, CaptionExtractor, NamedHybrid, QuotedName,
    SpeciesFollower, VarietyStrategy,
};
pub use hashtag_species::species_from_hashtags;
pub use self_tag::{SelfTagExtractor, SelfTags, DEFAULT_MARKER};
