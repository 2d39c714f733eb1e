//! Platycerium Species Hierarchy
//!
//! Classifies staghorn-fern posts by main species and variety from two noisy
//! signals (caption titles and self-tracking hashtags) and groups them into a
//! browsable taxonomy.
//!
//! Stages:
//! - `classify`: per-post classification records with a confidence tier
//! - `aggregate`: grouping by self-tag, main-species votes, display names
//! - `repair`: vote/display-name consistency, final groups
//! - `hierarchy`: species → sub-species index
//! - `export`: index JSON, per-group JSON, review CSV
//!
//! Supporting modules:
//! - `species`: the closed set of 18 pure species
//! - `extract`: caption, self-tag and hashtag extractors
//! - `utils`: name normalization, ordered tallies, caption text helpers
//! - `data`: post archive loading
//! - `config` / `pipeline`: run configuration and coordination

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod data;
pub mod export;
pub mod extract;
pub mod hierarchy;
pub mod pipeline;
pub mod repair;
pub mod species;
pub mod utils;

// Re-export commonly used types
pub use aggregate::{aggregate, ClassifiedPost, ProvisionalIndex, SubspeciesGroup};
pub use classify::{similarity, Classification, Classifier, Confidence};
pub use config::PipelineConfig;
pub use data::{ArchiveError, Post, PostArchive, PostImage};
pub use export::{render, RenderedArtifacts};
pub use extract::{CaptionExtractor, SelfTagExtractor};
pub use hierarchy::{build_hierarchy, EntryKind, GroupSummary, HierarchyEntry, SpeciesHierarchy};
pub use pipeline::{run, ClassificationStats, PipelineOutput, RunSummary, SpeciesPipeline};
pub use repair::{repair, FinalGroup, RepairReport, RepairedIndex};
pub use species::PureSpecies;
pub use utils::{Normalizer, VarietyDictionary};
