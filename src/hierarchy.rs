//! Hierarchical Index Builder
//!
//! Arranges repaired groups under their main species:
//! - one entry per pure species that has at least one group
//! - exactly one hybrid entry holding every group without a main species
//!   (always emitted, possibly empty)
//!
//! Entries are sorted by total posts, sub-species by post count, both
//! descending. Sorts are stable, so ties keep first-sighting order.

use crate::repair::FinalGroup;
use crate::species::PureSpecies;
use serde::Serialize;

pub const HYBRID_ID: &str = "hybrid";
pub const HYBRID_NAME_JA: &str = "交配種";

/// Flat per-group record of the index document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: String,
    pub tag: String,
    pub main_species: Option<PureSpecies>,
    pub display_name: String,
    pub count: usize,
    pub file: String,
    pub latest_image: Option<String>,
    pub latest_post_date: Option<String>,
}

impl GroupSummary {
    pub fn from_group(group: &FinalGroup) -> Self {
        let latest = group.latest_post().map(|m| &m.post);
        Self {
            id: group.id.clone(),
            tag: group.tag.clone(),
            main_species: group.main_species,
            display_name: group.display_name.clone(),
            count: group.count(),
            file: format!("{}.json", group.id),
            latest_image: latest.and_then(|p| p.first_image()).map(str::to_string),
            latest_post_date: latest.map(|p| p.display_date()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Pure,
    Hybrid,
}

/// Sub-species reference inside a hierarchy entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSpeciesRef {
    pub id: String,
    pub tag: String,
    pub display_name: String,
    pub count: usize,
    pub file: String,
    pub latest_image: Option<String>,
}

impl From<&GroupSummary> for SubSpeciesRef {
    fn from(summary: &GroupSummary) -> Self {
        Self {
            id: summary.id.clone(),
            tag: summary.tag.clone(),
            display_name: summary.display_name.clone(),
            count: summary.count,
            file: summary.file.clone(),
            latest_image: summary.latest_image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    pub id: String,
    pub name: String,
    pub name_ja: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub total_posts: usize,
    pub sub_species_count: usize,
    pub sub_species: Vec<SubSpeciesRef>,
}

impl HierarchyEntry {
    fn pure(species: PureSpecies) -> Self {
        Self {
            id: species.id().to_string(),
            name: species.id().to_string(),
            name_ja: species.name_ja().to_string(),
            kind: EntryKind::Pure,
            total_posts: 0,
            sub_species_count: 0,
            sub_species: Vec::new(),
        }
    }

    fn hybrid() -> Self {
        Self {
            id: HYBRID_ID.to_string(),
            name: HYBRID_ID.to_string(),
            name_ja: HYBRID_NAME_JA.to_string(),
            kind: EntryKind::Hybrid,
            total_posts: 0,
            sub_species_count: 0,
            sub_species: Vec::new(),
        }
    }

    fn push(&mut self, summary: &GroupSummary) {
        self.total_posts += summary.count;
        self.sub_species.push(summary.into());
        self.sub_species_count = self.sub_species.len();
    }
}

/// The `species` and `hierarchy` sections of the index document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeciesHierarchy {
    /// All groups, by post count descending
    pub species: Vec<GroupSummary>,
    pub hierarchy: Vec<HierarchyEntry>,
}

impl SpeciesHierarchy {
    pub fn entry(&self, id: &str) -> Option<&HierarchyEntry> {
        self.hierarchy.iter().find(|e| e.id == id)
    }
}

pub fn build_hierarchy(groups: &[FinalGroup]) -> SpeciesHierarchy {
    let summaries: Vec<GroupSummary> = groups.iter().map(GroupSummary::from_group).collect();

    // Pure entries in first-sighting order of their species
    let mut pure: Vec<HierarchyEntry> = Vec::new();
    let mut hybrid = HierarchyEntry::hybrid();

    for summary in &summaries {
        match summary.main_species {
            Some(species) => {
                let slot = match pure.iter().position(|e| e.id == species.id()) {
                    Some(i) => i,
                    None => {
                        pure.push(HierarchyEntry::pure(species));
                        pure.len() - 1
                    }
                };
                pure[slot].push(summary);
            }
            None => hybrid.push(summary),
        }
    }

    let mut hierarchy = pure;
    hierarchy.push(hybrid);
    hierarchy.sort_by(|a, b| b.total_posts.cmp(&a.total_posts));
    for entry in &mut hierarchy {
        entry.sub_species.sort_by(|a, b| b.count.cmp(&a.count));
    }

    let mut species = summaries;
    species.sort_by(|a, b| b.count.cmp(&a.count));

    SpeciesHierarchy { species, hierarchy }
}
