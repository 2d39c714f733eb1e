//! Consistency Repair
//!
//! The provisional display name of a group is chosen from free-text titles and
//! can imply a different main species than the group's vote. The vote is
//! authoritative: when the display name re-parses to another species, the name
//! is re-selected from titles consistent with the vote. Vote ids outside the
//! pure-species catalogue are forced to null.
//!
//! Repair also assigns every group its file-safe id.

use crate::aggregate::{most_frequent_title_for, ClassifiedPost, ProvisionalIndex, SubspeciesGroup};
use crate::extract::extract_main_species;
use crate::species::PureSpecies;
use rustc_hash::FxHashMap;
use tracing::warn;

/// A group after repair; never mutated afterwards
#[derive(Debug, Clone)]
pub struct FinalGroup {
    /// File-safe id, unique within the run
    pub id: String,
    pub tag: String,
    pub posts: Vec<ClassifiedPost>,
    pub main_species_votes: Vec<(String, usize)>,
    pub main_species: Option<PureSpecies>,
    pub display_name: String,
}

impl FinalGroup {
    pub fn count(&self) -> usize {
        self.posts.len()
    }

    /// Member with the greatest timestamp; the earliest member wins ties.
    pub fn latest_post(&self) -> Option<&ClassifiedPost> {
        self.posts.iter().fold(None, |best: Option<&ClassifiedPost>, m| match best {
            Some(b) if b.post.timestamp >= m.post.timestamp => Some(b),
            _ => Some(m),
        })
    }
}

/// Counters reported in the run summary and index meta
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub inconsistencies_repaired: usize,
    pub invalid_main_species_forced: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RepairedIndex {
    /// First-sighting order, as aggregated
    pub groups: Vec<FinalGroup>,
    pub report: RepairReport,
}

/// Finalize every provisional group.
pub fn repair(provisional: ProvisionalIndex) -> RepairedIndex {
    let mut report = RepairReport::default();
    let mut ids = FileIds::default();

    let groups = provisional
        .groups
        .into_iter()
        .map(|group| {
            let display_name = repair_display_name(&group, &mut report);
            let main_species = validate_main_species(&group, &mut report);
            FinalGroup {
                id: ids.assign(&group.tag),
                tag: group.tag,
                posts: group.posts,
                main_species_votes: group.main_species_votes,
                main_species,
                display_name,
            }
        })
        .collect();

    RepairedIndex { groups, report }
}

fn repair_display_name(group: &SubspeciesGroup, report: &mut RepairReport) -> String {
    let Some(implied) = extract_main_species(&group.display_name) else {
        return group.display_name.clone();
    };
    let vote = group.main_species.as_deref();
    if Some(implied.id()) == vote {
        return group.display_name.clone();
    }

    report.inconsistencies_repaired += 1;
    let replacement = most_frequent_title_for(group, vote);
    warn!(
        tag = %group.tag,
        display_name = %group.display_name,
        implied = %implied,
        vote = vote.unwrap_or("null"),
        replacement = replacement.as_deref().unwrap_or("(kept)"),
        "display name contradicts main-species vote"
    );
    replacement.unwrap_or_else(|| group.display_name.clone())
}

fn validate_main_species(group: &SubspeciesGroup, report: &mut RepairReport) -> Option<PureSpecies> {
    let id = group.main_species.as_deref()?;
    let species = PureSpecies::from_id(id);
    if species.is_none() {
        report.invalid_main_species_forced += 1;
        warn!(tag = %group.tag, main_species = id, "main species outside catalogue, forced to null");
    }
    species
}

/// Tag → file id, with `-2`, `-3`... on collision
#[derive(Default)]
struct FileIds {
    used: FxHashMap<String, usize>,
}

impl FileIds {
    fn assign(&mut self, tag: &str) -> String {
        let base = file_id(tag);
        let mut n = *self.used.get(&base).unwrap_or(&0);
        let mut candidate = base.clone();
        while self.used.contains_key(&candidate) {
            n += 1;
            candidate = format!("{}-{}", base, n + 1);
        }
        self.used.insert(base, n);
        self.used.entry(candidate.clone()).or_insert(0);
        candidate
    }
}

/// Tag without `#`, lowercased; characters unsafe in file names become `_`.
pub fn file_id(tag: &str) -> String {
    let id: String = tag
        .trim()
        .trim_start_matches('#')
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if id.is_empty() {
        "group".to_string()
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, Confidence};
    use crate::data::Post;

    fn member(id: &str, timestamp: i64, caption: &str, species: Option<PureSpecies>) -> ClassifiedPost {
        ClassifiedPost {
            post: Post::new(id, timestamp, caption, &[]),
            classification: Classification {
                species: None,
                self_tag: Some("#ジサクボシルバー".to_string()),
                confidence: Confidence::High,
                reason: String::new(),
                main_species: species,
                caption_variety: None,
                hashtag_variety: None,
            },
        }
    }

    fn group(tag: &str, vote: Option<&str>, display_name: &str, posts: Vec<ClassifiedPost>) -> SubspeciesGroup {
        SubspeciesGroup {
            tag: tag.to_string(),
            posts,
            main_species_votes: vote.map(|v| vec![(v.to_string(), 1)]).unwrap_or_default(),
            main_species: vote.map(str::to_string),
            display_name: display_name.to_string(),
        }
    }

    #[test]
    fn test_display_name_replaced_by_vote_consistent_title() {
        let provisional = ProvisionalIndex {
            groups: vec![group(
                "#ジサクボシルバー",
                Some("veitchii"),
                "P.bifurcatum silver",
                vec![
                    member("1", 1, "P.bifurcatum silver", Some(PureSpecies::Veitchii)),
                    member("2", 2, "P.veitchii silver", Some(PureSpecies::Veitchii)),
                ],
            )],
        };

        let repaired = repair(provisional);
        assert_eq!(repaired.report.inconsistencies_repaired, 1);
        assert_eq!(repaired.groups[0].display_name, "P.veitchii silver");
        assert_eq!(repaired.groups[0].main_species, Some(PureSpecies::Veitchii));
    }

    #[test]
    fn test_inconsistent_name_kept_without_alternative() {
        let provisional = ProvisionalIndex {
            groups: vec![group(
                "#t",
                Some("veitchii"),
                "P.bifurcatum silver",
                vec![member("1", 1, "P.bifurcatum silver", Some(PureSpecies::Veitchii))],
            )],
        };
        let repaired = repair(provisional);
        assert_eq!(repaired.report.inconsistencies_repaired, 1);
        assert_eq!(repaired.groups[0].display_name, "P.bifurcatum silver");
    }

    #[test]
    fn test_consistent_and_speciesless_names_untouched() {
        let provisional = ProvisionalIndex {
            groups: vec![
                group("#a", Some("ridleyi"), "P.ridleyi", vec![member("1", 1, "P.ridleyi", None)]),
                group("#b", Some("ridleyi"), "新芽", vec![member("2", 1, "新芽", None)]),
            ],
        };
        let repaired = repair(provisional);
        assert_eq!(repaired.report, RepairReport::default());
        assert_eq!(repaired.groups[1].display_name, "新芽");
    }

    #[test]
    fn test_unknown_vote_forced_to_null() {
        let provisional = ProvisionalIndex {
            groups: vec![group("#t", Some("elsa"), "P.Elsa", vec![member("1", 1, "P.Elsa", None)])],
        };
        let repaired = repair(provisional);
        assert_eq!(repaired.report.invalid_main_species_forced, 1);
        assert_eq!(repaired.report.inconsistencies_repaired, 0);
        assert_eq!(repaired.groups[0].main_species, None);
    }

    #[test]
    fn test_file_ids_are_unique() {
        let provisional = ProvisionalIndex {
            groups: vec![
                group("#ジサクボABC", None, "a", vec![]),
                group("#ジサクボabc", None, "b", vec![]),
                group("ジサクボabc", None, "c", vec![]),
                group("#ジサクボa/b", None, "d", vec![]),
            ],
        };
        let ids: Vec<String> = repair(provisional).groups.into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["ジサクボabc", "ジサクボabc-2", "ジサクボabc-3", "ジサクボa_b"]);
    }

    #[test]
    fn test_latest_post_prefers_earliest_on_ties() {
        let g = FinalGroup {
            id: "t".to_string(),
            tag: "#t".to_string(),
            posts: vec![member("1", 5, "", None), member("2", 9, "", None), member("3", 9, "", None)],
            main_species_votes: vec![],
            main_species: None,
            display_name: "t".to_string(),
        };
        assert_eq!(g.latest_post().map(|m| m.post.id.as_str()), Some("2"));
        assert_eq!(g.count(), 3);
    }
}
