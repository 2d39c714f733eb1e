//! Subspecies Aggregation
//!
//! Groups classification records by self-tag, tallies main-species votes and
//! picks a provisional display name for every group. The result is a
//! provisional index; `repair` turns it into the final one.
//!
//! Display name priority:
//! 1. Most frequent title whose own main species equals the group's vote winner
//! 2. Most frequent title with a "P."/"Platycerium" prefix
//! 3. Most frequent title
//! 4. The self-tag itself

use crate::classify::Classification;
use crate::data::Post;
use crate::extract::{extract_main_species, has_genus_prefix};
use crate::utils::{first_line, most_frequent, OrderedTally};
use rustc_hash::FxHashMap;

/// A post together with one of its classifications
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPost {
    pub post: Post,
    pub classification: Classification,
}

/// All posts carrying one self-tag
#[derive(Debug, Clone)]
pub struct SubspeciesGroup {
    pub tag: String,
    /// Members in input order
    pub posts: Vec<ClassifiedPost>,
    /// Species id → votes, in first-seen order
    pub main_species_votes: Vec<(String, usize)>,
    /// Vote winner; ties go to the species seen first
    pub main_species: Option<String>,
    pub display_name: String,
}

impl SubspeciesGroup {
    /// Non-empty titles of member posts, in member order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.posts.iter().filter_map(|m| first_line(&m.post.caption))
    }
}

/// Groups in first-sighting order, before consistency repair
#[derive(Debug, Clone, Default)]
pub struct ProvisionalIndex {
    pub groups: Vec<SubspeciesGroup>,
}

/// Group classified posts by self-tag.
///
/// Records without a self-tag are skipped: they count toward statistics
/// but never enter the taxonomy.
pub fn aggregate(classified: &[ClassifiedPost]) -> ProvisionalIndex {
    let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
    let mut members: Vec<(&str, Vec<&ClassifiedPost>, OrderedTally<String>)> = Vec::new();

    for item in classified {
        let Some(tag) = item.classification.self_tag.as_deref() else {
            continue;
        };

        let slot = *slots.entry(tag).or_insert_with(|| {
            members.push((tag, Vec::new(), OrderedTally::new()));
            members.len() - 1
        });

        let (_, posts, votes) = &mut members[slot];
        posts.push(item);
        if let Some(species) = item.classification.main_species {
            votes.add(species.id().to_string());
        }
    }

    let groups = members
        .into_iter()
        .map(|(tag, posts, votes)| {
            let main_species = votes.winner().cloned();
            let mut group = SubspeciesGroup {
                tag: tag.to_string(),
                posts: posts.into_iter().cloned().collect(),
                main_species_votes: votes.entries().to_vec(),
                main_species,
                display_name: String::new(),
            };
            group.display_name = select_display_name(&group);
            group
        })
        .collect();

    ProvisionalIndex { groups }
}

/// Most frequent title whose own main species is `species_id`
/// (`None` selects titles that name no pure species).
pub fn most_frequent_title_for(group: &SubspeciesGroup, species_id: Option<&str>) -> Option<String> {
    most_frequent(
        group
            .titles()
            .filter(|line| extract_main_species(line).map(|s| s.id()) == species_id),
    )
    .map(str::to_string)
}

/// Provisional display name by the four-rule priority.
pub fn select_display_name(group: &SubspeciesGroup) -> String {
    if let Some(species) = group.main_species.as_deref() {
        if let Some(title) = most_frequent_title_for(group, Some(species)) {
            return title;
        }
    }

    if let Some(title) = most_frequent(group.titles().filter(|line| has_genus_prefix(line))) {
        return title.to_string();
    }

    if let Some(title) = most_frequent(group.titles()) {
        return title.to_string();
    }

    group.tag.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Confidence;
    use crate::species::PureSpecies;

    fn member(id: &str, caption: &str, tag: Option<&str>, species: Option<PureSpecies>) -> ClassifiedPost {
        ClassifiedPost {
            post: Post::new(id, 0, caption, &[]),
            classification: Classification {
                species: None,
                self_tag: tag.map(str::to_string),
                confidence: Confidence::High,
                reason: String::new(),
                main_species: species,
                caption_variety: None,
                hashtag_variety: None,
            },
        }
    }

    #[test]
    fn test_groups_by_tag_in_first_sighting_order() {
        let index = aggregate(&[
            member("1", "P.willinckii a", Some("#b"), Some(PureSpecies::Willinckii)),
            member("2", "P.ridleyi", Some("#a"), Some(PureSpecies::Ridleyi)),
            member("3", "untagged", None, None),
            member("4", "P.willinckii a", Some("#b"), Some(PureSpecies::Willinckii)),
        ]);
        let tags: Vec<&str> = index.groups.iter().map(|g| g.tag.as_str()).collect();
        assert_eq!(tags, vec!["#b", "#a"]);
        assert_eq!(index.groups[0].posts.len(), 2);
        assert_eq!(index.groups[0].main_species_votes, vec![("willinckii".to_string(), 2)]);
    }

    #[test]
    fn test_vote_ties_go_to_first_seen_species() {
        let index = aggregate(&[
            member("1", "x", Some("#t"), Some(PureSpecies::Veitchii)),
            member("2", "y", Some("#t"), Some(PureSpecies::Bifurcatum)),
            member("3", "z", Some("#t"), None),
        ]);
        assert_eq!(index.groups[0].main_species.as_deref(), Some("veitchii"));
    }

    #[test]
    fn test_display_name_prefers_titles_matching_vote() {
        let index = aggregate(&[
            member("1", "P.bifurcatum big\nnote", Some("#t"), Some(PureSpecies::Veitchii)),
            member("2", "P.bifurcatum big", Some("#t"), Some(PureSpecies::Veitchii)),
            member("3", "P.veitchii silver", Some("#t"), Some(PureSpecies::Veitchii)),
        ]);
        assert_eq!(index.groups[0].display_name, "P.veitchii silver");
    }

    #[test]
    fn test_display_name_fallback_rules() {
        // rule 2: prefixed titles beat more frequent plain ones
        let index = aggregate(&[
            member("1", "水やり", Some("#t"), None),
            member("2", "水やり", Some("#t"), None),
            member("3", "P.Elsa", Some("#t"), None),
        ]);
        assert_eq!(index.groups[0].display_name, "P.Elsa");

        // rule 3: most frequent title
        let index = aggregate(&[
            member("1", "新芽", Some("#t"), None),
            member("2", "水やり", Some("#t"), None),
            member("3", "水やり", Some("#t"), None),
        ]);
        assert_eq!(index.groups[0].display_name, "水やり");

        // rule 4: the tag
        let index = aggregate(&[member("1", "", Some("#ジサクボ"), None)]);
        assert_eq!(index.groups[0].display_name, "#ジサクボ");
    }
}
