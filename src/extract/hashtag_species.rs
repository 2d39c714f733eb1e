//! Hashtag Species Fallback
//!
//! Some posts have Japanese-only captions with no "P."/"Platycerium" title,
//! but still carry a species hashtag (`#platyceriumwillinckii`, `#ridleyi`,
//! `#ビーチー`). This fallback only runs when the caption title has no genus
//! prefix and is not a hybrid.

use crate::species::PureSpecies;

/// Katakana spellings seen in the archive, per species.
static KATAKANA_NAMES: &[(PureSpecies, &[&str])] = &[
    (PureSpecies::Willinckii, &["ウィリンキー", "ウイリンキー"]),
    (PureSpecies::Veitchii, &["ベイチー", "ビーチー", "ビィーチー"]),
    (PureSpecies::Ridleyi, &["リドレイ"]),
    (PureSpecies::Wallichii, &["ワリチー"]),
    (PureSpecies::Quadridichotomum, &["クアドリ"]),
    (PureSpecies::Bifurcatum, &["ビフルカツム", "ビフルカタム"]),
    (PureSpecies::Coronarium, &["コロナリウム"]),
    (PureSpecies::Wandae, &["ワンダエ"]),
    (PureSpecies::Hillii, &["ヒリー"]),
    (PureSpecies::Superbum, &["スパーバム", "スーパーバム"]),
    (PureSpecies::Grande, &["グランデ"]),
    (PureSpecies::Alcicorne, &["アルシコルネ"]),
];

/// First pure species named by any hashtag, scanning tags in order.
///
/// Per tag, Latin forms (`platycerium<id>` or exactly `<id>`) are checked
/// before katakana names.
pub fn species_from_hashtags<S: AsRef<str>>(hashtags: &[S]) -> Option<PureSpecies> {
    hashtags.iter().find_map(|tag| species_from_tag(tag.as_ref()))
}

fn species_from_tag(tag: &str) -> Option<PureSpecies> {
    let lower = tag.trim().trim_start_matches('#').to_lowercase();
    if lower.is_empty() {
        return None;
    }

    let latin = PureSpecies::ALL.into_iter().find(|species| {
        let id = species.id();
        lower == id || lower.contains(&format!("platycerium{}", id))
    });
    if latin.is_some() {
        return latin;
    }

    KATAKANA_NAMES
        .iter()
        .find(|(_, names)| names.iter().any(|name| tag.contains(name)))
        .map(|(species, _)| *species)
}
