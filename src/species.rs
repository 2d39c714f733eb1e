//! Pure Species Catalogue
//!
//! The 18 pure Platycerium species the taxonomy is organized around.
//! This is a closed set: main species are never inferred beyond it, and
//! anything else (hybrids, unparseable names) is represented as `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the 18 pure species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PureSpecies {
    Bifurcatum,
    Willinckii,
    Coronarium,
    Ridleyi,
    Wandae,
    Superbum,
    Veitchii,
    Hillii,
    Alcicorne,
    Elephantotis,
    Ellisii,
    Holttumii,
    Stemaria,
    Andinum,
    Quadridichotomum,
    Grande,
    Wallichii,
    Madagascariense,
}

impl PureSpecies {
    /// All species in catalogue order.
    pub const ALL: [PureSpecies; 18] = [
        PureSpecies::Bifurcatum,
        PureSpecies::Willinckii,
        PureSpecies::Coronarium,
        PureSpecies::Ridleyi,
        PureSpecies::Wandae,
        PureSpecies::Superbum,
        PureSpecies::Veitchii,
        PureSpecies::Hillii,
        PureSpecies::Alcicorne,
        PureSpecies::Elephantotis,
        PureSpecies::Ellisii,
        PureSpecies::Holttumii,
        PureSpecies::Stemaria,
        PureSpecies::Andinum,
        PureSpecies::Quadridichotomum,
        PureSpecies::Grande,
        PureSpecies::Wallichii,
        PureSpecies::Madagascariense,
    ];

    /// Lowercase Latin epithet used as the external identifier.
    pub fn id(self) -> &'static str {
        match self {
            PureSpecies::Bifurcatum => "bifurcatum",
            PureSpecies::Willinckii => "willinckii",
            PureSpecies::Coronarium => "coronarium",
            PureSpecies::Ridleyi => "ridleyi",
            PureSpecies::Wandae => "wandae",
            PureSpecies::Superbum => "superbum",
            PureSpecies::Veitchii => "veitchii",
            PureSpecies::Hillii => "hillii",
            PureSpecies::Alcicorne => "alcicorne",
            PureSpecies::Elephantotis => "elephantotis",
            PureSpecies::Ellisii => "ellisii",
            PureSpecies::Holttumii => "holttumii",
            PureSpecies::Stemaria => "stemaria",
            PureSpecies::Andinum => "andinum",
            PureSpecies::Quadridichotomum => "quadridichotomum",
            PureSpecies::Grande => "grande",
            PureSpecies::Wallichii => "wallichii",
            PureSpecies::Madagascariense => "madagascariense",
        }
    }

    /// Japanese vernacular (katakana) name shown next to the Latin one.
    pub fn name_ja(self) -> &'static str {
        match self {
            PureSpecies::Bifurcatum => "ビフルカツム",
            PureSpecies::Willinckii => "ウィリンキー",
            PureSpecies::Coronarium => "コロナリウム",
            PureSpecies::Ridleyi => "リドレイ",
            PureSpecies::Wandae => "ワンダエ",
            PureSpecies::Superbum => "スパーバム",
            PureSpecies::Veitchii => "ビーチー",
            PureSpecies::Hillii => "ヒリー",
            PureSpecies::Alcicorne => "アルシコルネ",
            PureSpecies::Elephantotis => "エレファントティス",
            PureSpecies::Ellisii => "エリシー",
            PureSpecies::Holttumii => "ホルタミー",
            PureSpecies::Stemaria => "ステマリア",
            PureSpecies::Andinum => "アンディナム",
            PureSpecies::Quadridichotomum => "クアドリディコトマム",
            PureSpecies::Grande => "グランデ",
            PureSpecies::Wallichii => "ワリチー",
            PureSpecies::Madagascariense => "マダガスカリエンセ",
        }
    }

    /// Case-insensitive lookup by identifier. Returns None for anything
    /// outside the closed set.
    pub fn from_id(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.id() == lower)
    }
}

impl fmt::Display for PureSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_is_case_insensitive() {
        assert_eq!(PureSpecies::from_id("Willinckii"), Some(PureSpecies::Willinckii));
        assert_eq!(PureSpecies::from_id(" veitchii "), Some(PureSpecies::Veitchii));
        assert_eq!(PureSpecies::from_id("elsa"), None);
        assert_eq!(PureSpecies::from_id(""), None);
    }

    #[test]
    fn test_ids_are_unique_and_round_trip() {
        for species in PureSpecies::ALL {
            assert_eq!(PureSpecies::from_id(species.id()), Some(species));
        }
        let mut ids: Vec<&str> = PureSpecies::ALL.iter().map(|s| s.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 18);
    }

    #[test]
    fn test_serializes_as_lowercase_id() {
        let json = serde_json::to_string(&PureSpecies::Quadridichotomum).unwrap();
        assert_eq!(json, "\"quadridichotomum\"");
    }
}
