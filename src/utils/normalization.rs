//! Variety Name Normalization
//!
//! Canonicalizes raw variety tokens (English, Japanese, mixed symbols) to one
//! display string using a curated English↔Japanese dictionary.
//!
//! Matching order:
//! 1. Exact lookup of the cleaned token
//! 2. Substring containment against dictionary keys (either direction),
//!    first match in declaration order wins
//! 3. The cleaned token itself

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Version tag of the built-in dictionary.
pub const BUILTIN_DICTIONARY_VERSION: &str = "7";

// ============================================================================
// BUILT-IN VARIETY TABLE
// Declaration order is the substring tie-break, so longer names come before
// the short names they contain (e.g. "kingfisher" before "king").
// ============================================================================

static BUILTIN_ENTRIES: &[(&str, &str)] = &[
    // Willinckii
    ("moonlight", "ムーンライト"),
    ("moonlightvp", "ムーンライトvp"),
    ("moonlight#vp", "ムーンライトvp"),
    ("moonlight2", "ムーンライト2"),
    ("月光", "ムーンライト"),
    ("omega", "オメガ"),
    ("smurf", "スマーフ"),
    ("blue queen", "ブルークイーン"),
    ("bluequeen", "ブルークイーン"),
    ("bq", "ブルークイーン"),
    ("dwarf smurf", "ドワーフスマーフ"),
    ("dwarfsmurf", "ドワーフスマーフ"),
    ("jade girl", "ジェイドガール"),
    ("jadegirl", "ジェイドガール"),
    ("celso tatsuta", "セルソタツタ"),
    ("celsotatsuta", "セルソタツタ"),
    ("rq", "レッドクイーン"),
    ("red queen", "レッドクイーン"),
    ("redqueen", "レッドクイーン"),
    ("king fisher", "キングフィッシャー"),
    ("kingfisher", "キングフィッシャー"),
    ("auburn river", "オーバンリバー"),
    ("auburnriver", "オーバンリバー"),
    ("omg", "オーエムジー"),
    ("bqds", "bqds"),
    ("winnie", "ウィニー"),
    ("izanagi", "イザナギ"),
    ("伊弉諾", "イザナギ"),
    ("gabriel", "ガブリエル"),
    ("cv.foongsiqi", "フォンシキ"),
    ("foongsiqi", "フォンシキ"),
    ("white hawk", "ホワイトホーク"),
    ("whitehawk", "ホワイトホーク"),
    ("vanorn", "バノン"),
    ("van orn", "バノン"),
    // Veitchii
    ("lemoinei", "レモイネイ"),
    ("silver frond", "シルバーフロンド"),
    ("silverfrond", "シルバーフロンド"),
    ("wild white", "ワイルドホワイト"),
    ("wildwhite", "ワイルドホワイト"),
    ("australia", "オーストラリア"),
    // Ridleyi
    ("nano", "ナノ"),
    ("crested", "クレステッド"),
    ("wide frond", "ワイドフロンド"),
    ("widefrond", "ワイドフロンド"),
    ("narrow", "ナロー"),
    ("monkey king", "モンキーキング"),
    ("monkeyking", "モンキーキング"),
    // Coronarium
    ("waiwai", "ワイワイ"),
    ("thin frond", "シンフロンド"),
    ("thinfrond", "シンフロンド"),
    ("white", "ホワイト"),
    ("philippines", "フィリピン"),
    ("corona", "コロナ"),
    ("corona2", "コロナ2"),
    // Hillii
    ("mutant", "ミュータント"),
    ("drummond", "ドラモンド"),
    ("dragon", "ドラゴン"),
    ("groupm", "グループエム"),
    ("group m", "グループエム"),
    ("king", "キング"),
    ("kinggroupm", "キンググループエム"),
    ("dwarf", "ドワーフ"),
    ("cv.dragon", "ドラゴン"),
    ("cv.drummond", "ドラモンド"),
    // Hybrids
    ("elsa", "エルサ"),
    ("white gizmo", "ホワイトギズモ"),
    ("whitegizmo", "ホワイトギズモ"),
    ("gizmo", "ギズモ"),
    ("phenomenal", "フェノメナル"),
    ("majus mix", "マジュスミックス"),
    ("majusmix", "マジュスミックス"),
    ("monkey north", "モンキーノース"),
    ("monkeynorth", "モンキーノース"),
    ("peawchan", "ピューチャン"),
    ("pewchan", "ピューチャン"),
    ("white dorian", "ホワイトドリアン"),
    ("whitedorian", "ホワイトドリアン"),
    ("little will", "リトルウィル"),
    ("littlewill", "リトルウィル"),
    ("durval nunes", "ダーバルヌネス"),
    ("durvalnunes", "ダーバルヌネス"),
    ("silver wing", "シルバーウィング"),
    ("silverwing", "シルバーウィング"),
    ("triceratops", "トリケラトプス"),
    ("tricera", "トリケラ"),
    ("pegasus", "ペガサス"),
    ("neptune", "ネプチューン"),
    ("nukul", "ヌクル"),
    ("merapi", "メラピ"),
    ("mt.lewis", "マウントルイス"),
    ("mtlewis", "マウントルイス"),
    ("mount lewis", "マウントルイス"),
    ("mountlewis", "マウントルイス"),
    ("白ルイス", "白ルイス"),
    ("jenny", "ジェニー"),
    ("anne", "アン"),
    ("an", "アン"),
    ("tobari", "トバリ"),
    ("nadare", "ナダレ"),
    ("scissorhands", "シザーハンズ"),
    ("mada", "マダ"),
    ("madagascar", "マダガスカル"),
    // Generic descriptors
    ("spore", "胞子"),
    ("thin", "シン"),
    ("wide", "ワイド"),
    ("wild", "ワイルド"),
    ("silver", "シルバー"),
    ("cv.", ""),
    ("cv", ""),
];

/// Versioned raw → canonical variety table.
///
/// Entries are kept as an ordered list because declaration order is the
/// documented tie-break for substring matches.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VarietyDictionary {
    pub version: String,
    pub entries: Vec<(String, String)>,
}

impl VarietyDictionary {
    /// The curated table shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_DICTIONARY_VERSION.to_string(),
            entries: BUILTIN_ENTRIES
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    /// Load a replacement dictionary from JSON
    ///
    /// Format: `{ "version": "...", "entries": [["raw", "canonical"], ...] }`
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read variety dictionary: {:?}", path))?;

        let dictionary: VarietyDictionary = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse variety dictionary JSON: {:?}", path))?;

        if dictionary.entries.is_empty() {
            anyhow::bail!("Variety dictionary {:?} has no entries", path);
        }

        Ok(dictionary)
    }
}

/// Strip the characters that never carry meaning in a variety token.
///
/// Lowercases and removes `.`, `#` and all whitespace.
pub fn clean_token(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| *c != '.' && *c != '#' && !c.is_whitespace())
        .collect()
}

/// Dictionary-backed variety name normalizer
pub struct Normalizer {
    version: String,
    /// Cleaned keys in declaration order, paired with canonical values
    ordered: Vec<(String, String)>,
    /// Cleaned key → index into `ordered`
    exact: FxHashMap<String, usize>,
}

impl Normalizer {
    /// Build a normalizer over an injected dictionary.
    ///
    /// Keys are cleaned the same way tokens are; when two raw keys clean to
    /// the same string the first declaration is kept.
    pub fn new(dictionary: VarietyDictionary) -> Self {
        let mut ordered = Vec::with_capacity(dictionary.entries.len());
        let mut exact = FxHashMap::default();

        for (raw, canonical) in dictionary.entries {
            let key = clean_token(&raw);
            if key.is_empty() || exact.contains_key(&key) {
                continue;
            }
            exact.insert(key.clone(), ordered.len());
            ordered.push((key, canonical));
        }

        Self {
            version: dictionary.version,
            ordered,
            exact,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Canonicalize a raw variety token.
    ///
    /// Total over all inputs. Returns None when the token carries no
    /// information: it cleans to empty, or it maps to an empty canonical
    /// value (e.g. a bare "cv." marker).
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let cleaned = clean_token(raw);
        if cleaned.is_empty() {
            return None;
        }

        let mapped = match self.exact.get(&cleaned) {
            Some(&idx) => self.ordered[idx].1.clone(),
            None => self
                .ordered
                .iter()
                .find(|(key, _)| cleaned.contains(key.as_str()) || key.contains(cleaned.as_str()))
                .map(|(_, canonical)| canonical.clone())
                .unwrap_or(cleaned),
        };

        if mapped.is_empty() {
            None
        } else {
            Some(mapped)
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(VarietyDictionary::builtin())
    }
}
