//! Caption Extraction
//!
//! Reads the caption's first line (the post title) for:
//! - Hybrid markers ("A x B", any "×")
//! - The main species behind a genus prefix ("P.willinckii", "P willinckii",
//!   "P. willinckii", "Platycerium willinckii")
//! - A variety token, via an ordered list of strategies (first success wins)
//!
//! Hybrid detection always runs before main-species detection: the lineage
//! text of a hybrid ("P.Elsa (willinckii x bifurcatum)") names pure species
//! that must not be picked up as the post's own species. There is no
//! free-text keyword scan over the caption.

use crate::species::PureSpecies;
use crate::utils::{first_line, Normalizer};
use regex::Regex;
use std::sync::{Arc, LazyLock};

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("hard-coded caption pattern compiles")
}

// ============================================================================
// Patterns
// ============================================================================

/// The cross glyph never occurs inside a name, so it marks a hybrid anywhere
const CROSS_GLYPH: char = '×';

/// A standalone Latin "x" token
static BARE_CROSS: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)(?:^|\s)x(?:\s|$)"));

/// Genus prefix followed by the species token
static GENUS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)^(?:P[.\s]+|Platycerium\s+)([a-z]+)"));

/// Genus prefix, species token, then one more token (up to a hashtag)
static GENUS_SPECIES_VARIETY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)^(?:P[.\s]+|Platycerium\s+)([a-z]+)\s+([^\s#]+)"));

/// Brackets and quotes wrapped around a follower token
const TOKEN_WRAPPERS: &[char] = &['(', ')', '（', '）', '[', ']', '「', '」', '\'', '"', '‘', '’', '“', '”'];

/// Text between straight or curly quotes
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"['‘’"“”]([^'‘’"“”]+)['‘’"“”]"#));

// ============================================================================
// Hybrid and main species
// ============================================================================

/// True when the caption's first line carries a hybrid marker.
pub fn is_hybrid(caption: &str) -> bool {
    let Some(line) = first_line(caption) else {
        return false;
    };
    line.contains(CROSS_GLYPH) || BARE_CROSS.is_match(line)
}

/// True when the first line starts with "P."/"P "/"Platycerium ".
pub fn has_genus_prefix(caption: &str) -> bool {
    first_line(caption).is_some_and(|line| GENUS_PREFIX.is_match(line))
}

/// Species token directly after the genus prefix, if any.
fn genus_token(line: &str) -> Option<&str> {
    GENUS_PREFIX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Main species named by the caption title.
///
/// Hybrids short-circuit to None. Otherwise the token after the genus prefix
/// must be one of the pure species; anything else (named hybrids, no prefix)
/// is None.
pub fn extract_main_species(caption: &str) -> Option<PureSpecies> {
    if is_hybrid(caption) {
        return None;
    }
    let line = first_line(caption)?;
    genus_token(line).and_then(PureSpecies::from_id)
}

// ============================================================================
// Variety strategies
// ============================================================================

/// One way of pulling a raw variety candidate out of a title line.
pub trait VarietyStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn candidate<'a>(&self, line: &'a str) -> Option<&'a str>;
}

/// `Platycerium willinckii 'Moonlight'`
pub struct QuotedName;

impl VarietyStrategy for QuotedName {
    fn name(&self) -> &'static str {
        "quoted"
    }

    fn candidate<'a>(&self, line: &'a str) -> Option<&'a str> {
        QUOTED
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// `P.willinckii moonlight` (token after a pure-species prefix)
pub struct SpeciesFollower;

impl VarietyStrategy for SpeciesFollower {
    fn name(&self) -> &'static str {
        "species-follower"
    }

    fn candidate<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = GENUS_SPECIES_VARIETY.captures(line)?;
        let species = caps.get(1)?.as_str();
        PureSpecies::from_id(species)?;
        let token = caps.get(2)?.as_str().trim_matches(TOKEN_WRAPPERS);
        if token.is_empty() || token.eq_ignore_ascii_case("x") {
            return None;
        }
        Some(token)
    }
}

/// `P.Phenomenal` (the leading token is itself a hybrid's name)
pub struct NamedHybrid;

impl VarietyStrategy for NamedHybrid {
    fn name(&self) -> &'static str {
        "named-hybrid"
    }

    fn candidate<'a>(&self, line: &'a str) -> Option<&'a str> {
        let token = genus_token(line)?;
        match PureSpecies::from_id(token) {
            Some(_) => None,
            None => Some(token),
        }
    }
}

/// Caption extractor bound to a variety normalizer
pub struct CaptionExtractor {
    normalizer: Arc<Normalizer>,
    strategies: Vec<Box<dyn VarietyStrategy>>,
}

impl CaptionExtractor {
    /// Extractor with the standard strategy order: quoted, species
    /// follower, named hybrid.
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self::with_strategies(
            normalizer,
            vec![
                Box::new(QuotedName),
                Box::new(SpeciesFollower),
                Box::new(NamedHybrid),
            ],
        )
    }

    pub fn with_strategies(
        normalizer: Arc<Normalizer>,
        strategies: Vec<Box<dyn VarietyStrategy>>,
    ) -> Self {
        Self {
            normalizer,
            strategies,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Normalized variety named by the caption title.
    ///
    /// A strategy whose candidate normalizes to nothing (e.g. a bare "cv.")
    /// does not count as a success; the next strategy is tried.
    pub fn extract_variety(&self, caption: &str) -> Option<String> {
        let line = first_line(caption)?;
        self.strategies.iter().find_map(|strategy| {
            strategy
                .candidate(line)
                .and_then(|raw| self.normalizer.normalize(raw))
        })
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}
