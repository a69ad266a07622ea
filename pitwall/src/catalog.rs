//! Circuit catalog and location-name resolution.
//!
//! The catalog is an ordered, read-only list of canonical circuit identifiers
//! (file-name form, e.g. `Las_Vegas`). [`CircuitCatalog::resolve`] maps free
//! text to one identifier through three tiers, first match wins; within a
//! tier, the entry listed first in the catalog wins, so resolution is
//! deterministic. Ambiguity is settled by catalog order, not by any ranking.

/// Canonical circuit identifiers for the season, in fixed catalog order.
///
/// Order is part of the contract: it decides which entry wins when an input
/// matches more than one name at the same tier.
pub const SEASON_CIRCUITS: [&str; 24] = [
    "Abu_Dhabi",
    "Australia",
    "Austria",
    "Bahrain",
    "Baku",
    "Belgium",
    "Brazil",
    "Canada",
    "China",
    "Emilia_Romagna",
    "Great_Britain",
    "Hungary",
    "Italy",
    "Japan",
    "Las_Vegas",
    "Mexico",
    "Miami",
    "Monaco",
    "Netherlands",
    "Qatar",
    "Saudi_Arabia",
    "Singapore",
    "Spain",
    "USA",
];

/// Tokens shorter than this never match at the token tier ("las", "usa").
const MIN_TOKEN_LEN: usize = 4;

/// Lowercases and treats internal separators (`_`, `-`) as spaces, collapsing
/// runs of whitespace.
fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered set of canonical circuit identifiers with tiered name resolution.
pub struct CircuitCatalog {
    entries: Vec<String>,
    /// Optional enrichment consulted before the tiers: normalized alias text
    /// to canonical identifier. Empty by default.
    aliases: Vec<(String, String)>,
}

impl Default for CircuitCatalog {
    fn default() -> Self {
        Self::season()
    }
}

impl CircuitCatalog {
    /// Catalog of the current season's circuits.
    pub fn season() -> Self {
        Self::new(SEASON_CIRCUITS.iter().map(|s| s.to_string()))
    }

    /// Builds a catalog from an ordered list of canonical identifiers.
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            aliases: Vec::new(),
        }
    }

    /// Adds alias pairs (`alias text`, `canonical identifier`) checked before
    /// the tiers. The tiering contract is unchanged; without aliases, inputs
    /// like "cota" do not resolve.
    pub fn with_aliases<A, C>(mut self, pairs: impl IntoIterator<Item = (A, C)>) -> Self
    where
        A: Into<String>,
        C: Into<String>,
    {
        self.aliases.extend(
            pairs
                .into_iter()
                .map(|(a, c)| (normalize(&a.into()), c.into())),
        );
        self
    }

    /// Canonical identifiers in catalog order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Resolves free text to a canonical identifier.
    ///
    /// Tiers, case-insensitive, separators normalized to spaces:
    /// 1. exact match against a canonical name;
    /// 2. the input is a substring of a canonical name;
    /// 3. a token of a canonical name longer than 3 chars appears in the input.
    ///
    /// Returns `None` when nothing matches; blank input never matches.
    pub fn resolve(&self, input: &str) -> Option<&str> {
        let needle = normalize(input);
        if needle.is_empty() {
            return None;
        }

        for (alias, canonical) in &self.aliases {
            if *alias == needle {
                return self.entries.iter().find(|e| *e == canonical).map(String::as_str);
            }
        }

        for entry in &self.entries {
            if normalize(entry) == needle {
                return Some(entry);
            }
        }

        for entry in &self.entries {
            if normalize(entry).contains(&needle) {
                return Some(entry);
            }
        }

        for entry in &self.entries {
            let matched = normalize(entry)
                .split_whitespace()
                .any(|token| token.len() >= MIN_TOKEN_LEN && needle.contains(token));
            if matched {
                return Some(entry);
            }
        }

        None
    }
}
