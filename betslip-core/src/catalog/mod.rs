//! House Catalog
//!
//! Recognizes betting-house names inside a line of slip text. Three tiers are
//! tried in order:
//!
//! 1. Catalog entries (longest normalized name first, so "Bet365 (DE)" wins
//!    over a shorter prefix)
//! 2. Alias keys of the equivalence table, resolving to the canonical identity
//! 3. A capitalized-run heuristic for houses absent from the catalog
//!
//! Matching is case-insensitive, tolerant to any whitespace run between the
//! words of a name, and anchored on word boundaries wherever the name starts
//! or ends with a word character.

pub mod aliases;
pub mod houses;

pub use aliases::{normalize_name, split_regional_suffix, AliasGroup, AliasTable};

use crate::config::CatalogConfig;
use crate::types::{HouseMatch, HouseSource};
use anyhow::Result;
use regex::{Regex, RegexSet, RegexSetBuilder};
use std::collections::HashSet;
use std::sync::{LazyLock, OnceLock};

// A capitalized run at line start, then a descriptor token, then a decimal odd
static HEURISTIC_HOUSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z\s\(\)]{2,30})\s+[A-Za-z0-9()+\-≥≤\.]+\s+\d+\.\d+").unwrap()
});

const CATALOG_SIZE_LIMIT: usize = 64 * (1 << 20);

pub struct HouseCatalog {
    names: Vec<String>,
    patterns: Vec<String>,
    entry_set: RegexSet,
    /// Per-entry regex, compiled the first time its entry matches
    entry_regexes: Vec<OnceLock<Option<Regex>>>,
    alias_keys: Vec<(String, Regex)>,
    aliases: AliasTable,
    heuristic_detection: bool,
}

impl HouseCatalog {
    /// Built-in catalog with default settings
    pub fn builtin() -> Result<Self> {
        Self::from_config(&CatalogConfig::default())
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let names = houses::HOUSE_NAMES
            .iter()
            .map(|name| name.to_string())
            .chain(config.extra_houses.iter().cloned());

        Self::new(
            names,
            AliasTable::with_extra(&config.extra_aliases),
            config.heuristic_detection,
        )
    }

    pub fn new(
        names: impl IntoIterator<Item = String>,
        aliases: AliasTable,
        heuristic_detection: bool,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|name| !name.is_empty() && seen.insert(normalize_name(name)))
            .collect();

        // Stable: equal lengths keep their source order
        names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));

        let patterns: Vec<String> = names.iter().map(|name| name_pattern(name)).collect();
        let entry_set = RegexSetBuilder::new(&patterns)
            .size_limit(CATALOG_SIZE_LIMIT)
            .dfa_size_limit(CATALOG_SIZE_LIMIT)
            .build()?;
        let entry_regexes = patterns.iter().map(|_| OnceLock::new()).collect();

        let mut keys: Vec<(String, String)> = aliases
            .groups()
            .iter()
            .flat_map(|group| {
                group
                    .aliases
                    .iter()
                    .map(move |alias| (alias.clone(), group.canonical.clone()))
            })
            .collect();
        keys.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.chars().count()));

        let alias_keys = keys
            .into_iter()
            .map(|(alias, canonical)| Ok((canonical, Regex::new(&name_pattern(&alias))?)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "📚 House catalog ready: {} entries, {} alias keys",
            names.len(),
            alias_keys.len()
        );

        Ok(Self {
            names,
            patterns,
            entry_set,
            entry_regexes,
            alias_keys,
            aliases,
            heuristic_detection,
        })
    }

    /// Recognize a house name in one trimmed line
    pub fn find(&self, line: &str) -> Option<HouseMatch> {
        self.find_in_catalog(line)
            .or_else(|| self.find_by_alias(line))
            .or_else(|| self.find_by_heuristic(line))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    fn find_in_catalog(&self, line: &str) -> Option<HouseMatch> {
        let index = self.entry_set.matches(line).iter().next()?;
        let name = &self.names[index];
        let regex = self.entry_regexes[index]
            .get_or_init(|| Regex::new(&self.patterns[index]).ok())
            .as_ref()?;
        let matched = regex.find(line)?.as_str().to_string();

        Some(HouseMatch {
            name: name.clone(),
            identity: self.aliases.identity_of(name),
            matched,
            source: HouseSource::Catalog,
        })
    }

    fn find_by_alias(&self, line: &str) -> Option<HouseMatch> {
        self.alias_keys.iter().find_map(|(canonical, pattern)| {
            pattern.find(line).map(|m| HouseMatch {
                name: canonical.clone(),
                identity: canonical.clone(),
                matched: m.as_str().to_string(),
                source: HouseSource::Alias,
            })
        })
    }

    fn find_by_heuristic(&self, line: &str) -> Option<HouseMatch> {
        if !self.heuristic_detection {
            return None;
        }

        let captures = HEURISTIC_HOUSE_REGEX.captures(line)?;
        let candidate = captures.get(1)?.as_str().trim();
        if candidate.chars().count() < 3 {
            return None;
        }

        tracing::debug!("🔎 Heuristic house candidate: '{candidate}'");
        Some(HouseMatch {
            name: candidate.to_string(),
            identity: self.aliases.identity_of(candidate),
            matched: candidate.to_string(),
            source: HouseSource::Heuristic,
        })
    }
}

/// Case-insensitive pattern for a house name: words joined by optional
/// whitespace, word boundaries on word-character edges only
fn name_pattern(name: &str) -> String {
    let body = name
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*");

    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let start = if is_word(name.chars().next()) { r"\b" } else { "" };
    let end = if is_word(name.chars().last()) { r"\b" } else { "" };

    format!("(?i){start}{body}{end}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> HouseCatalog {
        HouseCatalog::new(
            names.iter().map(|n| n.to_string()),
            AliasTable::builtin(),
            false,
        )
        .unwrap()
    }

    #[test]
    fn builtin_catalog_loads_every_entry() {
        let catalog = HouseCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), houses::HOUSE_NAMES.len());
    }

    #[test]
    fn short_name_does_not_match_inside_longer_word() {
        let catalog = catalog(&["Bet"]);
        assert!(catalog.find("Betano Vencedor 2.05").is_none());
        assert_eq!(catalog.find("Bet Over 2.5 1.90").unwrap().name, "Bet");
    }

    #[test]
    fn regional_suffix_matches_before_a_space() {
        let catalog = HouseCatalog::builtin().unwrap();
        let hit = catalog.find("KTO (BR) Handicap Asiático").unwrap();
        assert_eq!(hit.name, "KTO (BR)");
        assert_eq!(hit.identity, "KTO");
        assert_eq!(hit.matched, "KTO (BR)");
        assert_eq!(hit.source, HouseSource::Catalog);
    }

    #[test]
    fn repeated_lookups_reuse_the_entry_regex() {
        let catalog = catalog(&["Pinnacle", "Betano"]);
        assert!(catalog.entry_regexes.iter().all(|slot| slot.get().is_none()));

        for line in ["Pinnacle Under 2.5 2.10", "pinnacle  Over 1.5 1.80"] {
            assert!(catalog.find(line).is_some());
        }
        let compiled = catalog.entry_regexes.iter().filter(|slot| slot.get().is_some()).count();
        assert_eq!(compiled, 1);
        assert_eq!(catalog.find("PINNACLE Over 3.5 2.40").unwrap().matched, "PINNACLE");
    }

    #[test]
    fn longer_variant_wins_over_its_prefix() {
        let catalog = catalog(&["Bet365", "Bet365 (DE)"]);
        assert_eq!(catalog.find("Bet365 (DE) Over 2.5 1.90").unwrap().name, "Bet365 (DE)");
        assert_eq!(catalog.find("Bet365 Over 2.5 1.90").unwrap().name, "Bet365");
    }

    #[test]
    fn matching_ignores_case_and_whitespace_runs() {
        let catalog = HouseCatalog::builtin().unwrap();
        let hit = catalog.find("kto   (br) Over 1.5 1.80").unwrap();
        assert_eq!(hit.name, "KTO (BR)");
        assert_eq!(hit.matched, "kto   (br)");
        assert_eq!(catalog.find("PINNACLE Under 2.5 2.10").unwrap().name, "Pinnacle");
    }

    #[test]
    fn superbet_spellings_resolve_through_aliases() {
        let catalog = HouseCatalog::builtin().unwrap();
        for (line, literal) in [
            ("Super Over 2.5 1.95 ● 50.00 USD 1.10", "Super"),
            ("Super Bet Over 2.5 1.95 ● 50.00 USD 1.10", "Super Bet"),
            ("SuperBet Over 2.5 1.95 ● 50.00 USD 1.10", "SuperBet"),
        ] {
            let hit = catalog.find(line).unwrap();
            assert_eq!(hit.name, "SuperBet", "{line}");
            assert_eq!(hit.identity, "SuperBet");
            assert_eq!(hit.matched, literal);
            assert_eq!(hit.source, HouseSource::Alias);
        }
    }

    #[test]
    fn catalog_entry_reports_group_identity() {
        let catalog = HouseCatalog::builtin().unwrap();
        let hit = catalog.find("SuperBet (BR) Over 2.5 1.95").unwrap();
        assert_eq!(hit.name, "SuperBet (BR)");
        assert_eq!(hit.identity, "SuperBet");
    }

    #[test]
    fn heuristic_accepts_unknown_capitalized_house() {
        let catalog = HouseCatalog::builtin().unwrap();
        let hit = catalog.find("Zebrabet Vencedor1 2.10 47.20 USD 2.18").unwrap();
        assert_eq!(hit.name, "Zebrabet");
        assert_eq!(hit.source, HouseSource::Heuristic);
    }

    #[test]
    fn heuristic_can_be_disabled() {
        let catalog = catalog(&["Pinnacle"]);
        assert!(catalog.find("Zebrabet Vencedor1 2.10 47.20 USD 2.18").is_none());
    }

    #[test]
    fn metadata_rows_are_not_houses() {
        let catalog = HouseCatalog::builtin().unwrap();
        for line in [
            "Real Madrid–Barcelona 3.25%",
            "Futebol / Espanha / La Liga",
            "Evento em 2 horas (2025-09-27 19:00 -03:00)",
            "● 54.10 BRL 4.07",
        ] {
            assert!(catalog.find(line).is_none(), "{line}");
        }
    }

    #[test]
    fn extra_houses_from_config_are_recognized() {
        let config = CatalogConfig {
            extra_houses: vec!["Casa Nova".to_string()],
            heuristic_detection: false,
            ..CatalogConfig::default()
        };
        let catalog = HouseCatalog::from_config(&config).unwrap();
        assert_eq!(catalog.find("casa nova Over 2.5 1.90").unwrap().name, "Casa Nova");
    }

    #[test]
    fn pattern_skips_boundary_on_punctuation_edges() {
        assert_eq!(name_pattern("KTO (BR)"), r"(?i)\bKTO\s*\(BR\)");
        assert_eq!(name_pattern("Bet365"), r"(?i)\bBet365\b");
    }
}
