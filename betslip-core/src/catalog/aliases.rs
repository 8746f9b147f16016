//! House alias equivalence classes.
//!
//! Slips spell the same operator several ways ("Super", "Super Bet", "SuperBet").
//! Each group maps every spelling to one canonical identity; adding a spelling is
//! a data change here or in the `catalog.extra_aliases` config section.

use crate::config::AliasGroupConfig;

/// Built-in groups: canonical identity followed by its lowercase spellings
pub const BUILTIN_ALIAS_GROUPS: &[(&str, &[&str])] = &[
    ("SuperBet", &["superbet", "super bet", "super"]),
    ("KTO", &["kto"]),
    ("Blaze", &["blaze"]),
    ("Stake", &["stake"]),
    ("Pinnacle", &["pinnacle"]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct AliasGroup {
    pub canonical: String,
    /// Lowercase, whitespace-collapsed spellings
    pub aliases: Vec<String>,
}

impl AliasGroup {
    fn new(canonical: &str, aliases: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            canonical: canonical.trim().to_string(),
            aliases: aliases
                .into_iter()
                .map(|a| normalize_name(a.as_ref()))
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    fn covers(&self, base: &str) -> bool {
        normalize_name(&self.canonical) == base || self.aliases.iter().any(|a| a == base)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    groups: Vec<AliasGroup>,
}

impl AliasTable {
    pub fn builtin() -> Self {
        Self {
            groups: BUILTIN_ALIAS_GROUPS
                .iter()
                .map(|(canonical, aliases)| AliasGroup::new(canonical, aliases.iter()))
                .collect(),
        }
    }

    /// Built-in groups followed by configured ones
    pub fn with_extra(extra: &[AliasGroupConfig]) -> Self {
        let mut table = Self::builtin();
        table.groups.extend(
            extra
                .iter()
                .map(|group| AliasGroup::new(&group.canonical, group.aliases.iter())),
        );
        table
    }

    pub fn groups(&self) -> &[AliasGroup] {
        &self.groups
    }

    /// Group a house belongs to, judged on its name without regional suffix
    pub fn group_for(&self, house_name: &str) -> Option<&AliasGroup> {
        let (base, _) = split_regional_suffix(house_name);
        let base = normalize_name(base);
        self.groups.iter().find(|group| group.covers(&base))
    }

    /// Canonical identity shared by all spellings of a house
    pub fn identity_of(&self, house_name: &str) -> String {
        match self.group_for(house_name) {
            Some(group) => group.canonical.clone(),
            None => split_regional_suffix(house_name).0.trim().to_string(),
        }
    }

    /// Lowercase tokens to strip from a bet description, longest first so that
    /// "super bet" goes before "super" leaves a dangling "bet"
    pub fn strip_tokens(&self, house_name: &str) -> Vec<String> {
        let name = normalize_name(house_name);
        let (base, suffix) = split_regional_suffix(&name);
        let base = base.trim().to_string();

        let mut tokens = vec![name.clone(), base.clone()];
        if suffix.is_none() {
            tokens.push(format!("{base} (br)"));
        }
        if let Some(group) = self.group_for(house_name) {
            for alias in &group.aliases {
                tokens.push(alias.clone());
                tokens.push(format!("{alias} (br)"));
            }
        }

        tokens.retain(|t| !t.is_empty());
        tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        tokens.dedup();
        tokens
    }
}

/// Lowercase with internal whitespace runs collapsed
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split "Bet365 (DE)" into ("Bet365", Some("(DE)"))
pub fn split_regional_suffix(name: &str) -> (&str, Option<&str>) {
    let trimmed = name.trim_end();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.rfind('(') {
            let base = trimmed[..open].trim_end();
            if !base.is_empty() {
                return (base, Some(&trimmed[open..]));
            }
        }
    }
    (trimmed, None)
}
