use super::tokens::{is_bare_decimal, matches_any, parse_decimal};
use crate::catalog::{split_regional_suffix, AliasTable};
use crate::config::ResolverConfig;
use crate::types::HouseMatch;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

static TRAILING_DASH_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-–]\s*$").unwrap());

/// Turns the odd segment of a bet block into the free-text bet description
/// ("Acima 2.5", "Handicap Asiático H1(+1.5)") by subtracting house text,
/// resolved numbers and decoration.
pub struct BetTypeCleaner {
    regional_suffixes: Vec<String>,
    decorative_glyphs: Vec<String>,
    stake_artifact_threshold: f64,
    aliases: AliasTable,
}

impl BetTypeCleaner {
    pub fn new(config: &ResolverConfig, aliases: AliasTable) -> Self {
        Self {
            regional_suffixes: config.regional_suffixes.clone(),
            decorative_glyphs: config.decorative_glyphs.clone(),
            stake_artifact_threshold: config.stake_artifact_threshold,
            aliases,
        }
    }

    /// `resolved` holds the odd, stake and profit already assigned to the bet
    pub fn derive(&self, odd_segment: &str, house: &HouseMatch, resolved: &[Option<f64>]) -> Option<String> {
        let mut text = odd_segment.trim().replacen(house.matched.as_str(), "", 1);

        let own_suffix = split_regional_suffix(&house.name).1;
        for suffix in self.regional_suffixes.iter().map(String::as_str).chain(own_suffix) {
            text = remove_ignoring_case(&text, suffix, false);
        }

        text = self.drop_numeric_tokens(&text, resolved);

        for glyph in &self.decorative_glyphs {
            text = text.replace(glyph.as_str(), "");
        }
        text = trim_trailing_dash(&collapse_whitespace(&text));

        for token in self.aliases.strip_tokens(&house.name) {
            text = remove_ignoring_case(&text, &token, true);
        }
        text = trim_trailing_dash(&collapse_whitespace(&text));

        (!text.is_empty()).then_some(text)
    }

    /// Bare decimals that are resolved values, the last token of the segment,
    /// or large enough to be a truncated stake. Decimals embedded in a
    /// descriptor such as `H1(+1.5)` always stay.
    fn drop_numeric_tokens(&self, text: &str, resolved: &[Option<f64>]) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        let last = words.len().saturating_sub(1);

        words
            .iter()
            .enumerate()
            .filter(|(index, word)| {
                if !is_bare_decimal(word) {
                    return true;
                }
                let Some(value) = parse_decimal(word) else {
                    return true;
                };
                !(matches_any(value, resolved) || *index == last || value > self.stake_artifact_threshold)
            })
            .map(|(_, word)| *word)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn trim_trailing_dash(text: &str) -> String {
    TRAILING_DASH_REGEX.replace(text, "").trim().to_string()
}

/// Remove every case-insensitive occurrence of `needle`; with `whole_word`
/// the match must not touch a word character on a word-character edge
fn remove_ignoring_case(text: &str, needle: &str, whole_word: bool) -> String {
    let needle = needle.trim();
    if needle.is_empty() {
        return text.to_string();
    }

    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let mut pattern = regex::escape(needle);
    if whole_word {
        if is_word(needle.chars().next()) {
            pattern = format!(r"\b{pattern}");
        }
        if is_word(needle.chars().last()) {
            pattern = format!(r"{pattern}\b");
        }
    }

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => regex.replace_all(text, "").into_owned(),
        Err(e) => {
            tracing::debug!("   ⚠️  Skipping strip token '{needle}': {e}");
            text.to_string()
        }
    }
}
