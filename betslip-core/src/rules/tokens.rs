//! Numeric token helpers shared by the scanner, metadata and resolver rules.

use regex::{Captures, Regex, Replacer};
use std::borrow::Cow;
use std::sync::LazyLock;

static DECIMAL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+").unwrap());

static BARE_DECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

// 1.234,56 / 12.345.678,90: point groups before a decimal comma
static POINT_GROUPED_AMOUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:\.\d{3})+,\d{1,2}\b").unwrap());

// 1,234 / 12,345,678.90: comma as thousands separator
static GROUPED_AMOUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:,\d{3})+\b").unwrap());

// 1,85 / 3,25% / H1(+1,5): comma as decimal separator
static DECIMAL_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d),(\d{1,2})\b").unwrap());

const VALUE_EPSILON: f64 = 1e-9;

/// A `\d+\.\d+` literal and its byte span in the source text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalToken {
    pub value: f64,
    pub start: usize,
    pub end: usize,
}

impl DecimalToken {
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Every decimal literal in `text`, left to right
pub fn decimal_tokens(text: &str) -> Vec<DecimalToken> {
    DECIMAL_REGEX
        .find_iter(text)
        .filter_map(|m| {
            parse_decimal(m.as_str()).map(|value| DecimalToken {
                value,
                start: m.start(),
                end: m.end(),
            })
        })
        .collect()
}

pub fn parse_decimal(literal: &str) -> Option<f64> {
    literal.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn contains_decimal(text: &str) -> bool {
    DECIMAL_REGEX.is_match(text)
}

/// True for a whitespace-free token that is only a decimal literal
pub fn is_bare_decimal(token: &str) -> bool {
    BARE_DECIMAL_REGEX.is_match(token)
}

pub fn same_value(a: f64, b: f64) -> bool {
    (a - b).abs() < VALUE_EPSILON
}

/// True when `value` equals any of the already-assigned values
pub fn matches_any(value: f64, assigned: &[Option<f64>]) -> bool {
    assigned
        .iter()
        .flatten()
        .any(|taken| same_value(value, *taken))
}

/// Rewrite locale-specific separators so every decimal reads `\d+\.\d+`.
/// When an amount carries both separators the last one is the decimal point.
pub fn normalize_decimal_separators(line: &str) -> Cow<'_, str> {
    if !line.contains(',') {
        return Cow::Borrowed(line);
    }

    let text = replace_all(Cow::Borrowed(line), &POINT_GROUPED_AMOUNT_REGEX, |caps: &Captures| {
        caps[0].replace('.', "").replace(',', ".")
    });
    let text = replace_all(text, &GROUPED_AMOUNT_REGEX, |caps: &Captures| caps[0].replace(',', ""));
    replace_all(text, &DECIMAL_COMMA_REGEX, "${1}.${2}")
}

/// `Regex::replace_all` over a `Cow`, keeping the borrow when nothing matched
fn replace_all<'a>(text: Cow<'a, str>, regex: &Regex, replacement: impl Replacer) -> Cow<'a, str> {
    let rewritten = match regex.replace_all(&text, replacement) {
        Cow::Borrowed(_) => None,
        Cow::Owned(rewritten) => Some(rewritten),
    };

    match rewritten {
        Some(rewritten) => Cow::Owned(rewritten),
        None => text,
    }
}
