use crate::config::ScannerConfig;
use crate::rules::tokens::normalize_decimal_separators;
use crate::types::PageText;
use serde::{Deserialize, Serialize};

/// Lines of one page after scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedPage {
    pub number: u32,
    pub lines: Vec<String>,
}

/// Splits page text into trimmed, non-empty lines
pub struct LineScanner {
    max_pages: usize,
    normalize_decimals: bool,
}

impl LineScanner {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            max_pages: config.max_pages.max(1),
            normalize_decimals: config.normalize_decimal_separators,
        }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Lines of one page in original order
    pub fn scan(&self, raw: &str) -> Vec<String> {
        raw.lines()
            .map(|line| line.replace('\u{a0}', " "))
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .map(|line| {
                if self.normalize_decimals {
                    normalize_decimal_separators(&line).into_owned()
                } else {
                    line
                }
            })
            .collect()
    }

    /// Scans at most `max_pages` pages, lazily, so callers can stop early
    pub fn scan_pages<'a>(&'a self, pages: &'a [PageText]) -> impl Iterator<Item = ScannedPage> + 'a {
        pages.iter().take(self.max_pages).map(|page| ScannedPage {
            number: page.number,
            lines: self.scan(&page.text),
        })
    }
}
