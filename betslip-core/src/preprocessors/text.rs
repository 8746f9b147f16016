//! Text Preprocessor
//!
//! Accepts text that was already extracted from a slip, one page per
//! form-feed separated chunk. Useful for fixtures and for slips extracted by
//! an external tool.

use super::preprocessor::{has_extension, ExtractedPages, Preprocessor};
use anyhow::Result;
use std::path::Path;

const PAGE_SEPARATOR: char = '\u{000C}';

pub struct TextPreprocessor {
    max_pages: usize,
}

impl TextPreprocessor {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }
}

impl Preprocessor for TextPreprocessor {
    fn extract_page_texts(&self, bytes: &[u8]) -> Result<ExtractedPages> {
        let text = String::from_utf8_lossy(bytes);
        if matches!(text, std::borrow::Cow::Owned(_)) {
            tracing::warn!("⚠️  Input is not valid UTF-8, invalid sequences were replaced");
        }

        let pages: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
        Ok(ExtractedPages {
            page_count: pages.len(),
            texts: pages
                .into_iter()
                .take(self.max_pages)
                .map(str::to_string)
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "TextPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "txt")
    }
}
