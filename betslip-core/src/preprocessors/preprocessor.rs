// Preprocessor abstraction for document processing
//
// This module defines the boundary between document decoding (PDF -> page text)
// and slip extraction (page text -> MatchRecord). Everything after this point
// works with plain page text and is format-agnostic.

use crate::types::PreprocessorOutput;
use anyhow::Result;
use std::path::Path;

/// Raw page texts as decoded from a document, before numbering
#[derive(Debug, Clone, Default)]
pub struct ExtractedPages {
    /// Text of the leading pages, at most the configured page cap
    pub texts: Vec<String>,
    /// Total pages in the document
    pub page_count: usize,
}

/// Preprocessor trait - converts documents to per-page text
///
/// The preprocessing happens in two steps:
/// 1. Document bytes -> raw page texts (format-specific decoding)
/// 2. Raw page texts -> PreprocessorOutput (numbering and metadata)
pub trait Preprocessor {
    /// Step 1: decode the document and pull the text layer of each page
    fn extract_page_texts(&self, bytes: &[u8]) -> Result<ExtractedPages>;

    /// Step 2: number the pages and attach document metadata
    fn pages_to_preprocessor_output(&self, pages: ExtractedPages) -> Result<PreprocessorOutput> {
        Ok(PreprocessorOutput::from_page_texts(
            pages.texts,
            pages.page_count,
            self.name(),
        ))
    }

    /// Full document processing (combines both steps)
    fn process(&self, bytes: &[u8]) -> Result<PreprocessorOutput> {
        let pages = self.extract_page_texts(bytes)?;
        self.pages_to_preprocessor_output(pages)
    }

    /// Preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Lowercase extension check shared by the preprocessors
pub(crate) fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(expected))
}
