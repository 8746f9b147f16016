//! Document Preprocessors
//!
//! This module provides the preprocessing layer for converting slip documents
//! into a unified PreprocessorOutput that feeds into the extraction rules.
//!
//! ## Architecture
//!
//! ```text
//! Document (PDF, TXT)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! PreprocessorOutput (per-page text)
//!     ↓
//! [Rule Engine]
//!     ↓
//! MatchRecord
//! ```
//!
//! ## Available Preprocessors
//!
//! - `PdfPreprocessor` - PDF documents via the lopdf backend
//! - `TextPreprocessor` - already-extracted text, pages split by form feed

pub mod pdf;
pub mod preprocessor;
pub mod text;

use crate::error::SlipError;
use anyhow::Result;
use std::path::Path;

// Re-export main types
pub use pdf::{LopdfBackend, PdfBackend, PdfBackendImpl, PdfPreprocessor};
pub use preprocessor::{ExtractedPages, Preprocessor};
pub use text::TextPreprocessor;

/// Pick the preprocessor for a file by its extension
pub fn preprocessor_for_path(path: &Path, max_pages: usize) -> Result<Box<dyn Preprocessor>> {
    let candidates: Vec<Box<dyn Preprocessor>> = vec![
        Box::new(PdfPreprocessor::new_with_lopdf(max_pages)),
        Box::new(TextPreprocessor::new(max_pages)),
    ];

    candidates
        .into_iter()
        .find(|preprocessor| preprocessor.supports_file_type(path))
        .ok_or_else(|| SlipError::UnsupportedFileType(path.to_path_buf()).into())
}
