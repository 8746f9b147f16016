//! PDF Backend trait
//!
//! Defines the interface that all PDF extraction backends must implement.
//! Every backend hands back plain text per page so the rest of the pipeline
//! never sees PDF internals.

use crate::preprocessors::preprocessor::ExtractedPages;
use anyhow::Result;

/// Backend trait for PDF text extraction
pub trait PdfBackend: Send + Sync {
    /// Decode PDF bytes and extract the text layer of the leading pages
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<ExtractedPages>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;
}

pub mod lopdf;

pub use self::lopdf::LopdfBackend;
