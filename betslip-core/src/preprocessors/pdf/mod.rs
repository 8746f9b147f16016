//! PDF Preprocessor
//!
//! Main preprocessor for PDF documents. Uses a pluggable backend to pull the
//! text layer of each page.

pub mod backends;

use crate::preprocessors::preprocessor::{has_extension, ExtractedPages, Preprocessor};
use anyhow::Result;
use std::path::Path;

pub use backends::{LopdfBackend, PdfBackend};

/// Backend enum for runtime backend selection
pub enum PdfBackendImpl {
    Lopdf(LopdfBackend),
}

impl PdfBackend for PdfBackendImpl {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<ExtractedPages> {
        match self {
            PdfBackendImpl::Lopdf(backend) => backend.extract_pages(pdf_bytes),
        }
    }

    fn name(&self) -> &str {
        match self {
            PdfBackendImpl::Lopdf(backend) => backend.name(),
        }
    }
}

/// PDF Preprocessor with pluggable backend
pub struct PdfPreprocessor {
    backend: PdfBackendImpl,
}

impl PdfPreprocessor {
    /// PdfPreprocessor over the pure-Rust lopdf backend
    pub fn new_with_lopdf(max_pages: usize) -> Self {
        Self {
            backend: PdfBackendImpl::Lopdf(LopdfBackend::new(max_pages)),
        }
    }
}

impl Preprocessor for PdfPreprocessor {
    /// Step 1: Extract page texts via backend
    fn extract_page_texts(&self, bytes: &[u8]) -> Result<ExtractedPages> {
        tracing::debug!("📄 Decoding PDF with the {} backend", self.backend.name());
        self.backend.extract_pages(bytes)
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "pdf")
    }
}
