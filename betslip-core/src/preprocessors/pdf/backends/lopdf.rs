//! lopdf Backend for PDF processing
//!
//! Pure-Rust decoding of the PDF object graph and per-page text extraction.
//! Only the leading pages are extracted; the slip never spans more than the
//! configured cap and the rest of the document is filler.

use super::PdfBackend;
use crate::error::{panic_message, SlipError};
use crate::preprocessors::preprocessor::ExtractedPages;
use anyhow::Result;
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};

pub struct LopdfBackend {
    max_pages: usize,
}

impl LopdfBackend {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }

    fn extract_unguarded(&self, pdf_bytes: &[u8]) -> Result<ExtractedPages> {
        let document =
            Document::load_mem(pdf_bytes).map_err(|e| SlipError::PdfDecode(e.to_string()))?;

        // Page numbers are 1-indexed and ordered
        let pages = document.get_pages();
        let page_count = pages.len();
        tracing::info!("📄 PDF has {page_count} pages, reading up to {}", self.max_pages);

        let texts = pages
            .keys()
            .take(self.max_pages)
            .map(|&page_number| {
                document.extract_text(&[page_number]).unwrap_or_else(|e| {
                    tracing::warn!("⚠️  No text extracted from page {page_number}: {e}");
                    String::new()
                })
            })
            .collect();

        Ok(ExtractedPages { texts, page_count })
    }
}

impl PdfBackend for LopdfBackend {
    /// lopdf panics on some malformed object graphs (e.g. a font dictionary
    /// without /Type); those surface as decode errors
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<ExtractedPages> {
        panic::catch_unwind(AssertUnwindSafe(|| self.extract_unguarded(pdf_bytes))).unwrap_or_else(
            |payload| {
                let message = panic_message(payload.as_ref());
                tracing::warn!("⚠️  lopdf panicked while decoding: {message}");
                Err(SlipError::PdfDecode(format!("lopdf panicked: {message}")).into())
            },
        )
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}
