use std::path::Path;

use mupdf::{Document, TextPageFlags};

use pdftext_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// Lives in its own crate to keep the AGPL-3.0 mupdf dependency out of the
/// decryption and OCR code paths.
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(
        &self,
        path: &Path,
    ) -> Result<Vec<Result<String, BackendError>>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Open("invalid path encoding".into()))?;

        let document = Document::open(path_str).map_err(|e| BackendError::Open(e.to_string()))?;

        let mut pages = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| BackendError::Open(e.to_string()))?
        {
            pages.push(page_text(page_result));
        }
        Ok(pages)
    }
}

/// Text of one page, assembled from text-page blocks and lines to match
/// PyMuPDF's get_text() behavior. An image-only page yields an empty string,
/// which is what triggers the caller's OCR fallback.
fn page_text(page_result: Result<mupdf::Page, mupdf::Error>) -> Result<String, BackendError> {
    let page = page_result.map_err(|e| BackendError::Extraction(e.to_string()))?;
    let text_page = page
        .to_text_page(TextPageFlags::empty())
        .map_err(|e| BackendError::Extraction(e.to_string()))?;

    let mut text = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            for ch in line.chars() {
                text.push(ch.char().unwrap_or('\u{FFFD}'));
            }
            text.push('\n');
        }
    }
    Ok(text)
}
