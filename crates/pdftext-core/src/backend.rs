use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text-layer extraction backends.
///
/// Implementors provide the low-level per-page text extraction step; the
/// OCR fallback and output assembly live in [`crate::pipeline`].
pub trait PdfBackend: Send + Sync {
    /// Extract the text layer of every page, in page order.
    ///
    /// The outer error means the document could not be opened at all. An
    /// inner error marks a single page that failed to parse; the pages
    /// around it are still usable. A page without a text layer (e.g. a
    /// scanned image) yields `Ok` with an empty string.
    fn extract_pages(
        &self,
        path: &Path,
    ) -> Result<Vec<Result<String, BackendError>>, BackendError>;
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR produced non-UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("{0}")]
    Tool(String),
}

/// Trait for OCR engines used as the fallback for pages without a text layer.
pub trait OcrEngine: Send + Sync {
    /// Rasterize and recognize one page (1-based) of the PDF at `path`.
    fn recognize_page(&self, path: &Path, page_number: usize) -> Result<String, OcrError>;
}
