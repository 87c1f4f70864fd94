pub mod backend;
pub mod decrypt;
pub mod pipeline;

// Re-export the pipeline API for convenience
pub use backend::{BackendError, OcrEngine, OcrError, PdfBackend};
pub use decrypt::{DecryptError, decrypt_to_sibling};
pub use pipeline::{Extraction, PageOutcome, extract_text};
