use std::path::{Path, PathBuf};

use lopdf::Document;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DecryptError {
    #[error("failed to load PDF: {0}")]
    Load(String),
    #[error("empty-password decryption failed: {0}")]
    EmptyPassword(String),
    #[error("failed to write decrypted copy: {0}")]
    Save(String),
}

/// Produce a copy of the PDF at `path` that opens without a password.
///
/// Encrypted inputs are decrypted with the empty user password, the only
/// credential this tool supports. The copy is written to
/// `<path>_decrypted.pdf` and that path is returned. An unencrypted input
/// still gets the copy, so the caller can always hand the returned path to
/// the extraction stage.
pub fn decrypt_to_sibling(path: &Path) -> Result<PathBuf, DecryptError> {
    let mut doc = Document::load(path).map_err(|e| DecryptError::Load(e.to_string()))?;

    if doc.is_encrypted() {
        info!(path = %path.display(), "PDF is encrypted, attempting empty-password decryption");
        doc.decrypt("")
            .map_err(|e| DecryptError::EmptyPassword(e.to_string()))?;
        // decrypt() rewrites the objects in place; dropping the Encrypt
        // dictionary makes the saved copy a plain PDF.
        doc.trailer.remove(b"Encrypt");
    }

    let out_path = sibling_path(path);
    doc.save(&out_path)
        .map_err(|e| DecryptError::Save(e.to_string()))?;
    info!(path = %out_path.display(), "decrypted copy written");

    Ok(out_path)
}

/// The suffix is appended to the full input path, extension included, so
/// repeated runs always target the same `<path>_decrypted.pdf` artifact.
fn sibling_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push("_decrypted.pdf");
    PathBuf::from(name)
}
