//! OCR fallback for pages without a text layer.
//!
//! Rasterization and recognition are delegated to the external `pdftoppm`
//! (Poppler) and `tesseract` binaries, the same pair the pdf2image and
//! pytesseract stacks drive. Each call rasterizes exactly one page into a
//! scratch directory and feeds the resulting PNG to tesseract.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use pdftext_core::{OcrEngine, OcrError};

const DEFAULT_LANG: &str = "eng";
const DEFAULT_DPI: u32 = 300;

/// [`OcrEngine`] backed by Poppler's `pdftoppm` and the `tesseract` CLI.
pub struct TesseractOcr {
    lang: String,
    dpi: u32,
    pdftoppm_bin: String,
    tesseract_bin: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            dpi: DEFAULT_DPI,
            pdftoppm_bin: "pdftoppm".to_string(),
            tesseract_bin: "tesseract".to_string(),
        }
    }
}

impl TesseractOcr {
    pub fn new(lang: &str, dpi: u32) -> Self {
        Self {
            lang: lang.to_string(),
            dpi,
            ..Self::default()
        }
    }

    /// Override the tool binaries. Used by tests to simulate missing tools.
    pub fn with_tools(mut self, pdftoppm: &str, tesseract: &str) -> Self {
        self.pdftoppm_bin = pdftoppm.to_string();
        self.tesseract_bin = tesseract.to_string();
        self
    }

    fn rasterize(&self, path: &Path, page_number: usize, dir: &Path) -> Result<PathBuf, OcrError> {
        let prefix = format!("page_{page_number}");
        let output = Command::new(&self.pdftoppm_bin)
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(path)
            .arg(dir.join(&prefix))
            .output()
            .map_err(|e| OcrError::Tool(format!("pdftoppm failed to start: {e}")))?;

        if !output.status.success() {
            return Err(OcrError::Tool(format!(
                "pdftoppm failed for page {page_number}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        find_page_image(dir, &prefix)?.ok_or_else(|| {
            OcrError::Tool(format!("pdftoppm produced no image for page {page_number}"))
        })
    }

    fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.tesseract_bin)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .map_err(|e| OcrError::Tool(format!("tesseract failed to start: {e}")))?;

        if !output.status.success() {
            return Err(OcrError::Tool(format!(
                "tesseract failed on {}: {}",
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize_page(&self, path: &Path, page_number: usize) -> Result<String, OcrError> {
        let scratch = TempDir::new()?;
        let image = self.rasterize(path, page_number, scratch.path())?;
        debug!(page = page_number, image = %image.display(), "page rasterized");
        self.recognize(&image)
    }
}

/// Locate the PNG `pdftoppm` emitted for `prefix`. The page-number suffix is
/// zero-padded to the width of the document's last page, so the exact file
/// name cannot be predicted from the requested page alone.
fn find_page_image(dir: &Path, prefix: &str) -> Result<Option<PathBuf>, OcrError> {
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().is_some_and(|ext| ext == "png")
                && p.file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.starts_with(prefix))
        })
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}
