use std::path::Path;

use tracing::{error, info, warn};

use crate::backend::{BackendError, OcrEngine, PdfBackend};

/// Outcome of processing a single page.
#[derive(Debug)]
pub enum PageOutcome {
    /// The text layer was present.
    Text(String),
    /// The text layer was empty; OCR supplied the text.
    Ocr(String),
    /// The page produced no text; `reason` says why.
    Skipped { page: usize, reason: String },
}

/// Per-page outcomes of one extraction run, in page order.
#[derive(Debug)]
pub struct Extraction {
    pub pages: Vec<PageOutcome>,
}

impl Extraction {
    /// Join the successful pages into the final output, each page's text
    /// terminated by a newline. Skipped pages contribute nothing; no
    /// placeholder is emitted.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            match page {
                PageOutcome::Text(t) | PageOutcome::Ocr(t) => {
                    out.push_str(t);
                    out.push('\n');
                }
                PageOutcome::Skipped { .. } => {}
            }
        }
        out
    }

    /// Pages that contributed no text, for stderr reporting.
    pub fn skipped(&self) -> impl Iterator<Item = (usize, &str)> {
        self.pages.iter().filter_map(|page| match page {
            PageOutcome::Skipped { page, reason } => Some((*page, reason.as_str())),
            _ => None,
        })
    }
}

/// Extract the text of every page of the PDF at `path`.
///
/// Pages whose text layer is empty are rasterized and recognized by `ocr`,
/// one page at a time. A page that fails to parse, or whose OCR run fails,
/// becomes [`PageOutcome::Skipped`] and the remaining pages are still
/// processed. Only a document that cannot be opened at all is a hard error.
pub fn extract_text(
    path: &Path,
    backend: &dyn PdfBackend,
    ocr: &dyn OcrEngine,
) -> Result<Extraction, BackendError> {
    info!(path = %path.display(), "starting text extraction");

    let pages = backend.extract_pages(path)?;
    info!(total_pages = pages.len(), "PDF opened");

    let mut outcomes = Vec::with_capacity(pages.len());
    for (index, page) in pages.into_iter().enumerate() {
        outcomes.push(process_page(path, index + 1, page, ocr));
    }

    info!(path = %path.display(), "text extraction completed");
    Ok(Extraction { pages: outcomes })
}

fn process_page(
    path: &Path,
    number: usize,
    page: Result<String, BackendError>,
    ocr: &dyn OcrEngine,
) -> PageOutcome {
    let text = match page {
        Ok(text) => text,
        Err(e) => {
            error!(page = number, error = %e, "page extraction failed");
            return PageOutcome::Skipped {
                page: number,
                reason: e.to_string(),
            };
        }
    };

    if !text.trim().is_empty() {
        info!(page = number, "extracted text from page");
        return PageOutcome::Text(text);
    }

    warn!(page = number, "no text found on page, processing with OCR");
    match ocr.recognize_page(path, number) {
        Ok(recognized) => {
            info!(page = number, "OCR text extraction completed");
            PageOutcome::Ocr(recognized)
        }
        Err(e) => {
            error!(page = number, error = %e, "OCR failed");
            PageOutcome::Skipped {
                page: number,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OcrError;

    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum FakePage {
        Text(&'static str),
        Broken(&'static str),
    }

    struct FakeBackend(Vec<FakePage>);

    impl PdfBackend for FakeBackend {
        fn extract_pages(
            &self,
            _path: &Path,
        ) -> Result<Vec<Result<String, BackendError>>, BackendError> {
            Ok(self
                .0
                .iter()
                .map(|page| match page {
                    FakePage::Text(t) => Ok((*t).to_string()),
                    FakePage::Broken(msg) => Err(BackendError::Extraction((*msg).to_string())),
                })
                .collect())
        }
    }

    struct UnopenableBackend;

    impl PdfBackend for UnopenableBackend {
        fn extract_pages(
            &self,
            _path: &Path,
        ) -> Result<Vec<Result<String, BackendError>>, BackendError> {
            Err(BackendError::Open("not a PDF".into()))
        }
    }

    struct FakeOcr {
        text: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeOcr {
        fn returning(text: &'static str) -> Self {
            Self {
                text,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                text: "",
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OcrEngine for FakeOcr {
        fn recognize_page(&self, _path: &Path, _page_number: usize) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(OcrError::Tool("tesseract exploded".into()))
            } else {
                Ok(self.text.to_string())
            }
        }
    }

    fn pdf_path() -> PathBuf {
        PathBuf::from("input.pdf")
    }

    #[test]
    fn text_layer_pages_concatenate_in_order_without_ocr() {
        let backend = FakeBackend(vec![FakePage::Text("alpha"), FakePage::Text("beta")]);
        let ocr = FakeOcr::returning("never used");

        let extraction = extract_text(&pdf_path(), &backend, &ocr).unwrap();

        assert_eq!(extraction.text(), "alpha\nbeta\n");
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn empty_page_falls_back_to_ocr() {
        let backend = FakeBackend(vec![
            FakePage::Text("alpha"),
            FakePage::Text(""),
            FakePage::Text("gamma"),
        ]);
        let ocr = FakeOcr::returning("scanned words");

        let extraction = extract_text(&pdf_path(), &backend, &ocr).unwrap();

        assert_eq!(extraction.text(), "alpha\nscanned words\ngamma\n");
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn whitespace_only_page_counts_as_empty() {
        let backend = FakeBackend(vec![FakePage::Text(" \n\t \n")]);
        let ocr = FakeOcr::returning("recovered");

        let extraction = extract_text(&pdf_path(), &backend, &ocr).unwrap();

        assert_eq!(extraction.text(), "recovered\n");
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn broken_page_is_skipped_and_later_pages_survive() {
        let backend = FakeBackend(vec![
            FakePage::Text("one"),
            FakePage::Broken("bad xref"),
            FakePage::Text("three"),
        ]);
        let ocr = FakeOcr::returning("never used");

        let extraction = extract_text(&pdf_path(), &backend, &ocr).unwrap();

        assert_eq!(extraction.text(), "one\nthree\n");
        let skipped: Vec<_> = extraction.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, 2);
        assert!(skipped[0].1.contains("bad xref"));
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn ocr_failure_skips_the_page() {
        let backend = FakeBackend(vec![FakePage::Text(""), FakePage::Text("tail")]);
        let ocr = FakeOcr::failing();

        let extraction = extract_text(&pdf_path(), &backend, &ocr).unwrap();

        assert_eq!(extraction.text(), "tail\n");
        let skipped: Vec<_> = extraction.skipped().collect();
        assert_eq!(skipped, vec![(1, "tesseract exploded")]);
    }

    #[test]
    fn empty_ocr_output_is_kept_not_skipped() {
        let backend = FakeBackend(vec![FakePage::Text("")]);
        let ocr = FakeOcr::returning("");

        let extraction = extract_text(&pdf_path(), &backend, &ocr).unwrap();

        // The page ran through OCR, so it still terminates with a newline.
        assert_eq!(extraction.text(), "\n");
        assert_eq!(extraction.skipped().count(), 0);
    }

    #[test]
    fn unopenable_document_is_fatal() {
        let ocr = FakeOcr::returning("never used");
        let result = extract_text(&pdf_path(), &UnopenableBackend, &ocr);
        assert!(matches!(result, Err(BackendError::Open(_))));
    }
}
