use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pdftext_mupdf::MupdfBackend;
use pdftext_ocr::TesseractOcr;

const LOG_FILE: &str = "pdf_extraction.log";

/// Extract plain text from a PDF, with OCR fallback for image-only pages.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the PDF file
    path: PathBuf,

    /// Language passed to tesseract for the OCR fallback
    #[arg(long, default_value = "eng")]
    ocr_lang: String,

    /// Rasterization resolution for the OCR fallback, in dots per inch
    #[arg(long, default_value_t = 300)]
    dpi: u32,
}

fn main() -> ExitCode {
    // Diagnostics go to a fixed append-only file in the working directory,
    // never to the console; stdout is reserved for the extracted text.
    let appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{e}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Usage goes to stdout with exit status 1, the tool's historical
            // contract for a missing or malformed argument.
            println!("{e}");
            error!("no valid file path provided");
            return ExitCode::FAILURE;
        }
    };

    info!(path = %cli.path.display(), "started");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("extraction failed: {e:#}");
            // Human-readable failure message on stdout, per the same contract.
            println!("Error extracting text: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let decrypted = pdftext_core::decrypt_to_sibling(&cli.path)?;

    let backend = MupdfBackend::new();
    let ocr = TesseractOcr::new(&cli.ocr_lang, cli.dpi);
    let extraction = pdftext_core::extract_text(&decrypted, &backend, &ocr)?;

    for (page, reason) in extraction.skipped() {
        eprintln!("Error processing page {page}: {reason}");
    }

    println!("{}", extraction.text());
    info!("text output successfully printed");
    Ok(())
}
