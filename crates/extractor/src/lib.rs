//! Entry point for extracting content from uploaded Office documents.
//!
//! The document kind is always declared by the caller (explicitly or through
//! the file extension); content is never sniffed.

use office_pptx::PresentationExtractor;
use office_xlsx::SpreadsheetExtractor;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

pub use office_core::{
    DocumentKind, Error, ExtractOptions, Extraction, ExtractionResult, ImageRef, ImageScope,
    Result, SheetContent, SlideContent, Warning,
};

/// Extract a document of a known kind.
pub fn extract<R: Read + Seek>(
    reader: R,
    kind: DocumentKind,
    file_name: &str,
    options: &ExtractOptions,
) -> Result<Extraction> {
    log::debug!("Extracting {} as {}", file_name, kind);

    let extraction = match kind {
        DocumentKind::Presentation => {
            PresentationExtractor::new().extract(reader, file_name, options)?
        }
        DocumentKind::Spreadsheet => {
            SpreadsheetExtractor::new().extract(reader, file_name, options)?
        }
    };

    if !extraction.warnings.is_empty() {
        log::info!(
            "Extracted {} with {} skipped fragment(s)",
            file_name,
            extraction.warnings.len()
        );
    }

    Ok(extraction)
}

/// Extract a document whose kind is given as a string, either a kind name
/// (`presentation`, `spreadsheet`) or an extension (`pptx`, `xlsx`).
pub fn extract_declared<R: Read + Seek>(
    reader: R,
    declared: &str,
    file_name: &str,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let kind: DocumentKind = declared.parse()?;
    extract(reader, kind, file_name, options)
}

/// Extract an in-memory upload.
pub fn extract_bytes(
    bytes: &[u8],
    kind: DocumentKind,
    file_name: &str,
    options: &ExtractOptions,
) -> Result<Extraction> {
    extract(Cursor::new(bytes), kind, file_name, options)
}

/// Extract a file on disk, taking its kind from the extension.
pub fn extract_path(path: &Path, options: &ExtractOptions) -> Result<Extraction> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let kind = DocumentKind::from_path(path)
        .ok_or_else(|| Error::UnsupportedFormat(file_name.to_string()))?;

    let reader = BufReader::new(File::open(path)?);
    extract(reader, kind, file_name, options)
}
