//! Domain types for representing extracted document content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::text::title_from_filename;

/// The structured record produced by one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Document base name, without extension.
    pub title: String,

    /// When and from what the result was extracted.
    pub metadata: ExtractionMetadata,

    /// Either slides or sheets, depending on the source container.
    #[serde(flatten)]
    pub content: DocumentContent,
}

impl ExtractionResult {
    /// Create a result for the given original file name.
    pub fn new(original_file_name: &str, content: DocumentContent, image_count: usize) -> Self {
        Self {
            title: title_from_filename(original_file_name),
            metadata: ExtractionMetadata {
                extracted_at: Utc::now(),
                original_file_name: original_file_name.to_string(),
                image_count,
            },
            content,
        }
    }

    /// Slides, if this result came from a presentation.
    pub fn slides(&self) -> Option<&[SlideContent]> {
        match &self.content {
            DocumentContent::Slides(slides) => Some(slides),
            DocumentContent::Sheets(_) => None,
        }
    }

    /// Sheets, if this result came from a spreadsheet.
    pub fn sheets(&self) -> Option<&[SheetContent]> {
        match &self.content {
            DocumentContent::Sheets(sheets) => Some(sheets),
            DocumentContent::Slides(_) => None,
        }
    }
}

/// Provenance of an extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub extracted_at: DateTime<Utc>,
    pub original_file_name: String,
    /// Number of images written to the output directory.
    #[serde(default)]
    pub image_count: usize,
}

/// Per-kind content. Serializes as a `slides` or `sheets` key on the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentContent {
    Slides(Vec<SlideContent>),
    Sheets(Vec<SheetContent>),
}

/// Text and images of a single slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideContent {
    /// Index parsed from the `slide<N>.xml` entry name.
    pub slide_number: usize,

    /// Run-level text fragments joined by single spaces.
    pub text: String,

    pub images: Vec<ImageRef>,
}

impl SlideContent {
    /// Create an empty slide with the given number.
    pub fn new(slide_number: usize) -> Self {
        Self {
            slide_number,
            text: String::new(),
            images: Vec::new(),
        }
    }
}

/// Rows of a single worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetContent {
    pub name: String,
    pub id: String,
    /// Each row maps a column letter ("A", "B", ...) to the cell's value.
    pub rows: Vec<std::collections::BTreeMap<String, String>>,
}

/// An image written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Generated name, `image_<seed>_<ordinal>.png`.
    pub file_name: String,
    /// Path of the media entry inside the container.
    pub original_path: String,
}

impl ImageRef {
    /// Path under which the image is served to clients.
    pub fn url(&self) -> String {
        format!("/images/{}", self.file_name)
    }
}

/// A non-fatal anomaly encountered while extracting one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Container entry (and optionally the position inside it) concerned.
    pub location: String,
    pub message: String,
}

impl Warning {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Log this warning and add it to `warnings`.
    pub fn record(self, warnings: &mut Vec<Warning>) {
        log::warn!("Skipped {}", self);
        warnings.push(self);
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Everything one extraction call hands back to its caller.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The persisted record.
    pub result: ExtractionResult,
    /// All images written, in ordinal order.
    pub images: Vec<ImageRef>,
    /// Fragments that were skipped.
    pub warnings: Vec<Warning>,
}

/// The kind of container a caller declares for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// PPTX presentation.
    Presentation,
    /// XLSX spreadsheet.
    Spreadsheet,
}

impl DocumentKind {
    /// Kind for a file extension (`pptx`, `xlsx`), case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Presentation),
            "xlsx" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Kind declared by a file name's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    /// Accepts a kind name (`presentation`, `spreadsheet`) or an extension.
    fn from_str(s: &str) -> Result<Self> {
        let declared = s.trim().trim_start_matches('.');
        match declared.to_lowercase().as_str() {
            "presentation" => Ok(Self::Presentation),
            "spreadsheet" => Ok(Self::Spreadsheet),
            other => Self::from_extension(other)
                .ok_or_else(|| Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presentation => write!(f, "presentation"),
            Self::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// How extracted presentation images are associated with slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageScope {
    /// Every extracted image is listed on every slide.
    #[default]
    SharedGallery,
    /// Images are listed only on slides whose relationships reference them.
    PerSlide,
}

/// Per-call extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory receiving extracted images. Created if missing.
    pub output_dir: PathBuf,
    /// Caller-supplied value making image names unique across calls.
    pub seed: u64,
    pub image_scope: ImageScope,
}

impl ExtractOptions {
    /// Create options writing images into `output_dir` with the given seed.
    pub fn new(output_dir: impl Into<PathBuf>, seed: u64) -> Self {
        Self {
            output_dir: output_dir.into(),
            seed,
            image_scope: ImageScope::default(),
        }
    }

    /// Choose how presentation images are associated with slides.
    pub fn with_image_scope(mut self, scope: ImageScope) -> Self {
        self.image_scope = scope;
        self
    }
}
