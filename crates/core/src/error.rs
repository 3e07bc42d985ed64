//! Error types for Office document extraction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during document extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// The container is unreadable or structurally invalid at the top level.
    #[error("Invalid document container: {0}")]
    Format(String),

    /// A specifically requested entry does not exist in the container.
    #[error("Entry not found in container: {0}")]
    MissingEntry(String),

    /// The declared document kind is not one this extractor implements.
    #[error("Unsupported document kind: {0}")]
    UnsupportedFormat(String),

    /// An XML part could not be parsed.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize an extraction result.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error only concerns a single optional entry.
    pub fn is_missing_entry(&self) -> bool {
        matches!(self, Error::MissingEntry(_))
    }
}
