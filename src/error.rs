//! Error types for docrecon.
//!
//! Two error types reflect two failure scopes:
//!
//! * [`Error`] covers anything that fails a tier or the whole conversion.
//! * [`PageError`] records a single page's failure inside a
//!   [`crate::model::ConversionRecord`] without stopping the page loop.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for docrecon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source could not be rasterized (corrupt, password-protected).
    #[error("Render error for '{path}': {detail}")]
    Render { path: PathBuf, detail: String },

    /// The OCR engine failed on a page.
    #[error("Recognition failed on page {page}: {detail}")]
    Recognition { page: u32, detail: String },

    /// A block's geometry is degenerate.
    #[error("Degenerate layout geometry: {0}")]
    Layout(String),

    /// The text normalizer produced nothing usable.
    #[error("Normalization produced no usable text")]
    NormalizationEmpty,

    /// The text-layer reader could not open or read the document.
    #[error("Text layer error: {0}")]
    TextLayer(String),

    /// The document writer failed to serialize the output.
    #[error("Failed to write output '{path}': {detail}")]
    Write { path: PathBuf, detail: String },

    /// The record store failed to persist a conversion record.
    #[error("Failed to persist conversion record: {0}")]
    Persist(String),

    /// A rule table contains an invalid pattern.
    #[error("Invalid pattern '{pattern}': {detail}")]
    Pattern { pattern: String, detail: String },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Every tier failed; carries the last tier's diagnostic.
    #[error("All conversion methods failed: {diagnostic}")]
    AllTiersFailed { diagnostic: String },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error must abort the whole conversion.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Render { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => {
                Error::TextLayer("document is encrypted".to_string())
            }
            _ => Error::TextLayer(err.to_string()),
        }
    }
}

/// The pipeline stage a page failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStage {
    /// Reading the page's native text layer.
    TextLayer,
    /// Normalizing native text.
    Normalize,
    /// Calling the OCR engine.
    Recognition,
    /// Building positioned regions.
    Layout,
}

/// A non-fatal error for a single page.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
#[error("Page {page}: {stage:?} failed: {detail}")]
pub struct PageError {
    /// Page number (1-indexed)
    pub page: u32,
    /// Stage that failed
    pub stage: PageStage,
    /// Human-readable diagnostic
    pub detail: String,
}

impl PageError {
    /// Create a new page error.
    pub fn new(page: u32, stage: PageStage, detail: impl Into<String>) -> Self {
        Self {
            page,
            stage,
            detail: detail.into(),
        }
    }
}
