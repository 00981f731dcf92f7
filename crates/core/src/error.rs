//! Error types for Peloton operations.
//!
//! This module defines the main error type [`PelotonError`] which represents
//! all possible errors that can occur while fetching pages, locating their
//! tables and coercing cell text into typed values.
//!
//! Sentinel-coded cells (`DNF`, `-`, empty text) are not errors. They are
//! normal data and coerce to `None` or zero; see [`crate::coerce`].
//!
//! # Example
//!
//! ```rust
//! use peloton_core::{PelotonError, Result};
//!
//! fn bib_number(text: &str) -> Result<u32> {
//!     text.trim()
//!         .parse()
//!         .map_err(|_| PelotonError::InvalidNumber { field: "bib".to_string(), value: text.to_string() })
//! }
//!
//! assert_eq!(bib_number("11").unwrap(), 11);
//! assert!(bib_number("eleven").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for page extraction operations.
///
/// Structural problems (a container missing from the page, a row with too
/// few cells) and malformed values are hard failures: an extraction call
/// either returns its whole table or one of these errors.
#[derive(Error, Debug)]
pub enum PelotonError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and non-success status codes.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided or extracted from a page.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// An expected container, table or cell is absent from the page.
    ///
    /// `path` names the lookup path that failed, e.g. `div.w36 > ul[1]`.
    #[error("Missing page structure: {path}")]
    MissingNode { path: String },

    /// A row has fewer cells than its schema declares.
    #[error("Row shape mismatch in {schema}: expected at least {expected} cells, found {found}")]
    ShapeMismatch { schema: &'static str, expected: usize, found: usize },

    /// A required attribute is absent from an element.
    #[error("Missing attribute `{attribute}` on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    /// Cell text that should be numeric but matches no sentinel and does not parse.
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    /// Cell or attribute text outside the set of known codes.
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    /// A rider-year result row appeared before any race header row.
    #[error("Result row {row} has no preceding race header")]
    MissingContext { row: usize },

    /// File not found.
    ///
    /// Returned when attempting to read a saved page that doesn't exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    ///
    /// Wraps standard I/O errors for file operations.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Record serialization errors.
    #[error("Failed to serialize records: {0}")]
    SerializeError(String),
}

impl PelotonError {
    /// Shorthand for a [`PelotonError::MissingNode`] with the given path.
    pub fn missing(path: impl Into<String>) -> Self {
        PelotonError::MissingNode { path: path.into() }
    }

    /// Shorthand for a [`PelotonError::InvalidNumber`].
    pub fn invalid_number(field: &str, value: &str) -> Self {
        PelotonError::InvalidNumber { field: field.to_string(), value: value.to_string() }
    }

    /// Shorthand for a [`PelotonError::InvalidValue`].
    pub fn invalid_value(field: &str, value: &str) -> Self {
        PelotonError::InvalidValue { field: field.to_string(), value: value.to_string() }
    }
}

impl From<serde_json::Error> for PelotonError {
    fn from(err: serde_json::Error) -> Self {
        PelotonError::SerializeError(err.to_string())
    }
}

/// Result type alias for PelotonError.
///
/// This is a convenience alias for `std::result::Result<T, PelotonError>`.
pub type Result<T> = std::result::Result<T, PelotonError>;
