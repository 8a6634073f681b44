//! Error types for protolayout library.

use std::io;
use thiserror::Error;

/// Result type alias for protolayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or configuring a layout run.
///
/// Structural variation in the input (odd spans, unrecognized rows, tables
/// taller than a page) is never an error; it is reported through
/// [`crate::Diagnostic`] values instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a valid document or pattern file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured content pattern failed to compile.
    #[error("Invalid pattern `{name}`: {source}")]
    InvalidPattern {
        /// Name of the pattern in the configuration
        name: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// The useful page height is not a finite positive number.
    #[error("Invalid useful page height: {0}")]
    InvalidPageHeight(f32),

    /// Error during rendering (JSON, text preview).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
