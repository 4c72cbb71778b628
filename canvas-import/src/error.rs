//! Error types for vector import.

use thiserror::Error;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that reject a whole import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The source is not well-formed XML.
    #[error("Malformed SVG: {0}")]
    Parse(#[from] roxmltree::Error),

    /// The source could not be fetched.
    #[error("Failed to fetch {url}: {message}")]
    Fetch {
        /// Requested location.
        url: String,
        /// Transport or status error.
        message: String,
    },

    /// A `data:` URI could not be decoded.
    #[error("Invalid data URI: {0}")]
    DataUri(String),

    /// The target canvas has no area.
    #[error("Invalid target canvas {width}x{height}")]
    InvalidTarget {
        /// Target width in inches.
        width: f64,
        /// Target height in inches.
        height: f64,
    },
}
