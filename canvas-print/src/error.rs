//! Print generation error types.

use thiserror::Error;

/// Result type for print operations.
pub type PrintResult<T> = Result<T, PrintError>;

/// Errors scoped to a single print item.
#[derive(Debug, Error)]
pub enum PrintError {
    /// Nothing visible to print.
    #[error("Document has no visible elements to print")]
    EmptyDocument,

    /// Resolution must be positive.
    #[error("Invalid resolution: {0} dpi")]
    InvalidDpi(u32),

    /// The canvas has no printable area.
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas {
        /// Width in inches.
        width: f64,
        /// Height in inches.
        height: f64,
    },

    /// An image could not be fetched or identified.
    #[error("Failed to embed image {src}: {message}")]
    Image {
        /// Original reference.
        src: String,
        /// Cause.
        message: String,
    },

    /// Writing the artifact failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rasterising a proof failed.
    #[error("Raster proof failed: {0}")]
    Raster(String),
}
