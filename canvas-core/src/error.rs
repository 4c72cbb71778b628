//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Element not found in the document.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An element with the same id already exists in the document.
    #[error("Duplicate element id: {0}")]
    DuplicateId(String),

    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// A layer index was outside the element sequence.
    #[error("Layer index {index} out of range for {len} elements")]
    LayerIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the sequence.
        len: usize,
    },

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Asset upload failed; the message is suitable for display.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The editing session was closed before an async operation completed.
    #[error("Design session closed")]
    SessionClosed,
}
