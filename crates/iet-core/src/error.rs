//! Error types for IET operations.

use std::path::PathBuf;

/// Errors that can occur while reading, writing, or hashing an IET.
#[derive(Debug, thiserror::Error)]
pub enum IetError {
    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading/writing IET files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// IET file not found.
    #[error("IET file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

/// Result type for IET operations.
pub type Result<T> = std::result::Result<T, IetError>;
