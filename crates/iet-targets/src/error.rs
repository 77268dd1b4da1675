//! Error types for target platform operations.

use std::path::PathBuf;

/// Errors that can occur during target platform operations.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading/writing platform files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Platform file not found.
    #[error("platform file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// No built-in platform with this name.
    #[error("unknown platform: '{name}'")]
    UnknownPlatform {
        /// The requested name.
        name: String,
    },

    /// A platform class whose ancestor chain is not rooted at `platform`.
    #[error("malformed platform class '{tag}': {detail}")]
    MalformedClass {
        /// Tag of the offending class.
        tag: String,
        /// What is wrong with its ancestor chain.
        detail: String,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
