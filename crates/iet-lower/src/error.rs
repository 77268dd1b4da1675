//! Lowering errors.

use iet_targets::TargetError;
use thiserror::Error;

/// A malformed registration; fatal for backend initialization.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("not a platform class: {0}")]
    MalformedClass(#[from] TargetError),

    #[error("mode mapping for platform class `{class}` lacks required mode `{mode}`")]
    MissingMode { class: String, mode: &'static str },
}

/// Failure reported by a single pass.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PassError {
    message: String,
}

impl PassError {
    /// A failure described by `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur while resolving and running a lowering.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("couldn't find a rewriter `{mode}` for platform `{platform}`")]
    TargetNotFound { mode: String, platform: String },

    #[error("pass `{pass}` failed: {source}")]
    PassExecutionFailure {
        pass: String,
        #[source]
        source: PassError,
    },

    #[error("option `{key}` expects {expected}, got {found}")]
    InvalidOption {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("unknown pass `{name}` requested for platform `{platform}`")]
    UnknownPass { name: String, platform: String },

    #[error("invalid profiling level `{value}` (expected off, basic or advanced)")]
    InvalidProfilingLevel { value: String },

    #[error("invalid value `{value}` for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Target(#[from] TargetError),
}

/// Result type for lowering operations.
pub type Result<T> = std::result::Result<T, LowerError>;
