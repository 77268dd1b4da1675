//! Lowering options and their resolution against configured defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Configuration;
use crate::error::{LowerError, Result};

/// The recognized option keys.
pub const OPTION_KEYS: [&str; 4] = ["blockinner", "blocklevels", "openmp", "mpi"];

/// Resolved, immutable option set handed to rewriters and passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Options {
    /// Also block innermost loops (off by default to keep them SIMD-friendly).
    pub blockinner: bool,
    /// Levels of hierarchical blocking; `None` defers to the platform.
    pub blocklevels: Option<u32>,
    /// Generate OpenMP shared-memory parallelism.
    pub openmp: bool,
    /// Generate MPI distributed-memory parallelism.
    pub mpi: bool,
}

impl Options {
    /// Defaults taken from the configuration.
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            blockinner: config.dle_options.blockinner.unwrap_or(false),
            blocklevels: config.dle_options.blocklevels,
            openmp: config.openmp,
            mpi: config.mpi,
        }
    }
}

/// A caller-supplied option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Unset,
}

impl OptionValue {
    /// Parse the right-hand side of a `key=value` assignment.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "true" | "on" | "yes" => Some(OptionValue::Bool(true)),
            "false" | "off" | "no" => Some(OptionValue::Bool(false)),
            "none" | "unset" => Some(OptionValue::Unset),
            other => other.parse().ok().map(OptionValue::Int),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Unset => write!(f, "unset"),
        }
    }
}

/// Ordered caller-supplied overrides. Keys are not checked until resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    entries: Vec<(String, OptionValue)>,
}

impl OptionOverrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append an override.
    pub fn with(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Append an override. Later entries win over earlier ones.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        self.entries.push((key.into(), value));
    }

    /// Parse a `key=value` assignment (e.g. from the command line).
    /// A bare `key` means `key=true`.
    pub fn insert_assignment(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = match assignment.split_once('=') {
            Some((key, value)) => {
                let parsed = OptionValue::parse(value).ok_or_else(|| LowerError::InvalidOption {
                    key: key.trim().to_string(),
                    expected: "a boolean, an integer, or `none`",
                    found: value.trim().to_string(),
                })?;
                (key.trim(), parsed)
            }
            None => (assignment.trim(), OptionValue::Bool(true)),
        };
        self.insert(key, value);
        Ok(())
    }

    /// Overrides in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Whether no override was supplied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for OptionOverrides {
    fn from_iter<T: IntoIterator<Item = (K, OptionValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// An option key that was supplied but not recognized, and therefore dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedOption {
    pub key: String,
}

/// Result of merging overrides over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub options: Options,
    /// One entry per dropped key, in the order supplied.
    pub ignored: Vec<UnsupportedOption>,
}

/// Merge `overrides` over `defaults`.
///
/// Unrecognized keys are logged once each and dropped. A recognized key
/// carrying the wrong kind of value is an error.
pub fn resolve_options(defaults: Options, overrides: &OptionOverrides) -> Result<ResolvedOptions> {
    let mut options = defaults;
    let mut ignored = Vec::new();

    for (key, value) in overrides.iter() {
        match key {
            "blockinner" => options.blockinner = expect_bool(key, value)?,
            "openmp" => options.openmp = expect_bool(key, value)?,
            "mpi" => options.mpi = expect_bool(key, value)?,
            "blocklevels" => {
                options.blocklevels = match value {
                    OptionValue::Unset => None,
                    OptionValue::Int(n) => Some(u32::try_from(n).map_err(|_| invalid(
                        key,
                        "a non-negative integer",
                        value,
                    ))?),
                    OptionValue::Bool(_) => {
                        return Err(invalid(key, "a non-negative integer", value))
                    }
                }
            }
            _ => {
                warn!(option = key, recognized = ?OPTION_KEYS, "illegal lowering option; ignored");
                ignored.push(UnsupportedOption {
                    key: key.to_string(),
                });
            }
        }
    }

    Ok(ResolvedOptions { options, ignored })
}

fn expect_bool(key: &str, value: OptionValue) -> Result<bool> {
    match value {
        OptionValue::Bool(b) => Ok(b),
        _ => Err(invalid(key, "a boolean", value)),
    }
}

fn invalid(key: &str, expected: &'static str, value: OptionValue) -> LowerError {
    LowerError::InvalidOption {
        key: key.to_string(),
        expected,
        found: value.to_string(),
    }
}
