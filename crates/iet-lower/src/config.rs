//! Lowering configuration.
//!
//! Holds the process-level settings the lowering layer reads but does not
//! own: the target platform, whether OpenMP/MPI are enabled by default, the
//! profiling verbosity, and defaults for the blocking options. Loaded from an
//! `iet.toml` file and overlaid with `IET_*` environment variables.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use iet_targets::{resolve_platform, Platform, TargetError};
use serde::{Deserialize, Serialize};

use crate::error::{LowerError, Result};

/// Environment variable overriding [`Configuration::platform`].
pub const ENV_PLATFORM: &str = "IET_PLATFORM";
/// Environment variable overriding [`Configuration::openmp`].
pub const ENV_OPENMP: &str = "IET_OPENMP";
/// Environment variable overriding [`Configuration::mpi`].
pub const ENV_MPI: &str = "IET_MPI";
/// Environment variable overriding [`Configuration::profiling`].
pub const ENV_PROFILING: &str = "IET_PROFILING";

/// How much timing detail to report after each lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfilingLevel {
    #[default]
    Off,
    Basic,
    Advanced,
}

impl ProfilingLevel {
    /// Whether per-pass lines should be reported.
    pub fn is_detailed(self) -> bool {
        matches!(self, ProfilingLevel::Basic | ProfilingLevel::Advanced)
    }
}

impl fmt::Display for ProfilingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfilingLevel::Off => write!(f, "off"),
            ProfilingLevel::Basic => write!(f, "basic"),
            ProfilingLevel::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for ProfilingLevel {
    type Err = LowerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(ProfilingLevel::Off),
            "basic" => Ok(ProfilingLevel::Basic),
            "advanced" => Ok(ProfilingLevel::Advanced),
            _ => Err(LowerError::InvalidProfilingLevel { value: s.into() }),
        }
    }
}

/// Site-wide defaults for the blocking options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DleDefaults {
    #[serde(default)]
    pub blockinner: Option<bool>,
    #[serde(default)]
    pub blocklevels: Option<u32>,
}

/// Process-level lowering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Name of the target platform.
    pub platform: String,
    /// Enable OpenMP unless the caller overrides it.
    pub openmp: bool,
    /// Enable MPI unless the caller overrides it.
    pub mpi: bool,
    /// Profiling verbosity.
    pub profiling: ProfilingLevel,
    /// Defaults for `blockinner` / `blocklevels`.
    pub dle_options: DleDefaults,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            platform: "cpu64".into(),
            openmp: false,
            mpi: false,
            profiling: ProfilingLevel::Off,
            dle_options: DleDefaults::default(),
        }
    }
}

impl Configuration {
    /// Resolve the configured platform against the built-in catalogue.
    pub fn resolve_platform(&self) -> Result<Platform> {
        resolve_platform(&self.platform).ok_or_else(|| {
            TargetError::UnknownPlatform {
                name: self.platform.clone(),
            }
            .into()
        })
    }

    /// Overlay `IET_*` variables from `vars` onto this configuration.
    /// Unrelated variables are ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                ENV_PLATFORM => self.platform = value.to_string(),
                ENV_OPENMP => self.openmp = parse_flag(key, value)?,
                ENV_MPI => self.mpi = parse_flag(key, value)?,
                ENV_PROFILING => {
                    self.profiling = value.parse::<ProfilingLevel>().map_err(|_| {
                        LowerError::InvalidEnv {
                            var: key.into(),
                            value: value.into(),
                        }
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(LowerError::InvalidEnv {
            var: var.into(),
            value: value.into(),
        }),
    }
}

/// Load a configuration file.
pub fn load_config(path: &Path) -> Result<Configuration> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse a configuration from a TOML string. Missing keys take their defaults.
pub fn parse_config(toml_str: &str) -> Result<Configuration> {
    Ok(toml::from_str(toml_str)?)
}
