//! TOML parsing, serialization, validation, and discovery for platform definitions.
//!
//! Custom platforms are stored as `.platform.toml` files in a `platforms/`
//! directory. A file names the platform's class together with its full
//! ancestor chain, so that a site-specific class can specialize a built-in one.

use std::path::{Path, PathBuf};

use crate::error::{Result, TargetError};
use crate::platform::{Isa, Platform};

/// A validation issue found in a platform definition.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Load a platform from a `.platform.toml` file.
pub fn load_platform_toml(path: &Path) -> Result<Platform> {
    if !path.exists() {
        return Err(TargetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_platform_toml(&content)
}

/// Parse a platform from a TOML string.
pub fn parse_platform_toml(toml_str: &str) -> Result<Platform> {
    let platform: Platform = toml::from_str(toml_str)?;
    Ok(platform)
}

/// Serialize a platform to pretty TOML.
pub fn platform_to_toml(platform: &Platform) -> Result<String> {
    let toml_str = toml::to_string_pretty(platform)?;
    Ok(toml_str)
}

/// Validate a platform definition for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_platform(platform: &Platform) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if let Err(e) = platform.class.validate() {
        issues.push(ValidationIssue {
            severity: "error",
            message: e.to_string(),
        });
    }

    if platform.cores_physical == 0 || platform.threads_per_core == 0 {
        issues.push(ValidationIssue {
            severity: "error",
            message: format!(
                "platform '{}' declares no hardware threads ({} cores x {} threads)",
                platform.name, platform.cores_physical, platform.threads_per_core
            ),
        });
    }

    if platform
        .cores_physical
        .checked_mul(platform.threads_per_core)
        .is_none()
    {
        issues.push(ValidationIssue {
            severity: "error",
            message: format!(
                "platform '{}' logical core count overflows ({} cores x {} threads)",
                platform.name, platform.cores_physical, platform.threads_per_core
            ),
        });
    }

    if platform.simd_reg_bytes != 0 && !platform.simd_reg_bytes.is_power_of_two() {
        issues.push(ValidationIssue {
            severity: "error",
            message: format!(
                "SIMD register width {} bytes is not a power of 2",
                platform.simd_reg_bytes
            ),
        });
    }

    let vector_isa = !matches!(platform.isa, Isa::Generic | Isa::Ptx);
    if vector_isa && platform.simd_reg_bytes == 0 {
        issues.push(ValidationIssue {
            severity: "warning",
            message: format!(
                "ISA {:?} implies SIMD registers but simd-reg-bytes is 0",
                platform.isa
            ),
        });
    }

    if platform.default_block_levels == 0 {
        issues.push(ValidationIssue {
            severity: "warning",
            message: "default-block-levels is 0; blocking will be skipped unless requested".into(),
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Discover all `.platform.toml` files in a project's `platforms/` directory.
///
/// Returns a list of (platform_name, file_path) pairs sorted by name.
pub fn discover_platforms(project_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let platforms_dir = project_dir.join("platforms");
    if !platforms_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut platforms = Vec::new();
    for entry in std::fs::read_dir(&platforms_dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(".platform.toml"))
            .map(str::to_string);
        if let Some(name) = name {
            platforms.push((name, path));
        }
    }
    platforms.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(platforms)
}
