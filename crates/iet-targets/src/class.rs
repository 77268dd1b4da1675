//! Platform classes and the specialization hierarchy.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};

/// Tag of the universal root class every platform class descends from.
pub const ROOT_TAG: &str = "platform";

/// A node in the platform specialization hierarchy.
///
/// `lineage` is the ancestor chain ordered most specific first: it starts
/// with the class's own tag and ends with [`ROOT_TAG`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformClass {
    tag: String,
    lineage: Vec<String>,
}

impl PlatformClass {
    /// The universal root class.
    pub fn root() -> Self {
        Self {
            tag: ROOT_TAG.to_string(),
            lineage: vec![ROOT_TAG.to_string()],
        }
    }

    /// Define a class specializing `parent`.
    pub fn derive(tag: impl Into<String>, parent: &PlatformClass) -> Self {
        let tag = tag.into();
        let mut lineage = Vec::with_capacity(parent.lineage.len() + 1);
        lineage.push(tag.clone());
        lineage.extend(parent.lineage.iter().cloned());
        Self { tag, lineage }
    }

    /// Rebuild a class from an explicit tag and ancestor chain.
    ///
    /// The chain is taken as given; call [`PlatformClass::validate`] before
    /// trusting it.
    pub fn from_lineage(tag: impl Into<String>, lineage: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            lineage,
        }
    }

    /// The class tag, e.g. `intel64-knl`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Ancestor chain, most specific first, ending at the root.
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// Whether this class is `tag` or a specialization of it.
    pub fn is_a(&self, tag: &str) -> bool {
        self.lineage.iter().any(|t| t == tag)
    }

    /// Whether this class is `other` or a specialization of it.
    pub fn specializes(&self, other: &PlatformClass) -> bool {
        self.is_a(other.tag())
    }

    /// Check that the ancestor chain is well-formed: it starts at this
    /// class, ends at the root, and names no class twice.
    pub fn validate(&self) -> Result<()> {
        let malformed = |detail: String| TargetError::MalformedClass {
            tag: self.tag.clone(),
            detail,
        };

        let first = self
            .lineage
            .first()
            .ok_or_else(|| malformed("empty ancestor chain".into()))?;
        if *first != self.tag {
            return Err(malformed(format!(
                "ancestor chain starts at '{first}' instead of the class itself"
            )));
        }
        if self.lineage.last().map(String::as_str) != Some(ROOT_TAG) {
            return Err(malformed(format!(
                "ancestor chain does not end at '{ROOT_TAG}'"
            )));
        }
        let mut seen = HashSet::new();
        for tag in &self.lineage {
            if !seen.insert(tag.as_str()) {
                return Err(malformed(format!("'{tag}' appears twice in ancestor chain")));
            }
        }
        Ok(())
    }
}

impl fmt::Display for PlatformClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lineage.join(" < "))
    }
}

/// Built-in classes.
///
/// ```text
/// platform
/// ├── cpu64
/// │   ├── intel64
/// │   │   ├── intel64-skx
/// │   │   └── intel64-knl
/// │   ├── arm
/// │   └── power
/// └── device
///     └── nvidia
/// ```
pub mod classes {
    use super::PlatformClass;

    pub fn cpu64() -> PlatformClass {
        PlatformClass::derive("cpu64", &PlatformClass::root())
    }

    pub fn intel64() -> PlatformClass {
        PlatformClass::derive("intel64", &cpu64())
    }

    pub fn intel64_skx() -> PlatformClass {
        PlatformClass::derive("intel64-skx", &intel64())
    }

    pub fn intel64_knl() -> PlatformClass {
        PlatformClass::derive("intel64-knl", &intel64())
    }

    pub fn arm() -> PlatformClass {
        PlatformClass::derive("arm", &cpu64())
    }

    pub fn power() -> PlatformClass {
        PlatformClass::derive("power", &cpu64())
    }

    pub fn device() -> PlatformClass {
        PlatformClass::derive("device", &PlatformClass::root())
    }

    pub fn nvidia() -> PlatformClass {
        PlatformClass::derive("nvidia", &device())
    }
}
