//! Registry of rewriters, keyed by platform class and mode.
//!
//! Backends register their mode mappings on a [`RegistryBuilder`] at
//! startup; [`RegistryBuilder::seal`] then yields the read-only
//! [`TargetRegistry`] used by every lowering call. Only the sealed registry
//! can be queried, so a lookup can never observe a half-populated table.

use std::collections::HashMap;
use std::fmt;

use iet_targets::{Platform, PlatformClass};
use tracing::{debug, warn};

use crate::error::{LowerError, RegistrationError, Result};
use crate::mode::{ModeKey, REQUIRED_MODES};
use crate::target::{CustomFactory, RewriterFactory};

/// Literal mode key of the custom-sequence factory.
pub const CUSTOM: &str = "custom";

/// Mode → factory mapping for one platform class.
#[derive(Clone, Default)]
pub struct ModeMap {
    standard: HashMap<ModeKey, RewriterFactory>,
    custom: Option<CustomFactory>,
}

impl ModeMap {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: file `factory` under `key`, replacing any earlier factory.
    pub fn with(mut self, key: impl Into<ModeKey>, factory: RewriterFactory) -> Self {
        self.standard.insert(key.into(), factory);
        self
    }

    /// Builder: set the factory used for explicit pass sequences.
    pub fn with_custom(mut self, factory: CustomFactory) -> Self {
        self.custom = Some(factory);
        self
    }

    /// Factory filed under `key`.
    pub fn get(&self, key: &ModeKey) -> Option<&RewriterFactory> {
        self.standard.get(key)
    }

    /// Factory for explicit pass sequences, if any.
    pub fn custom(&self) -> Option<&CustomFactory> {
        self.custom.as_ref()
    }

    /// Whether a factory is filed under `key`.
    pub fn contains(&self, key: &ModeKey) -> bool {
        self.standard.contains_key(key)
    }

    /// Registered keys in a stable order (named first, then parallel sets).
    pub fn keys(&self) -> Vec<String> {
        let mut named: Vec<_> = self
            .standard
            .keys()
            .filter_map(|k| match k {
                ModeKey::Named(n) => Some(n.clone()),
                ModeKey::Parallel(_) => None,
            })
            .collect();
        named.sort();
        let mut parallel: Vec<_> = self
            .standard
            .keys()
            .filter_map(|k| match k {
                ModeKey::Parallel(p) => Some(*p),
                ModeKey::Named(_) => None,
            })
            .collect();
        parallel.sort();
        let mut keys = named;
        keys.extend(parallel.into_iter().map(|p| p.to_string()));
        if self.custom.is_some() {
            keys.push(CUSTOM.to_string());
        }
        keys
    }
}

impl fmt::Debug for ModeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeMap").field("modes", &self.keys()).finish()
    }
}

/// A platform class together with its mode mapping.
#[derive(Debug, Clone)]
pub struct TargetEntry {
    pub class: PlatformClass,
    pub modes: ModeMap,
}

/// Collects registrations during backend initialization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<TargetEntry>,
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `modes` for `class`.
    ///
    /// The class must be well-formed and the mapping must provide every
    /// mode in [`REQUIRED_MODES`]. Registering a class again replaces its
    /// mapping and keeps its original position.
    pub fn add(
        &mut self,
        class: PlatformClass,
        modes: ModeMap,
    ) -> std::result::Result<&mut Self, RegistrationError> {
        class.validate()?;
        for mode in REQUIRED_MODES {
            if !modes.contains(&ModeKey::from(mode)) {
                return Err(RegistrationError::MissingMode {
                    class: class.tag().to_string(),
                    mode,
                });
            }
        }
        debug!(class = %class, modes = ?modes.keys(), "registered rewriters");
        match self.entries.iter_mut().find(|e| e.class.tag() == class.tag()) {
            Some(entry) => {
                warn!(class = class.tag(), "platform class registered again; replacing its rewriters");
                entry.modes = modes;
            }
            None => self.entries.push(TargetEntry { class, modes }),
        }
        Ok(self)
    }

    /// Finish initialization.
    pub fn seal(self) -> TargetRegistry {
        TargetRegistry {
            entries: self.entries,
        }
    }
}

/// Read-only registry queried by lowering calls.
#[derive(Debug)]
pub struct TargetRegistry {
    entries: Vec<TargetEntry>,
}

impl TargetRegistry {
    /// Number of registered platform classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no backend registered anything.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registration governing `platform`: the most specific registered
    /// class on its ancestor chain.
    pub fn entry_for(&self, platform: &Platform) -> Option<&TargetEntry> {
        platform.class.lineage().iter().find_map(|ancestor| {
            self.entries
                .iter()
                .find(|entry| entry.class.tag() == ancestor)
        })
    }

    /// Fetch the factory for `key` on `platform`.
    ///
    /// Only the governing registration is consulted: a mode missing there is
    /// not looked up on less specific classes.
    pub fn fetch(&self, platform: &Platform, key: &ModeKey) -> Result<&RewriterFactory> {
        self.entry_for(platform)
            .and_then(|entry| entry.modes.get(key))
            .ok_or_else(|| not_found(key.to_string(), platform))
    }

    /// Fetch the custom-sequence factory for `platform`.
    pub fn fetch_custom(&self, platform: &Platform) -> Result<&CustomFactory> {
        self.entry_for(platform)
            .and_then(|entry| entry.modes.custom())
            .ok_or_else(|| not_found(CUSTOM.to_string(), platform))
    }
}

fn not_found(mode: String, platform: &Platform) -> LowerError {
    LowerError::TargetNotFound {
        mode,
        platform: platform.name.clone(),
    }
}
