//! Reference backends.

pub mod cpu;
pub mod passes;

pub use cpu::{cpu_pass_library, register_cpu_backend};

use crate::error::RegistrationError;
use crate::registry::{RegistryBuilder, TargetRegistry};

/// A sealed registry holding every built-in backend.
pub fn default_registry() -> Result<TargetRegistry, RegistrationError> {
    let mut builder = RegistryBuilder::new();
    register_cpu_backend(&mut builder)?;
    Ok(builder.seal())
}
