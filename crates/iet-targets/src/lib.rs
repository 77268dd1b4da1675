//! Target platform model for IET lowering.
//!
//! A platform is a concrete piece of hardware (e.g. `skx`) tagged with a
//! [`PlatformClass`]. Classes form a single-inheritance specialization
//! hierarchy rooted at `platform`; each class carries its full ancestor
//! chain, computed once when the class is defined, so dispatch never needs
//! to discover the hierarchy at lookup time.

pub mod catalog;
pub mod class;
pub mod error;
pub mod parse;
pub mod platform;

pub use catalog::{builtin_platforms, resolve_platform};
pub use class::{classes, PlatformClass, ROOT_TAG};
pub use error::{Result, TargetError};
pub use parse::{
    discover_platforms, load_platform_toml, parse_platform_toml, platform_to_toml,
    validate_platform, ValidationIssue,
};
pub use platform::{Isa, Platform};
