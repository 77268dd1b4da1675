//! CLI command implementations.

pub mod lower;
pub mod passes;
pub mod platform;
