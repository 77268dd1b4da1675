//! Iteration/Expression Tree (IET) model.
//!
//! The IET is the structured-loop representation handed to the lowering layer.
//! Passes only ever annotate or restructure it; this crate defines the node
//! model, traversal helpers, content hashing, and JSON I/O.

pub mod error;
pub mod hash;
pub mod io;
pub mod node;
pub mod visit;

pub use error::{IetError, Result};
pub use hash::{content_hash, hash_hex, ContentHash};
pub use io::{iet_to_json, load_iet_json, parse_iet_json};
pub use node::{Node, NodeKind, Property};
