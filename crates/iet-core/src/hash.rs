//! Content-addressed hashing for IET subtrees.
//!
//! The hash covers kinds, properties, and children, so two trees hash
//! equal exactly when they are structurally identical.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::node::Node;

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Compute the SHA-256 content hash of any serializable value.
pub fn content_hash<T: Serialize>(value: &T) -> Result<ContentHash> {
    let json = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hasher.finalize().into())
}

/// Format a content hash as a hex string.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

impl Node {
    /// Content hash of the subtree rooted at this node.
    pub fn structural_hash(&self) -> Result<ContentHash> {
        content_hash(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Property;

    #[test]
    fn identical_trees_hash_equal() {
        let a = Node::iteration("x", vec![Node::expression("u = 0")]);
        let b = a.clone();
        assert_eq!(a.structural_hash().unwrap(), b.structural_hash().unwrap());
    }

    #[test]
    fn annotation_changes_hash() {
        let a = Node::iteration("x", vec![]);
        let b = a.clone().with_property(Property::Parallel);
        assert_ne!(a.structural_hash().unwrap(), b.structural_hash().unwrap());
    }

    #[test]
    fn hash_hex_format() {
        let h = content_hash(&42u32).unwrap();
        assert_eq!(hash_hex(&h).len(), 64);
    }
}
