//! JSON loading and saving of IETs.

use std::path::Path;

use crate::error::{IetError, Result};
use crate::node::Node;

/// Load an IET from a JSON file.
pub fn load_iet_json(path: &Path) -> Result<Node> {
    if !path.exists() {
        return Err(IetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_iet_json(&content)
}

/// Parse an IET from a JSON string.
pub fn parse_iet_json(json: &str) -> Result<Node> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize an IET to pretty JSON.
pub fn iet_to_json(node: &Node) -> Result<String> {
    Ok(serde_json::to_string_pretty(node)?)
}
