// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of hex characters following the prefix in a generated id.
pub const NODE_ID_HEX_LEN: usize = 8;

/// Which family a generated node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePrefix {
    /// Script nodes created from source code.
    Script,
    /// Plugin/library components, including parameter nodes.
    Component,
}

impl NodePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodePrefix::Script => "py",
            NodePrefix::Component => "comp",
        }
    }
}

/// Opaque node identifier of the form `{prefix}_{8 hex chars}`.
///
/// Ids are minted client-side before the backend call so the caller can refer
/// to the node immediately, but only become meaningful for later graph
/// operations once the backend has confirmed creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn generate(prefix: NodePrefix) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", prefix.as_str(), &hex[..NODE_ID_HEX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_have_prefix_and_hex_suffix() {
        for (prefix, expected) in [(NodePrefix::Script, "py_"), (NodePrefix::Component, "comp_")] {
            let id = NodeId::generate(prefix);
            let suffix = id.as_str().strip_prefix(expected).unwrap();

            assert_eq!(suffix.len(), NODE_ID_HEX_LEN);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()), "{}", id);
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<NodeId> = (0..256)
            .map(|_| NodeId::generate(NodePrefix::Component))
            .collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn test_node_id_serializes_as_plain_string() {
        let id = NodeId::from("comp_deadbeef");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"comp_deadbeef\"");
    }
}
