//! Workflow edge definitions for connecting nodes.
//!
//! Edges define the flow between nodes, supporting conditional
//! branching through source handles (`true`/`false` out of condition nodes).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::NodeId;

/// Unique identifier for an edge within a workflow.
pub type EdgeId = String;

/// Edge renderer used for every edge the editor creates.
pub const EDGE_TYPE_SMOOTHSTEP: &str = "smoothstep";

fn default_edge_type() -> String {
    EDGE_TYPE_SMOOTHSTEP.to_string()
}

/// Fixed branch handles of condition nodes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FixedHandle {
    /// True branch for conditional nodes.
    True,
    /// False branch for conditional nodes.
    False,
}

/// Source handle identifying which output port of a node an edge originates from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum SourceHandle {
    /// Fixed handle types: true, false.
    Fixed(FixedHandle),
    /// Any other handle id defined by a node renderer.
    Named(String),
}

impl SourceHandle {
    pub fn as_str(&self) -> &str {
        match self {
            SourceHandle::Fixed(h) => h.as_ref(),
            SourceHandle::Named(n) => n.as_str(),
        }
    }
}

impl From<FixedHandle> for SourceHandle {
    fn from(handle: FixedHandle) -> Self {
        SourceHandle::Fixed(handle)
    }
}

/// Directed connection between two nodes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Edge {
    /// Unique edge identifier.
    pub id: EdgeId,
    /// ID of the source node.
    pub source: NodeId,
    /// ID of the target node.
    pub target: NodeId,
    /// Edge renderer type.
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    /// Which output handle this edge connects from.
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<SourceHandle>,
    /// Which input handle this edge connects to.
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Renderer-owned attributes (animated, label, ...) carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type: default_edge_type(),
            source_handle: None,
            target_handle: None,
            extra: Map::new(),
        }
    }

    pub fn with_source_handle(
        mut self,
        handle: impl Into<SourceHandle>,
    ) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    /// Returns true if either endpoint is `node_id`.
    pub fn touches(
        &self,
        node_id: &str,
    ) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A user-drawn connection between two handles, before it becomes an edge.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "sourceHandle", default)]
    pub source_handle: Option<SourceHandle>,
    #[serde(rename = "targetHandle", default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn from_handle(
        mut self,
        handle: impl Into<SourceHandle>,
    ) -> Self {
        self.source_handle = Some(handle.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_branch_handle_parses_as_fixed() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e3-4",
            "source": "3",
            "target": "4",
            "sourceHandle": "true"
        }))
        .unwrap();

        assert_eq!(edge.source_handle, Some(SourceHandle::Fixed(FixedHandle::True)));
        assert_eq!(edge.edge_type, EDGE_TYPE_SMOOTHSTEP);
    }

    #[test]
    fn test_named_handle_and_extra_fields_survive() {
        let raw = json!({
            "id": "e1",
            "source": "a",
            "target": "b",
            "type": "smoothstep",
            "sourceHandle": "case-7",
            "animated": true
        });
        let edge: Edge = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(edge.source_handle, Some(SourceHandle::Named("case-7".to_string())));
        assert_eq!(serde_json::to_value(&edge).unwrap(), raw);
    }

    #[test]
    fn test_null_handle_is_none() {
        let edge: Edge = serde_json::from_value(json!({"id": "e", "source": "a", "target": "b", "sourceHandle": null})).unwrap();
        assert!(edge.source_handle.is_none());
    }
}
