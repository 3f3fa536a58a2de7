//! Workflow node definitions.
//!
//! Nodes are the steps of a workflow graph: triggers, actions, conditions and AI actions.
//! Their `data` payload is free-form; only the label and the category config key are
//! interpreted on the client.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::Vars;

/// Unique identifier for a node within a workflow graph.
pub type NodeId = String;

/// Node types that have a registered renderer in the editor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString, strum::EnumIter)]
pub enum NodeKind {
    #[serde(rename = "trigger")]
    #[strum(serialize = "trigger")]
    Trigger,
    #[serde(rename = "action")]
    #[strum(serialize = "action")]
    Action,
    #[serde(rename = "condition")]
    #[strum(serialize = "condition")]
    Condition,
    #[serde(rename = "ai_action")]
    #[strum(serialize = "ai_action")]
    AiAction,
    #[serde(rename = "aiGenerateContent")]
    #[strum(serialize = "aiGenerateContent")]
    AiGenerateContent,
    #[serde(rename = "aiScoreLead")]
    #[strum(serialize = "aiScoreLead")]
    AiScoreLead,
}

impl NodeKind {
    /// Name of the `data` key that carries the node's sub-type.
    pub fn config_key(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "triggerType",
            NodeKind::Action => "actionType",
            NodeKind::Condition => "conditionType",
            NodeKind::AiAction | NodeKind::AiGenerateContent | NodeKind::AiScoreLead => "aiType",
        }
    }
}

/// Node type as stored in a graph document.
///
/// Types outside the registered set are kept verbatim so that a load/save cycle
/// never rewrites nodes the editor cannot render.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum NodeType {
    Registered(NodeKind),
    Unregistered(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Registered(kind) => kind.as_ref(),
            NodeType::Unregistered(name) => name.as_str(),
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            NodeType::Registered(kind) => Some(*kind),
            NodeType::Unregistered(_) => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.kind().is_some()
    }

    /// Parse a type name, falling back to [`NodeType::Unregistered`].
    pub fn parse(name: &str) -> Self {
        name.parse::<NodeKind>().map(NodeType::Registered).unwrap_or_else(|_| NodeType::Unregistered(name.to_string()))
    }
}

impl From<NodeKind> for NodeType {
    fn from(kind: NodeKind) -> Self {
        NodeType::Registered(kind)
    }
}

impl fmt::Display for NodeType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinates of a node's top-left corner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            x,
            y,
        }
    }
}

/// A single step of a workflow graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    /// node id, unique within the graph
    pub id: NodeId,
    /// node type
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// position on the canvas
    pub position: Position,
    /// type-specific attributes
    #[serde(default)]
    pub data: Vars,
    /// renderer-owned attributes (width, selected, ...) carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        node_type: impl Into<NodeType>,
        position: Position,
        data: Vars,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position,
            data,
            extra: Map::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.data.get_str("label")
    }

    /// The sub-type stored under the kind's config key, e.g. `triggerType`.
    pub fn sub_type(&self) -> Option<&str> {
        self.node_type.kind().and_then(|kind| self.data.get_str(kind.config_key()))
    }
}
