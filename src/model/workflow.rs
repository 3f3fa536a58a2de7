use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Edge, Node};

/// Server-assigned workflow identifier.
pub type WorkflowId = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Failed,
    InProgress,
}

/// The serialised canvas stored in `steps_config`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StepsConfig {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl StepsConfig {
    pub fn new(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            nodes,
            edges,
        }
    }
}

/// Result of reading a workflow's `steps_config`.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphLoad {
    /// `steps_config` is null, missing or `{}`.
    Absent,
    /// `steps_config` is present but not a `{nodes, edges}` document.
    Malformed(String),
    /// A well-formed graph, possibly with no nodes.
    Graph(StepsConfig),
}

/// Workflow resource as returned by `/core/automation-workflows/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// last modification time, used as the optimistic concurrency token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trigger_config: Value,
    #[serde(default)]
    pub steps_config: Value,
}

impl Workflow {
    /// Classify and parse `steps_config`.
    pub fn graph(&self) -> GraphLoad {
        let obj = match &self.steps_config {
            Value::Null => return GraphLoad::Absent,
            Value::Object(obj) if obj.is_empty() => return GraphLoad::Absent,
            Value::Object(obj) => obj,
            other => return GraphLoad::Malformed(format!("steps_config is not an object: {}", type_name(other))),
        };

        for key in ["nodes", "edges"] {
            match obj.get(key) {
                None | Some(Value::Null) => return GraphLoad::Malformed(format!("steps_config is missing '{}'", key)),
                Some(Value::Array(_)) => {}
                Some(other) => return GraphLoad::Malformed(format!("steps_config.{} is not an array: {}", key, type_name(other))),
            }
        }

        match serde_json::from_value::<StepsConfig>(self.steps_config.clone()) {
            Ok(steps) => GraphLoad::Graph(steps),
            Err(e) => GraphLoad::Malformed(format!("invalid steps_config: {}", e)),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Body of `POST /core/automation-workflows/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewWorkflow {
    pub name: String,
    pub is_active: bool,
    pub trigger_config: Value,
    pub steps_config: StepsConfig,
}

impl NewWorkflow {
    pub fn new(
        name: impl Into<String>,
        steps_config: StepsConfig,
    ) -> Self {
        Self {
            name: name.into(),
            is_active: false,
            trigger_config: Value::Object(Default::default()),
            steps_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn workflow(steps_config: Value) -> Workflow {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Lead nurture",
            "is_active": true,
            "status": "in_progress",
            "created_at": "2024-05-01T10:00:00Z",
            "trigger_config": {},
            "steps_config": steps_config
        }))
        .unwrap()
    }

    #[test]
    fn test_absent_graph() {
        assert_eq!(workflow(Value::Null).graph(), GraphLoad::Absent);
        assert_eq!(workflow(json!({})).graph(), GraphLoad::Absent);
    }

    #[test]
    fn test_missing_key_is_malformed() {
        assert!(matches!(workflow(json!({"nodes": []})).graph(), GraphLoad::Malformed(_)));
        assert!(matches!(workflow(json!({"edges": []})).graph(), GraphLoad::Malformed(_)));
        assert!(matches!(workflow(json!("nodes")).graph(), GraphLoad::Malformed(_)));
    }

    #[test]
    fn test_bad_entry_is_malformed() {
        let steps = json!({"nodes": [{"id": "1"}], "edges": []});
        assert!(matches!(workflow(steps).graph(), GraphLoad::Malformed(_)));
    }

    #[test]
    fn test_empty_graph_is_a_graph() {
        assert_eq!(workflow(json!({"nodes": [], "edges": []})).graph(), GraphLoad::Graph(StepsConfig::default()));
    }

    #[test]
    fn test_status_and_missing_updated_at() {
        let wf = workflow(Value::Null);
        assert_eq!(wf.status, WorkflowStatus::InProgress);
        assert!(wf.updated_at.is_none());
    }

    #[test]
    fn test_new_workflow_body() {
        let body = serde_json::to_value(NewWorkflow::new("Draft", StepsConfig::default())).unwrap();
        assert_eq!(body, json!({"name": "Draft", "is_active": false, "trigger_config": {}, "steps_config": {"nodes": [], "edges": []}}));
    }
}
