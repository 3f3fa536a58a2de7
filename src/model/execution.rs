use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::model::WorkflowId;

pub type ExecutionId = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    Pending,
    Active,
    InProgress,
    Paused,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A server-tracked run of a workflow. Read-only on the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowExecution {
    pub id: ExecutionId,
    pub workflow: WorkflowId,
    #[serde(default)]
    pub contact: Option<i64>,
    #[serde(default)]
    pub current_step_index: u32,
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Body of `POST /core/automation-executions/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TestRunRequest {
    pub workflow: WorkflowId,
    pub contact: Option<i64>,
    pub context_data: Value,
}

impl TestRunRequest {
    pub fn new(workflow: WorkflowId) -> Self {
        Self {
            workflow,
            contact: None,
            context_data: json!({"test_run": true}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request_body() {
        let body = serde_json::to_value(TestRunRequest::new(3)).unwrap();
        assert_eq!(body, json!({"workflow": 3, "contact": null, "context_data": {"test_run": true}}));
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let exec: WorkflowExecution = serde_json::from_value(json!({
            "id": 1,
            "workflow": 3,
            "contact": null,
            "current_step_index": 2,
            "status": "cancelled",
            "started_at": "2024-05-01T10:00:00Z",
            "completed_at": null
        }))
        .unwrap();
        assert_eq!(exec.status, ExecutionStatus::Unknown);
        assert_eq!(exec.current_step_index, 2);
    }
}
