use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use crate::{
    FlowError, Result, ShareLock,
    client::WorkflowApi,
    model::{ExecutionStatus, NewWorkflow, StepsConfig, TestRunRequest, Workflow, WorkflowExecution, WorkflowId, WorkflowStatus},
};

/// In-memory workflow backend with the same conflict semantics as the REST API.
#[derive(Clone)]
pub struct MemWorkflowApi {
    workflows: ShareLock<BTreeMap<WorkflowId, Workflow>>,
    executions: ShareLock<Vec<WorkflowExecution>>,
    next_id: Arc<AtomicI64>,
    offline: Arc<AtomicBool>,
    latency: ShareLock<Option<Duration>>,
}

impl Default for MemWorkflowApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MemWorkflowApi {
    pub fn new() -> Self {
        Self {
            workflows: ShareLock::default(),
            executions: ShareLock::default(),
            next_id: Arc::new(AtomicI64::new(1)),
            offline: Arc::new(AtomicBool::new(false)),
            latency: ShareLock::default(),
        }
    }

    /// Insert or replace a workflow as-is.
    pub fn insert(
        &self,
        workflow: Workflow,
    ) {
        self.next_id.fetch_max(workflow.id + 1, Ordering::SeqCst);
        self.workflows.write().unwrap().insert(workflow.id, workflow);
    }

    pub fn get(
        &self,
        id: WorkflowId,
    ) -> Option<Workflow> {
        self.workflows.read().unwrap().get(&id).cloned()
    }

    /// Simulate a write from another session.
    pub fn touch(
        &self,
        id: WorkflowId,
    ) {
        if let Some(workflow) = self.workflows.write().unwrap().get_mut(&id) {
            workflow.updated_at = Some(next_version(workflow.updated_at));
        }
    }

    /// Make every call fail with a transport error.
    pub fn set_offline(
        &self,
        offline: bool,
    ) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(
        &self,
        latency: Option<Duration>,
    ) {
        *self.latency.write().unwrap() = latency;
    }

    pub fn push_execution(
        &self,
        execution: WorkflowExecution,
    ) {
        self.executions.write().unwrap().push(execution);
    }

    async fn call(
        &self,
        op: &str,
    ) -> Result<()> {
        trace!("mem::{}", op);
        let latency = *self.latency.read().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(FlowError::Transport(format!("{}: backend unreachable", op)));
        }
        Ok(())
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// Strictly increasing modification time.
fn next_version(prev: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match prev {
        Some(prev) if prev >= now => prev + TimeDelta::milliseconds(1),
        _ => now,
    }
}

#[async_trait]
impl WorkflowApi for MemWorkflowApi {
    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        self.call("list_workflows").await?;
        Ok(self.workflows.read().unwrap().values().cloned().collect())
    }

    async fn create_workflow(
        &self,
        workflow: &NewWorkflow,
    ) -> Result<Workflow> {
        self.call("create_workflow").await?;
        let now = Utc::now();
        let created = Workflow {
            id: self.allocate_id(),
            name: workflow.name.clone(),
            is_active: workflow.is_active,
            status: WorkflowStatus::Active,
            created_at: Some(now),
            updated_at: Some(now),
            trigger_config: workflow.trigger_config.clone(),
            steps_config: serde_json::to_value(&workflow.steps_config)?,
        };
        self.workflows.write().unwrap().insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_steps(
        &self,
        id: WorkflowId,
        steps: &StepsConfig,
        version: Option<DateTime<Utc>>,
    ) -> Result<Workflow> {
        self.call("update_steps").await?;
        let mut workflows = self.workflows.write().unwrap();
        let workflow = workflows.get_mut(&id).ok_or(FlowError::Http {
            status: 404,
            body: format!("workflow {} not found", id),
        })?;

        if version.is_some() && version != workflow.updated_at {
            return Err(FlowError::Conflict {
                id,
            });
        }
        workflow.steps_config = serde_json::to_value(steps)?;
        workflow.updated_at = Some(next_version(workflow.updated_at));
        Ok(workflow.clone())
    }

    async fn trigger_test_run(
        &self,
        request: &TestRunRequest,
    ) -> Result<WorkflowExecution> {
        self.call("trigger_test_run").await?;
        if self.get(request.workflow).is_none() {
            return Err(FlowError::Http {
                status: 400,
                body: format!("workflow {} not found", request.workflow),
            });
        }
        let mut executions = self.executions.write().unwrap();
        let execution = WorkflowExecution {
            id: executions.len() as i64 + 1,
            workflow: request.workflow,
            contact: request.contact,
            current_step_index: 0,
            status: ExecutionStatus::Pending,
            started_at: Some(Utc::now()),
            completed_at: None,
        };
        executions.push(execution.clone());
        Ok(execution)
    }

    async fn list_executions(&self) -> Result<Vec<WorkflowExecution>> {
        self.call("list_executions").await?;
        Ok(self.executions.read().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_update() {
        let api = MemWorkflowApi::new();
        let created = api.create_workflow(&NewWorkflow::new("Draft", StepsConfig::default())).await.unwrap();
        assert_eq!(created.id, 1);

        let updated = api.update_steps(created.id, &StepsConfig::default(), created.updated_at).await.unwrap();
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let api = MemWorkflowApi::new();
        let created = api.create_workflow(&NewWorkflow::new("Draft", StepsConfig::default())).await.unwrap();
        api.touch(created.id);

        let err = api.update_steps(created.id, &StepsConfig::default(), created.updated_at).await.unwrap_err();
        assert_eq!(err, FlowError::Conflict {
            id: created.id
        });
        // unversioned writes always win
        assert!(api.update_steps(created.id, &StepsConfig::default(), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_offline() {
        let api = MemWorkflowApi::new();
        api.set_offline(true);
        assert!(matches!(api.list_workflows().await, Err(FlowError::Transport(_))));
    }

    #[tokio::test]
    async fn test_test_run_records_execution() {
        let api = MemWorkflowApi::new();
        let created = api.create_workflow(&NewWorkflow::new("Draft", StepsConfig::default())).await.unwrap();
        let exec = api.trigger_test_run(&TestRunRequest::new(created.id)).await.unwrap();
        assert_eq!(exec.workflow, created.id);
        assert_eq!(api.list_executions().await.unwrap(), vec![exec]);
    }
}
