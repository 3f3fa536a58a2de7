//! Clients of the backend workflow resources.
//!
//! The editor only talks to the backend through the [`WorkflowApi`] trait:
//! - `HttpWorkflowApi`: REST client for the real backend
//! - `MemWorkflowApi`: in-memory backend for tests and demos

mod http;
mod mem;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    Result,
    model::{NewWorkflow, StepsConfig, TestRunRequest, Workflow, WorkflowExecution, WorkflowId},
};

pub use http::HttpWorkflowApi;
pub use mem::MemWorkflowApi;

/// Operations on `/core/automation-workflows/` and `/core/automation-executions/`.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Lists every workflow visible to the current tenant.
    async fn list_workflows(&self) -> Result<Vec<Workflow>>;

    /// Creates a workflow and returns the server copy.
    async fn create_workflow(
        &self,
        workflow: &NewWorkflow,
    ) -> Result<Workflow>;

    /// Replaces `steps_config` of a workflow.
    ///
    /// `version` is the `updated_at` the graph was loaded from; when present the
    /// server rejects the write with a conflict if the workflow changed since.
    async fn update_steps(
        &self,
        id: WorkflowId,
        steps: &StepsConfig,
        version: Option<DateTime<Utc>>,
    ) -> Result<Workflow>;

    /// Starts a test run of a workflow.
    async fn trigger_test_run(
        &self,
        request: &TestRunRequest,
    ) -> Result<WorkflowExecution>;

    /// Lists workflow executions.
    async fn list_executions(&self) -> Result<Vec<WorkflowExecution>>;
}

/// List endpoints answer either a bare array or a paginated `{results: [...]}` page.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Plain(Vec<T>),
    Paged {
        results: Vec<T>,
    },
}

impl<T> ListResponse<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(rows) => rows,
            ListResponse::Paged {
                results,
            } => results,
        }
    }
}
