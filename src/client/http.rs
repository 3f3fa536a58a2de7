use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, IF_UNMODIFIED_SINCE, InvalidHeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, trace};

use crate::{
    FlowError, Result,
    client::{ListResponse, WorkflowApi},
    config::ApiConfig,
    model::{NewWorkflow, StepsConfig, TestRunRequest, Workflow, WorkflowExecution, WorkflowId},
};

const WORKFLOWS_PATH: &str = "/core/automation-workflows/";
const EXECUTIONS_PATH: &str = "/core/automation-executions/";

/// REST client for the workflow backend.
#[derive(Debug, Clone)]
pub struct HttpWorkflowApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWorkflowApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                format!("Bearer {}", token).parse().map_err(|err: InvalidHeaderValue| FlowError::Config(err.to_string()))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| FlowError::Config(format!("failed to build http client: {}", err)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(
        &self,
        path: &str,
    ) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn workflow_url(
        &self,
        id: WorkflowId,
    ) -> String {
        format!("{}{}{}/", self.base_url, WORKFLOWS_PATH, id)
    }

    /// Send a request and decode the JSON body. `conflict_id` turns 409/412 into [`FlowError::Conflict`].
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        conflict_id: Option<WorkflowId>,
    ) -> Result<T> {
        let res = request.send().await?;
        let status = res.status();
        trace!("http response {}", status);

        if let Some(id) = conflict_id {
            if status == StatusCode::CONFLICT || status == StatusCode::PRECONDITION_FAILED {
                return Err(FlowError::Conflict {
                    id,
                });
            }
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FlowError::Http {
                status: status.as_u16(),
                body,
            });
        }

        res.json::<T>().await.map_err(|err| FlowError::Convert(err.to_string()))
    }
}

/// RFC 7231 HTTP-date.
pub(crate) fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[async_trait]
impl WorkflowApi for HttpWorkflowApi {
    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        debug!("GET {}", WORKFLOWS_PATH);
        let rows: ListResponse<Workflow> = self.send(self.client.get(self.url(WORKFLOWS_PATH)), None).await?;
        Ok(rows.into_vec())
    }

    async fn create_workflow(
        &self,
        workflow: &NewWorkflow,
    ) -> Result<Workflow> {
        debug!("POST {} ({})", WORKFLOWS_PATH, workflow.name);
        self.send(self.client.post(self.url(WORKFLOWS_PATH)).json(workflow), None).await
    }

    async fn update_steps(
        &self,
        id: WorkflowId,
        steps: &StepsConfig,
        version: Option<DateTime<Utc>>,
    ) -> Result<Workflow> {
        debug!("PATCH {}{}/ ({} nodes, {} edges)", WORKFLOWS_PATH, id, steps.nodes.len(), steps.edges.len());
        let mut request = self.client.patch(self.workflow_url(id)).json(&json!({ "steps_config": steps }));
        if let Some(version) = version {
            request = request.header(IF_UNMODIFIED_SINCE, http_date(version));
        }
        self.send(request, Some(id)).await
    }

    async fn trigger_test_run(
        &self,
        request: &TestRunRequest,
    ) -> Result<WorkflowExecution> {
        debug!("POST {} (workflow {})", EXECUTIONS_PATH, request.workflow);
        self.send(self.client.post(self.url(EXECUTIONS_PATH)).json(request), None).await
    }

    async fn list_executions(&self) -> Result<Vec<WorkflowExecution>> {
        trace!("GET {}", EXECUTIONS_PATH);
        let rows: ListResponse<WorkflowExecution> = self.send(self.client.get(self.url(EXECUTIONS_PATH)), None).await?;
        Ok(rows.into_vec())
    }
}
