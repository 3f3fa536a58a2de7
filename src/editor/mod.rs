//! Workflow editor - the main entry point for Flowcanvas.
//!
//! The editor ties a shared [`Canvas`] to a [`WorkflowApi`] backend:
//! - Selecting a workflow loads its graph (or the demo graph)
//! - Saving pushes the live graph as a full `steps_config` replacement
//! - Failures are logged and surfaced as transient notices; the canvas is never rolled back

mod monitor;

use std::sync::{Arc, RwLock};

use tracing::{error, info, warn};

use crate::{
    FlowError, Result, ShareLock,
    canvas::{Canvas, SaveTicket},
    client::WorkflowApi,
    common::{Notice, NoticeQueue},
    config::EditorConfig,
    dialog::{ConfigDialog, NodeConfig},
    model::{NewWorkflow, TestRunRequest, Workflow, WorkflowExecution},
};

pub use monitor::ExecutionMonitor;

/// An outstanding save. Dropping it without completing returns the canvas to idle.
struct PendingSave<'a> {
    canvas: &'a RwLock<Canvas>,
    ticket: SaveTicket,
    finished: bool,
}

impl PendingSave<'_> {
    fn complete(
        mut self,
        saved: Option<&Workflow>,
    ) {
        self.canvas.write().unwrap().finish_save(&self.ticket, saved);
        self.finished = true;
    }
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.canvas.write().unwrap().finish_save(&self.ticket, None);
        }
    }
}

pub struct WorkflowEditor {
    /// Graph being edited.
    canvas: ShareLock<Canvas>,
    /// Backend workflow resource.
    api: Arc<dyn WorkflowApi>,
    /// User-visible notices.
    notices: Arc<NoticeQueue>,
    /// Currently selected workflow, as last received from the server.
    selected: ShareLock<Option<Workflow>>,
    /// Last fetched workflow list.
    workflows: ShareLock<Vec<Workflow>>,
}

impl WorkflowEditor {
    pub fn new(
        api: Arc<dyn WorkflowApi>,
        config: &EditorConfig,
    ) -> Self {
        Self {
            canvas: ShareLock::default(),
            api,
            notices: NoticeQueue::new(config.notice_capacity),
            selected: ShareLock::default(),
            workflows: ShareLock::default(),
        }
    }

    /// Select a workflow (or none) and load its graph into the canvas.
    pub fn select(
        &self,
        workflow: Option<Workflow>,
    ) {
        self.canvas.write().unwrap().load(workflow.as_ref());
        *self.selected.write().unwrap() = workflow;
    }

    pub fn selected(&self) -> Option<Workflow> {
        self.selected.read().unwrap().clone()
    }

    /// Run `f` with read access to the canvas.
    pub fn with_canvas<R>(
        &self,
        f: impl FnOnce(&Canvas) -> R,
    ) -> R {
        f(&self.canvas.read().unwrap())
    }

    /// Run `f` with write access to the canvas.
    pub fn edit<R>(
        &self,
        f: impl FnOnce(&mut Canvas) -> R,
    ) -> R {
        f(&mut self.canvas.write().unwrap())
    }

    /// Open a configuration dialog for a node on the canvas.
    pub fn open_dialog<T: NodeConfig>(
        &self,
        node_id: &str,
    ) -> Result<ConfigDialog<T>> {
        ConfigDialog::open(&self.canvas.read().unwrap(), node_id)
    }

    /// Merge a dialog's draft into its node.
    pub fn apply_dialog<T: NodeConfig>(
        &self,
        dialog: ConfigDialog<T>,
    ) -> Result<()> {
        dialog.save(&mut self.canvas.write().unwrap())
    }

    /// True when the canvas has edits that were not saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.canvas.read().unwrap().is_dirty()
    }

    pub fn notices(&self) -> Arc<NoticeQueue> {
        self.notices.clone()
    }

    /// Fetch the workflow list.
    pub async fn refresh_workflows(&self) -> Result<Vec<Workflow>> {
        match self.api.list_workflows().await {
            Ok(rows) => {
                *self.workflows.write().unwrap() = rows.clone();
                Ok(rows)
            }
            Err(e) => {
                error!("failed to fetch workflows: {}", e);
                self.notices.post(Notice::error("Failed to load workflows"));
                Err(e)
            }
        }
    }

    pub fn workflows(&self) -> Vec<Workflow> {
        self.workflows.read().unwrap().clone()
    }

    /// Save the live canvas graph to the selected workflow.
    ///
    /// Rejected before any network call when no workflow is selected or a save is outstanding.
    pub async fn save(&self) -> Result<Workflow> {
        let begun = self.canvas.write().unwrap().begin_save();
        let ticket = match begun {
            Ok(ticket) => ticket,
            Err(FlowError::NoWorkflowSelected) => {
                warn!("save rejected: no workflow selected");
                self.notices.post(Notice::warning("Please select a workflow first"));
                return Err(FlowError::NoWorkflowSelected);
            }
            Err(e) => return Err(e),
        };
        let pending = PendingSave {
            canvas: self.canvas.as_ref(),
            ticket,
            finished: false,
        };

        let ticket = &pending.ticket;
        info!("saving workflow {} ({} nodes, {} edges)", ticket.workflow_id, ticket.steps.nodes.len(), ticket.steps.edges.len());
        let result = self.api.update_steps(ticket.workflow_id, &ticket.steps, ticket.version).await;

        match result {
            Ok(saved) => {
                pending.complete(Some(&saved));
                self.remember(&saved);
                self.notices.post(Notice::success("Workflow saved"));
                Ok(saved)
            }
            Err(e) => {
                pending.complete(None);
                error!("failed to save workflow: {}", e);
                let message = match &e {
                    FlowError::Conflict {
                        ..
                    } => "Workflow was changed in another session; reload before saving".to_string(),
                    other => format!("Failed to save workflow: {}", other),
                };
                self.notices.post(Notice::error(message));
                Err(e)
            }
        }
    }

    /// Create a workflow from the current canvas graph and select it.
    pub async fn create_workflow(
        &self,
        name: &str,
    ) -> Result<Workflow> {
        let steps = self.canvas.read().unwrap().steps();
        match self.api.create_workflow(&NewWorkflow::new(name, steps)).await {
            Ok(created) => {
                info!("created workflow {} ({})", created.id, created.name);
                self.workflows.write().unwrap().push(created.clone());
                self.select(Some(created.clone()));
                self.notices.post(Notice::success("Workflow created"));
                Ok(created)
            }
            Err(e) => {
                error!("failed to create workflow: {}", e);
                self.notices.post(Notice::error(format!("Failed to create workflow: {}", e)));
                Err(e)
            }
        }
    }

    /// Trigger a test run of the selected workflow.
    pub async fn run_test(&self) -> Result<WorkflowExecution> {
        let selected = self.canvas.read().unwrap().workflow_id();
        let Some(id) = selected else {
            warn!("test run rejected: no workflow selected");
            self.notices.post(Notice::warning("Please select a workflow first"));
            return Err(FlowError::NoWorkflowSelected);
        };
        match self.api.trigger_test_run(&TestRunRequest::new(id)).await {
            Ok(execution) => {
                info!("test run {} started for workflow {}", execution.id, id);
                self.notices.post(Notice::success("Test run started"));
                Ok(execution)
            }
            Err(e) => {
                error!("failed to start test run: {}", e);
                self.notices.post(Notice::error(format!("Failed to start test run: {}", e)));
                Err(e)
            }
        }
    }

    /// Keep cached copies in step with the server after a save.
    fn remember(
        &self,
        saved: &Workflow,
    ) {
        let mut selected = self.selected.write().unwrap();
        if selected.as_ref().is_some_and(|w| w.id == saved.id) {
            *selected = Some(saved.clone());
        }
        drop(selected);

        let mut workflows = self.workflows.write().unwrap();
        if let Some(row) = workflows.iter_mut().find(|w| w.id == saved.id) {
            *row = saved.clone();
        }
    }
}
