use std::{sync::Arc, time::Duration};

use tokio::{task::JoinSet, time::MissedTickBehavior};
use tracing::{trace, warn};

use crate::{
    ShareLock,
    client::WorkflowApi,
    model::{WorkflowExecution, WorkflowId},
};

#[derive(Debug, Default)]
struct PollState {
    /// sequence number of the request whose rows are shown
    applied: u64,
    rows: Vec<WorkflowExecution>,
}

impl PollState {
    /// Apply a response unless a later request already landed.
    fn apply(
        &mut self,
        seq: u64,
        rows: Vec<WorkflowExecution>,
    ) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        self.rows = rows;
        true
    }
}

/// Periodically refreshes the execution list.
///
/// Ticks do not wait for each other; a response is only applied if it belongs to a
/// later request than the rows currently shown. Stopping (or dropping) the monitor
/// aborts the timer and every in-flight request.
pub struct ExecutionMonitor {
    state: ShareLock<PollState>,
    task: tokio::task::JoinHandle<()>,
}

impl ExecutionMonitor {
    /// Start polling. Must be called from within a tokio runtime.
    pub fn start(
        api: Arc<dyn WorkflowApi>,
        interval: Duration,
    ) -> Self {
        let state: ShareLock<PollState> = ShareLock::default();

        let poll_state = state.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight = JoinSet::new();
            let mut seq = 0u64;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        seq += 1;
                        let api = api.clone();
                        let state = poll_state.clone();
                        let tick = seq;
                        in_flight.spawn(async move {
                            match api.list_executions().await {
                                Ok(rows) => {
                                    let applied = state.write().unwrap().apply(tick, rows);
                                    trace!("executions tick {} applied: {}", tick, applied);
                                }
                                Err(e) => warn!("failed to refresh executions (tick {}): {}", tick, e),
                            }
                        });
                    }
                    Some(_) = in_flight.join_next() => {}
                }
            }
        });

        Self {
            state,
            task,
        }
    }

    pub fn start_with_ms(
        api: Arc<dyn WorkflowApi>,
        interval_ms: u64,
    ) -> Self {
        Self::start(api, Duration::from_millis(interval_ms))
    }

    /// Rows from the latest applied response.
    pub fn executions(&self) -> Vec<WorkflowExecution> {
        self.state.read().unwrap().rows.clone()
    }

    pub fn executions_for(
        &self,
        workflow: WorkflowId,
    ) -> Vec<WorkflowExecution> {
        self.state.read().unwrap().rows.iter().filter(|e| e.workflow == workflow).cloned().collect()
    }

    /// Stop polling and abort in-flight requests.
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ExecutionMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::MemWorkflowApi,
        model::{ExecutionStatus, NewWorkflow, StepsConfig, TestRunRequest},
    };

    fn execution(id: i64) -> WorkflowExecution {
        WorkflowExecution {
            id,
            workflow: 1,
            contact: None,
            current_step_index: 0,
            status: ExecutionStatus::InProgress,
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut state = PollState::default();
        assert!(state.apply(2, vec![execution(2)]));
        assert!(!state.apply(1, vec![execution(1)]));
        assert_eq!(state.rows, vec![execution(2)]);
        assert!(state.apply(3, vec![]));
        assert!(state.rows.is_empty());
    }

    #[tokio::test]
    async fn test_monitor_picks_up_new_executions() {
        let api = Arc::new(MemWorkflowApi::new());
        let workflow = api.create_workflow(&NewWorkflow::new("Poll me", StepsConfig::default())).await.unwrap();

        let monitor = ExecutionMonitor::start(api.clone(), Duration::from_millis(10));
        api.trigger_test_run(&TestRunRequest::new(workflow.id)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(monitor.executions_for(workflow.id).len(), 1);
        assert!(monitor.executions_for(workflow.id + 1).is_empty());

        monitor.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!monitor.is_running());
    }
}
