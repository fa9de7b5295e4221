//! Crash recovery and stale-run sweeping.
//!
//! After a restart every non-terminal workflow is resumed from its last
//! persisted state. While running, `sweep` picks up runs whose worker went
//! quiet for longer than the heartbeat timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use vigil_core::config::WorkflowConfig;
use vigil_core::errors::{StoreError, VigilErrorCode};
use vigil_core::events::{EventDispatcher, WorkflowRecoveredEvent};
use vigil_core::traits::{CancellationToken, WorkflowStore};
use vigil_core::types::{WorkflowKind, WorkflowRecord};

use super::review::ReviewOrchestrator;
use super::simulation::SimulationOrchestrator;

pub struct Supervisor {
    workflows: Arc<dyn WorkflowStore>,
    review: Option<Arc<ReviewOrchestrator>>,
    simulation: Option<Arc<SimulationOrchestrator>>,
    heartbeat_timeout: Duration,
    events: EventDispatcher,
}

impl Supervisor {
    pub fn new(workflows: Arc<dyn WorkflowStore>, config: &WorkflowConfig) -> Self {
        Self {
            workflows,
            review: None,
            simulation: None,
            heartbeat_timeout: config.heartbeat_timeout(),
            events: EventDispatcher::default(),
        }
    }

    pub fn with_review(mut self, orchestrator: Arc<ReviewOrchestrator>) -> Self {
        self.review = Some(orchestrator);
        self
    }

    pub fn with_simulation(mut self, orchestrator: Arc<SimulationOrchestrator>) -> Self {
        self.simulation = Some(orchestrator);
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Resume every incomplete workflow. Returns the records after resumption.
    pub fn recover(&self, cancel: &CancellationToken) -> Result<Vec<WorkflowRecord>, StoreError> {
        let pending = self.workflows.list_incomplete_workflows()?;
        tracing::info!(count = pending.len(), "recovering incomplete workflows");
        Ok(self.resume_all(pending, cancel))
    }

    /// Resume runs whose last heartbeat is older than the heartbeat timeout.
    pub fn sweep(&self, now: DateTime<Utc>, cancel: &CancellationToken) -> Result<Vec<WorkflowRecord>, StoreError> {
        let stale: Vec<WorkflowRecord> = self
            .workflows
            .list_incomplete_workflows()?
            .into_iter()
            .filter(|r| self.is_stale(r, now))
            .collect();
        if !stale.is_empty() {
            tracing::warn!(count = stale.len(), "resuming stalled workflows");
        }
        Ok(self.resume_all(stale, cancel))
    }

    /// A run with no heartbeat at all counts as stale.
    pub fn is_stale(&self, record: &WorkflowRecord, now: DateTime<Utc>) -> bool {
        match record.heartbeat_at {
            Some(at) => now
                .signed_duration_since(at)
                .to_std()
                .map(|idle| idle > self.heartbeat_timeout)
                .unwrap_or(false),
            None => true,
        }
    }

    fn resume_all(&self, records: Vec<WorkflowRecord>, cancel: &CancellationToken) -> Vec<WorkflowRecord> {
        let mut resumed = Vec::with_capacity(records.len());
        for record in records {
            if cancel.ensure_active().is_err() {
                break;
            }
            let id = record.id.clone();
            let state = record.state.clone();
            let outcome = match record.kind {
                WorkflowKind::Review => match &self.review {
                    Some(o) => Some(o.resume(record, cancel)),
                    None => None,
                },
                WorkflowKind::Simulation => match &self.simulation {
                    Some(o) => Some(o.resume(record, cancel)),
                    None => None,
                },
            };

            match outcome {
                Some(Ok(done)) => {
                    tracing::info!(workflow_id = %id, from = %state, to = %done.state, "workflow recovered");
                    self.events.emit_workflow_recovered(&WorkflowRecoveredEvent {
                        workflow_id: id,
                        state,
                    });
                    resumed.push(done);
                }
                Some(Err(e)) => {
                    tracing::error!(workflow_id = %id, error = %e.coded_string(), "workflow recovery failed");
                }
                None => {
                    tracing::warn!(workflow_id = %id, "no orchestrator registered for workflow kind");
                }
            }
        }
        resumed
    }
}
