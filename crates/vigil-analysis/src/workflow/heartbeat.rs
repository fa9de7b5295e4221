//! Progress reporter that forwards heartbeats over a channel.

use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use vigil_core::traits::{ProgressReporter, WorkflowStore};
use vigil_core::types::WorkflowRecord;

/// Sends each heartbeat detail to the watchdog. A closed channel is ignored:
/// the watchdog has already given up on the step.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: Sender<String>,
}

impl ChannelProgress {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl ProgressReporter for ChannelProgress {
    fn heartbeat(&self, detail: &str) {
        let _ = self.tx.send(detail.to_string());
    }
}

/// Heartbeat sink for [`super::watchdog::run_guarded`] that refreshes the
/// record's `heartbeat_at` and persists it, at most once per `every`.
pub(crate) fn persist_heartbeats<'r>(
    workflows: &'r dyn WorkflowStore,
    record: &'r mut WorkflowRecord,
    every: Duration,
) -> impl FnMut(&str) + 'r {
    let mut last = Instant::now();
    move |detail| {
        if last.elapsed() < every {
            return;
        }
        last = Instant::now();
        record.touch();
        if let Err(e) = workflows.save_workflow(record) {
            tracing::warn!(workflow_id = %record.id, detail, error = %e, "heartbeat not persisted");
        }
    }
}
