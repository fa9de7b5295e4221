//! Bounded retry of workflow steps on transient errors.

use std::thread;
use std::time::Duration;

use vigil_core::errors::{VigilErrorCode, WorkflowError};
use vigil_core::events::{EventDispatcher, StepRetriedEvent};
use vigil_core::traits::{CancellationToken, WorkflowStore};
use vigil_core::types::WorkflowRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Multiplied by the attempt number before the next try.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

/// Run `attempt` until it succeeds, fails permanently, or the step's attempt
/// budget is spent.
///
/// Attempts are counted on the record and persisted before each try, so a
/// resumed workflow keeps counting where the crashed run stopped. It still
/// gets one attempt even when the budget was already used up.
pub fn run_step<T>(
    workflows: &dyn WorkflowStore,
    events: &EventDispatcher,
    record: &mut WorkflowRecord,
    step: &str,
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut attempt: impl FnMut(&mut WorkflowRecord) -> Result<T, WorkflowError>,
) -> Result<T, WorkflowError> {
    loop {
        cancel.ensure_active()?;
        let n = record.bump_attempt(step);
        record.touch();
        workflows.save_workflow(record)?;

        match attempt(record) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && n < policy.max_attempts => {
                tracing::warn!(
                    workflow_id = %record.id,
                    step,
                    attempt = n,
                    max = policy.max_attempts,
                    error = %e,
                    "transient step failure, retrying"
                );
                record.last_error = Some(e.coded_string());
                events.emit_step_retried(&StepRetriedEvent {
                    workflow_id: record.id.clone(),
                    step: step.to_string(),
                    attempt: n,
                    error: e.to_string(),
                });
                thread::sleep(policy.backoff * n);
            }
            Err(e) => return Err(e),
        }
    }
}
