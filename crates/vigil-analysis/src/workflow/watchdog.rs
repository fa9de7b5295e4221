//! Watchdog enforcing a wall-clock limit and a heartbeat limit on one step.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, unbounded};
use vigil_core::config::WorkflowConfig;
use vigil_core::errors::WorkflowError;
use vigil_core::traits::{Cancellable, CancellationToken, ProgressReporter};

use super::heartbeat::ChannelProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLimits {
    pub step_timeout: Duration,
    pub heartbeat_timeout: Duration,
}

impl StepLimits {
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            step_timeout: config.step_timeout(),
            heartbeat_timeout: config.heartbeat_timeout(),
        }
    }
}

/// Run `work` on a detached worker thread under `limits`.
///
/// Every heartbeat the worker sends resets the heartbeat timer and is passed
/// to `on_heartbeat` on the calling thread. When either limit expires the
/// worker's token is cancelled and the timeout error is returned at once.
/// The worker is not joined; whatever it produces afterwards is dropped. A
/// panicking worker yields `WorkflowError::WorkerLost`.
pub fn run_guarded<T, F>(
    step: &str,
    limits: StepLimits,
    cancel: &CancellationToken,
    mut on_heartbeat: impl FnMut(&str),
    work: F,
) -> Result<T, WorkflowError>
where
    T: Send + 'static,
    F: FnOnce(&dyn ProgressReporter, &CancellationToken) -> Result<T, WorkflowError> + Send + 'static,
{
    let (beat_tx, beat_rx) = unbounded::<String>();
    let (done_tx, done_rx) = bounded::<Result<T, WorkflowError>>(1);
    let worker_token = cancel.child();
    // Held so the heartbeat channel never disconnects under the select loop.
    let _beat_keepalive = beat_tx.clone();

    let token = worker_token.clone();
    let step_name = step.to_string();
    let spawned = thread::Builder::new()
        .name(format!("vigil-{step}"))
        .spawn(move || {
            let progress = ChannelProgress::new(beat_tx);
            let outcome = catch_unwind(AssertUnwindSafe(|| work(&progress, &token)));
            let result = outcome.unwrap_or_else(|_| {
                tracing::error!(step = %step_name, "workflow step panicked");
                Err(WorkflowError::WorkerLost { step: step_name })
            });
            // The receiver is gone once the step has timed out.
            let _ = done_tx.send(result);
        });
    if let Err(e) = spawned {
        tracing::error!(step, error = %e, "worker thread not started");
        return Err(WorkflowError::WorkerLost { step: step.to_string() });
    }

    let started = Instant::now();
    let step_deadline = started + limits.step_timeout;
    let mut last_beat = started;

    loop {
        let deadline = step_deadline.min(last_beat + limits.heartbeat_timeout);
        let wait = deadline.saturating_duration_since(Instant::now());
        select! {
            recv(done_rx) -> msg => {
                return msg.unwrap_or_else(|_| Err(WorkflowError::WorkerLost { step: step.to_string() }));
            }
            recv(beat_rx) -> msg => {
                if let Ok(detail) = msg {
                    last_beat = Instant::now();
                    on_heartbeat(&detail);
                }
            }
            default(wait) => {
                worker_token.cancel();
                let now = Instant::now();
                let err = if now >= step_deadline {
                    tracing::warn!(step, limit_secs = limits.step_timeout.as_secs(), "step timed out");
                    WorkflowError::StepTimeout {
                        step: step.to_string(),
                        limit_secs: limits.step_timeout.as_secs(),
                    }
                } else {
                    tracing::warn!(step, idle_secs = now.duration_since(last_beat).as_secs(), "step heartbeat lost");
                    WorkflowError::HeartbeatTimeout {
                        step: step.to_string(),
                        idle_secs: now.duration_since(last_beat).as_secs(),
                    }
                };
                return Err(err);
            }
        }
    }
}
