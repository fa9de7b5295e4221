//! Heartbeat sink for long-running collaborator calls.

/// Receives liveness signals. Implementations must be cheap to call.
pub trait ProgressReporter: Send + Sync {
    /// Called at least once per processed unit (e.g. file).
    fn heartbeat(&self, detail: &str);
}

/// Discards every heartbeat.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn heartbeat(&self, _detail: &str) {}
}
