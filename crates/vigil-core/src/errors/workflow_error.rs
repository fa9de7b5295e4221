//! Durable workflow errors.
//! Aggregates collaborator errors via `From` conversions.

use super::error_code::{self, ErrorClass, VigilErrorCode};
use super::{ConfigError, GenerationError, GitHostError, MatcherError, RuleError, StoreError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkflowError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Matcher error: {0}")]
    Matcher(#[from] MatcherError),

    #[error("Git host error: {0}")]
    GitHost(#[from] GitHostError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Step {step} exceeded its {limit_secs}s wall-clock limit")]
    StepTimeout { step: String, limit_secs: u64 },

    #[error("Step {step} sent no heartbeat for {idle_secs}s")]
    HeartbeatTimeout { step: String, idle_secs: u64 },

    #[error("Worker for step {step} exited without a result")]
    WorkerLost { step: String },

    #[error("Workflow {id} cannot run from state {state}")]
    InvalidState { id: String, state: String },

    #[error("Workflow checkpoint unreadable: {message}")]
    Checkpoint { message: String },

    #[error("Workflow cancelled")]
    Cancelled,
}

impl VigilErrorCode for WorkflowError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Matcher(e) => e.error_code(),
            Self::GitHost(e) => e.error_code(),
            Self::Generation(e) => e.error_code(),
            Self::Rule(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::StepTimeout { .. } => error_code::STEP_TIMEOUT,
            Self::HeartbeatTimeout { .. } => error_code::HEARTBEAT_TIMEOUT,
            Self::Cancelled => error_code::CANCELLED,
            Self::WorkerLost { .. } | Self::InvalidState { .. } | Self::Checkpoint { .. } => {
                error_code::WORKFLOW_ERROR
            }
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Store(e) => e.class(),
            Self::Matcher(MatcherError::Cancelled) => ErrorClass::Cancelled,
            Self::Matcher(e) => e.class(),
            Self::GitHost(e) => e.class(),
            Self::Generation(e) => e.class(),
            Self::Rule(e) => e.class(),
            Self::Config(e) => e.class(),
            Self::StepTimeout { .. } | Self::HeartbeatTimeout { .. } | Self::WorkerLost { .. } => {
                ErrorClass::Transient
            }
            Self::Cancelled => ErrorClass::Cancelled,
            Self::InvalidState { .. } => ErrorClass::Conflict,
            Self::Checkpoint { .. } => ErrorClass::Internal,
        }
    }
}
