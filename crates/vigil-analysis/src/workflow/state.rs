//! Workflow states, inputs and checkpoints.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vigil_core::errors::WorkflowError;
use vigil_core::traits::MatchResult;
use vigil_core::types::{CheckFailure, PullRequestRef, ReviewFindings, WorkflowRecord};

macro_rules! workflow_states {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// State of a persisted record, rejecting names of other workflows.
            pub fn of(record: &WorkflowRecord) -> Result<Self, WorkflowError> {
                Self::parse(&record.state).ok_or_else(|| WorkflowError::InvalidState {
                    id: record.id.clone(),
                    state: record.state.clone(),
                })
            }
        }
    };
}

workflow_states!(ReviewState {
    Triggered => "triggered",
    DiffFetched => "diff_fetched",
    ChecksRun => "checks_run",
    ReviewPosted => "review_posted",
    Failed => "failed",
});

workflow_states!(SimulationState {
    Queued => "queued",
    Scanning => "scanning",
    Aggregating => "aggregating",
    Persisted => "persisted",
    Failed => "failed",
});

/// Input of a review workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub review_id: String,
    pub org_id: String,
    pub repo_id: String,
    pub pull: PullRequestRef,
    /// Checkout of the pull request head, for the pattern check.
    #[serde(default)]
    pub workspace: Option<PathBuf>,
}

/// What the check step hands to the posting step. The diff is not part of
/// it; posting fetches it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCheckpoint {
    pub findings: ReviewFindings,
    pub has_changes: bool,
    #[serde(default)]
    pub check_errors: Vec<CheckFailure>,
}

/// Input of a simulation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub org_id: String,
    pub repo_id: String,
    pub rule_id: String,
    pub workspace: PathBuf,
}

/// Checkpoint written after scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanCheckpoint {
    pub matches: Vec<MatchResult>,
}

pub(crate) fn read_input<T: serde::de::DeserializeOwned>(record: &WorkflowRecord) -> Result<T, WorkflowError> {
    serde_json::from_value(record.input.clone()).map_err(|e| WorkflowError::Checkpoint {
        message: format!("workflow {} input: {e}", record.id),
    })
}

pub(crate) fn read_checkpoint<T: serde::de::DeserializeOwned>(record: &WorkflowRecord) -> Result<T, WorkflowError> {
    serde_json::from_value(record.checkpoint.clone()).map_err(|e| WorkflowError::Checkpoint {
        message: format!("workflow {} checkpoint: {e}", record.id),
    })
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, WorkflowError> {
    serde_json::to_value(value).map_err(|e| WorkflowError::Checkpoint {
        message: e.to_string(),
    })
}
