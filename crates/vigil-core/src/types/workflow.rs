//! Durable workflow instances.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    Review,
    Simulation,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Simulation => "simulation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "review" => Some(Self::Review),
            "simulation" => Some(Self::Simulation),
            _ => None,
        }
    }
}

/// States that end a workflow, whatever its kind.
pub const TERMINAL_STATES: &[&str] = &["review_posted", "persisted", "failed"];

/// Persisted progress of one workflow run.
///
/// `state` holds the orchestrator's state name; `checkpoint` the output of the
/// last completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub id: String,
    pub kind: WorkflowKind,
    pub org_id: String,
    pub state: String,
    /// Attempts made per step name.
    #[serde(default)]
    pub attempts: BTreeMap<String, u32>,
    pub input: serde_json::Value,
    #[serde(default)]
    pub checkpoint: serde_json::Value,
    pub last_error: Option<String>,
    pub heartbeat_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRecord {
    pub fn new(id: &str, kind: WorkflowKind, org_id: &str, initial_state: &str, input: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            kind,
            org_id: org_id.to_string(),
            state: initial_state.to_string(),
            attempts: BTreeMap::new(),
            input,
            checkpoint: serde_json::Value::Null,
            last_error: None,
            heartbeat_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        TERMINAL_STATES.contains(&self.state.as_str())
    }

    pub fn attempts_for(&self, step: &str) -> u32 {
        self.attempts.get(step).copied().unwrap_or(0)
    }

    /// Record one more attempt of `step` and return the new count.
    pub fn bump_attempt(&mut self, step: &str) -> u32 {
        let n = self.attempts.entry(step.to_string()).or_insert(0);
        *n += 1;
        *n
    }

    pub fn transition(&mut self, state: &str) {
        self.state = state.to_string();
        self.touch();
    }

    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = now;
        self.heartbeat_at = Some(now);
    }
}
