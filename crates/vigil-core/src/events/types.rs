//! Event payload types.

use crate::types::{CheckKind, ReviewVerdict};

// ---- Review ----

#[derive(Debug, Clone)]
pub struct ReviewStartedEvent {
    pub review_id: String,
    pub org_id: String,
    pub repo_id: String,
}

#[derive(Debug, Clone)]
pub struct ChecksCompletedEvent {
    pub review_id: String,
    pub finding_count: usize,
    pub failed_checks: Vec<CheckKind>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct CheckFailedEvent {
    pub check: CheckKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ReviewPostedEvent {
    pub review_id: String,
    pub verdict: ReviewVerdict,
    pub comment_count: usize,
}

#[derive(Debug, Clone)]
pub struct ReviewFailedEvent {
    pub review_id: String,
    pub error: String,
}

// ---- Simulation ----

#[derive(Debug, Clone)]
pub struct SimulationStartedEvent {
    pub workflow_id: String,
    pub rule_id: String,
}

#[derive(Debug, Clone)]
pub struct SimulationCompletedEvent {
    pub workflow_id: String,
    pub rule_id: String,
    pub match_count: u32,
    pub total_files_scanned: u32,
}

#[derive(Debug, Clone)]
pub struct SimulationFailedEvent {
    pub workflow_id: String,
    pub rule_id: String,
    pub error: String,
}

// ---- Rules ----

#[derive(Debug, Clone)]
pub struct RuleDraftedEvent {
    pub title: String,
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct RuleUpdatedEvent {
    pub rule_id: String,
}

#[derive(Debug, Clone)]
pub struct RulePromotedEvent {
    pub rule_id: String,
    pub pattern_id: String,
}

#[derive(Debug, Clone)]
pub struct RuleDeletedEvent {
    pub rule_id: String,
}

// ---- Workflow ----

#[derive(Debug, Clone)]
pub struct StepRetriedEvent {
    pub workflow_id: String,
    pub step: String,
    pub attempt: u32,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct WorkflowRecoveredEvent {
    pub workflow_id: String,
    pub state: String,
}
