//! EventDispatcher: synchronous fan-out to registered handlers.

use std::sync::Arc;

use super::handler::VigilEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn VigilEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn VigilEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// A panicking handler is logged and skipped; later handlers still run.
    fn emit<F: Fn(&dyn VigilEventHandler)>(&self, event_name: &'static str, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!(event = event_name, "event handler panicked");
            }
        }
    }

    // ---- Review ----
    pub fn emit_review_started(&self, event: &ReviewStartedEvent) {
        self.emit("review_started", |h| h.on_review_started(event));
    }

    pub fn emit_checks_completed(&self, event: &ChecksCompletedEvent) {
        self.emit("checks_completed", |h| h.on_checks_completed(event));
    }

    pub fn emit_check_failed(&self, event: &CheckFailedEvent) {
        self.emit("check_failed", |h| h.on_check_failed(event));
    }

    pub fn emit_review_posted(&self, event: &ReviewPostedEvent) {
        self.emit("review_posted", |h| h.on_review_posted(event));
    }

    pub fn emit_review_failed(&self, event: &ReviewFailedEvent) {
        self.emit("review_failed", |h| h.on_review_failed(event));
    }

    // ---- Simulation ----
    pub fn emit_simulation_started(&self, event: &SimulationStartedEvent) {
        self.emit("simulation_started", |h| h.on_simulation_started(event));
    }

    pub fn emit_simulation_completed(&self, event: &SimulationCompletedEvent) {
        self.emit("simulation_completed", |h| h.on_simulation_completed(event));
    }

    pub fn emit_simulation_failed(&self, event: &SimulationFailedEvent) {
        self.emit("simulation_failed", |h| h.on_simulation_failed(event));
    }

    // ---- Rules ----
    pub fn emit_rule_drafted(&self, event: &RuleDraftedEvent) {
        self.emit("rule_drafted", |h| h.on_rule_drafted(event));
    }

    pub fn emit_rule_updated(&self, event: &RuleUpdatedEvent) {
        self.emit("rule_updated", |h| h.on_rule_updated(event));
    }

    pub fn emit_rule_promoted(&self, event: &RulePromotedEvent) {
        self.emit("rule_promoted", |h| h.on_rule_promoted(event));
    }

    pub fn emit_rule_deleted(&self, event: &RuleDeletedEvent) {
        self.emit("rule_deleted", |h| h.on_rule_deleted(event));
    }

    // ---- Workflow ----
    pub fn emit_step_retried(&self, event: &StepRetriedEvent) {
        self.emit("step_retried", |h| h.on_step_retried(event));
    }

    pub fn emit_workflow_recovered(&self, event: &WorkflowRecoveredEvent) {
        self.emit("workflow_recovered", |h| h.on_workflow_recovered(event));
    }
}
