//! VigilEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for handling Vigil events.
///
/// Handlers override only the events they care about. `Send + Sync` because
/// checks and workflows emit from worker threads.
pub trait VigilEventHandler: Send + Sync {
    // ---- Review ----
    fn on_review_started(&self, _event: &ReviewStartedEvent) {}
    fn on_checks_completed(&self, _event: &ChecksCompletedEvent) {}
    fn on_check_failed(&self, _event: &CheckFailedEvent) {}
    fn on_review_posted(&self, _event: &ReviewPostedEvent) {}
    fn on_review_failed(&self, _event: &ReviewFailedEvent) {}

    // ---- Simulation ----
    fn on_simulation_started(&self, _event: &SimulationStartedEvent) {}
    fn on_simulation_completed(&self, _event: &SimulationCompletedEvent) {}
    fn on_simulation_failed(&self, _event: &SimulationFailedEvent) {}

    // ---- Rules ----
    fn on_rule_drafted(&self, _event: &RuleDraftedEvent) {}
    fn on_rule_updated(&self, _event: &RuleUpdatedEvent) {}
    fn on_rule_promoted(&self, _event: &RulePromotedEvent) {}
    fn on_rule_deleted(&self, _event: &RuleDeletedEvent) {}

    // ---- Workflow ----
    fn on_step_retried(&self, _event: &StepRetriedEvent) {}
    fn on_workflow_recovered(&self, _event: &WorkflowRecoveredEvent) {}
}
