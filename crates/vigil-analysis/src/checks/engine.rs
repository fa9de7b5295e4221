//! Check engine: runs every check in isolation, concurrently.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use vigil_core::errors::{CheckError, VigilErrorCode};
use vigil_core::events::{CheckFailedEvent, EventDispatcher};
use vigil_core::types::{CheckFailure, CheckKind, Finding, ReviewFindings};

use super::complexity::ComplexityCheck;
use super::contract::ContractCheck;
use super::dependency::DependencyCheck;
use super::env::EnvCheck;
use super::idempotency::IdempotencyCheck;
use super::impact::ImpactCheck;
use super::pattern::PatternCheck;
use super::test_coverage::TestCoverageCheck;
use super::trust_boundary::TrustBoundaryCheck;
use super::types::{Check, CheckContext};

/// Outcome of one engine run.
#[derive(Debug, Clone)]
pub struct CheckRun {
    pub findings: ReviewFindings,
    /// One entry per check that errored or panicked.
    pub failures: Vec<CheckFailure>,
    pub duration_ms: u64,
}

impl CheckRun {
    pub fn failed_checks(&self) -> Vec<CheckKind> {
        self.failures.iter().map(|f| f.check).collect()
    }
}

#[derive(Clone)]
pub struct CheckEngine {
    checks: Arc<[Box<dyn Check>]>,
    events: EventDispatcher,
}

impl CheckEngine {
    /// Engine with every check of [`CheckKind::ALL`].
    pub fn new() -> Self {
        Self::with_checks(vec![
            Box::new(ImpactCheck),
            Box::new(ContractCheck),
            Box::new(PatternCheck),
            Box::new(TestCoverageCheck),
            Box::new(ComplexityCheck),
            Box::new(DependencyCheck),
            Box::new(TrustBoundaryCheck),
            Box::new(EnvCheck),
            Box::new(IdempotencyCheck),
        ])
    }

    pub fn with_checks(checks: Vec<Box<dyn Check>>) -> Self {
        Self {
            checks: checks.into(),
            events: EventDispatcher::default(),
        }
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Run all checks. A failing check never affects the others: its group
    /// stays empty and a [`CheckFailure`] is recorded instead.
    pub fn run(&self, ctx: &CheckContext<'_>) -> CheckRun {
        let start = Instant::now();

        let outcomes: Vec<(CheckKind, Result<Vec<Finding>, CheckError>)> = self
            .checks
            .par_iter()
            .map(|check| (check.kind(), run_isolated(check.as_ref(), ctx)))
            .collect();

        let mut findings = ReviewFindings::empty();
        let mut failures = Vec::new();
        for (kind, outcome) in outcomes {
            match outcome {
                Ok(list) => findings.set(kind, list),
                Err(e) => {
                    tracing::warn!(check = %kind, error = %e, "check failed");
                    self.events.emit_check_failed(&CheckFailedEvent {
                        check: kind,
                        message: e.to_string(),
                    });
                    failures.push(CheckFailure {
                        check: kind,
                        code: e.error_code().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        failures.sort_by_key(|f| f.check);

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            findings = findings.total(),
            failed = failures.len(),
            duration_ms,
            "checks completed"
        );

        CheckRun {
            findings,
            failures,
            duration_ms,
        }
    }
}

impl Default for CheckEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one check: disabled checks return nothing without touching the
/// context, errors and panics are captured.
pub fn run_isolated(check: &dyn Check, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
    let kind = check.kind();
    if !ctx.config.is_enabled(kind) {
        tracing::debug!(check = %kind, "check disabled");
        return Ok(Vec::new());
    }

    let _span = tracing::debug_span!("check", check = %kind).entered();
    match catch_unwind(AssertUnwindSafe(|| check.run(ctx))) {
        Ok(result) => result,
        Err(payload) => Err(CheckError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
