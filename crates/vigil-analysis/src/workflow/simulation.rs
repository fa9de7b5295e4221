//! Rule simulation: `queued → scanning → aggregating → persisted`, or
//! `failed`.
//!
//! Runs a rule's structural query over a whole workspace and stores the
//! resulting impact report. A failed or cancelled run writes no report.

use std::path::Path;
use std::sync::Arc;

use vigil_core::config::VigilConfig;
use vigil_core::errors::{MatcherError, RuleError, VigilErrorCode, WorkflowError};
use vigil_core::events::{
    EventDispatcher, SimulationCompletedEvent, SimulationFailedEvent, SimulationStartedEvent,
};
use vigil_core::traits::{CancellationToken, GraphStore, PatternMatcher, ScanRequest, WorkflowStore};
use vigil_core::types::{
    FxHashSet, ImpactMatch, ImpactReportDoc, LedgerEntry, LedgerKind, Rule, WorkflowKind,
    WorkflowRecord,
};

use super::heartbeat::persist_heartbeats;
use super::retry::{run_step, RetryPolicy};
use super::state::{read_checkpoint, read_input, to_value, ScanCheckpoint, SimulationRequest, SimulationState};
use super::watchdog::{run_guarded, StepLimits};

#[derive(Clone)]
pub struct SimulationServices {
    pub graph: Arc<dyn GraphStore>,
    pub workflows: Arc<dyn WorkflowStore>,
    pub matcher: Arc<dyn PatternMatcher>,
}

pub struct SimulationOrchestrator {
    services: SimulationServices,
    config: VigilConfig,
    events: EventDispatcher,
}

impl SimulationOrchestrator {
    pub fn new(services: SimulationServices, config: VigilConfig) -> Self {
        Self {
            services,
            config,
            events: EventDispatcher::default(),
        }
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Queue and run a simulation of one rule.
    pub fn start(
        &self,
        request: SimulationRequest,
        cancel: &CancellationToken,
    ) -> Result<WorkflowRecord, WorkflowError> {
        let id = format!("simulation-{}", uuid::Uuid::new_v4());
        let record = WorkflowRecord::new(
            &id,
            WorkflowKind::Simulation,
            &request.org_id,
            SimulationState::Queued.as_str(),
            to_value(&request)?,
        );
        self.services.workflows.save_workflow(&record)?;

        tracing::info!(workflow_id = %id, rule_id = %request.rule_id, "simulation queued");
        self.events.emit_simulation_started(&SimulationStartedEvent {
            workflow_id: id,
            rule_id: request.rule_id.clone(),
        });
        self.resume(record, cancel)
    }

    /// Drive `record` to a terminal state. Step failures end in `failed`;
    /// `Err` means the failure itself could not be recorded.
    pub fn resume(
        &self,
        mut record: WorkflowRecord,
        cancel: &CancellationToken,
    ) -> Result<WorkflowRecord, WorkflowError> {
        let request: SimulationRequest = read_input(&record)?;
        let _span = tracing::info_span!("simulation", workflow_id = %record.id, rule_id = %request.rule_id).entered();

        loop {
            let outcome = match SimulationState::of(&record)? {
                SimulationState::Queued => self.queue(&mut record, cancel),
                SimulationState::Scanning => self.scan(&mut record, &request, cancel),
                SimulationState::Aggregating => self.aggregate_and_persist(&mut record, &request, cancel),
                SimulationState::Persisted | SimulationState::Failed => return Ok(record),
            };
            if let Err(e) = outcome {
                self.fail(&mut record, &request, &e)?;
                return Ok(record);
            }
        }
    }

    fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.config.workflow.effective_simulation_max_attempts(),
            self.config.workflow.retry_backoff(),
        )
    }

    fn limits(&self) -> StepLimits {
        StepLimits::from_config(&self.config.workflow)
    }

    fn queue(&self, record: &mut WorkflowRecord, cancel: &CancellationToken) -> Result<(), WorkflowError> {
        cancel.ensure_active()?;
        record.transition(SimulationState::Scanning.as_str());
        self.services.workflows.save_workflow(record)?;
        Ok(())
    }

    fn load_rule(&self, request: &SimulationRequest) -> Result<Rule, WorkflowError> {
        let rule = self
            .services
            .graph
            .get_rule(&request.org_id, &request.rule_id)?
            .ok_or_else(|| RuleError::NotFound {
                rule_id: request.rule_id.clone(),
            })?;
        if rule.languages.is_empty() {
            return Err(RuleError::InvalidPatch {
                field: "languages".to_string(),
                message: "simulation needs at least one language".to_string(),
            }
            .into());
        }
        Ok(rule)
    }

    /// Scan the whole workspace once per rule language; checkpoint matches.
    fn scan(
        &self,
        record: &mut WorkflowRecord,
        request: &SimulationRequest,
        cancel: &CancellationToken,
    ) -> Result<(), WorkflowError> {
        let workflows = self.services.workflows.as_ref();
        let limits = self.limits();
        let every = limits.heartbeat_timeout / 4;

        run_step(workflows, &self.events, record, "scanning", self.policy(), cancel, |record| {
            let rule = self.load_rule(request)?;
            let matcher = Arc::clone(&self.services.matcher);
            let workspace = request.workspace.clone();

            let matches = run_guarded(
                "scanning",
                limits,
                cancel,
                persist_heartbeats(workflows, record, every),
                move |progress, token| {
                    let mut seen = FxHashSet::default();
                    let mut matches = Vec::new();
                    for language in &rule.languages {
                        token.ensure_active()?;
                        progress.heartbeat(language);
                        let scan = ScanRequest::whole_workspace(
                            workspace.clone(),
                            &rule.structural_query,
                            language,
                        );
                        for m in matcher.scan(&scan, progress, token)? {
                            if seen.insert((m.file.clone(), m.line, m.column)) {
                                matches.push(m);
                            }
                        }
                    }
                    matches.sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
                    Ok(matches)
                },
            )?;

            tracing::info!(matches = matches.len(), "workspace scanned");
            record.checkpoint = to_value(&ScanCheckpoint { matches })?;
            record.last_error = None;
            record.transition(SimulationState::Aggregating.as_str());
            workflows.save_workflow(record)?;
            Ok(())
        })
    }

    /// Size the workspace, build the report, upsert it once.
    fn aggregate_and_persist(
        &self,
        record: &mut WorkflowRecord,
        request: &SimulationRequest,
        cancel: &CancellationToken,
    ) -> Result<(), WorkflowError> {
        let workflows = self.services.workflows.as_ref();
        let limits = self.limits();
        let every = limits.heartbeat_timeout / 4;
        let scanned: ScanCheckpoint = read_checkpoint(record)?;
        let excluded = self.config.simulation.effective_excluded_dirs();

        run_step(workflows, &self.events, record, "aggregating", self.policy(), cancel, |record| {
            let workspace = request.workspace.clone();
            let excluded = excluded.clone();
            let total = run_guarded(
                "aggregating",
                limits,
                cancel,
                persist_heartbeats(workflows, record, every),
                move |progress, token| {
                    progress.heartbeat("counting files");
                    let total = count_workspace_files(&workspace, &excluded)?;
                    token.ensure_active()?;
                    Ok(total)
                },
            )?;
            cancel.ensure_active()?;

            let findings: Vec<ImpactMatch> = scanned
                .matches
                .iter()
                .map(|m| ImpactMatch {
                    file: m.file.clone(),
                    line: m.line,
                    matched_code: m.matched_code.clone(),
                })
                .collect();
            let report = ImpactReportDoc::new(&request.org_id, &request.repo_id, &request.rule_id, findings, total);
            self.services.graph.upsert_impact_report(&report)?;
            self.services.graph.append_ledger(&LedgerEntry::new(
                &request.org_id,
                &request.repo_id,
                LedgerKind::RuleSimulated,
                &request.rule_id,
                format!(
                    "Rule simulated: {} match(es) across {} file(s)",
                    report.match_count, report.total_files_scanned
                ),
            ))?;

            record.last_error = None;
            record.transition(SimulationState::Persisted.as_str());
            workflows.save_workflow(record)?;

            tracing::info!(
                match_count = report.match_count,
                total_files_scanned = report.total_files_scanned,
                density = report.violation_density,
                "impact report persisted"
            );
            self.events.emit_simulation_completed(&SimulationCompletedEvent {
                workflow_id: record.id.clone(),
                rule_id: request.rule_id.clone(),
                match_count: report.match_count,
                total_files_scanned: report.total_files_scanned,
            });
            Ok(())
        })
    }

    fn fail(&self, record: &mut WorkflowRecord, request: &SimulationRequest, error: &WorkflowError) -> Result<(), WorkflowError> {
        tracing::error!(error = %error, class = %error.class(), state = %record.state, "simulation failed");
        record.last_error = Some(error.coded_string());
        record.transition(SimulationState::Failed.as_str());
        self.services.workflows.save_workflow(record)?;

        self.events.emit_simulation_failed(&SimulationFailedEvent {
            workflow_id: record.id.clone(),
            rule_id: request.rule_id.clone(),
            error: error.to_string(),
        });
        Ok(())
    }
}

/// Count regular files under `root`, skipping build and VCS directories.
///
/// `.gitignore` rules are not applied: ignored sources still count as part of
/// the workspace a rule could match.
pub fn count_workspace_files(root: &Path, excluded_dirs: &[String]) -> Result<u32, MatcherError> {
    if !root.is_dir() {
        return Err(MatcherError::Io {
            message: format!("workspace {} is not a directory", root.display()),
        });
    }

    let excluded: Vec<String> = excluded_dirs.to_vec();
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && entry.depth() > 0 && excluded.iter().any(|d| entry.file_name() == d.as_str()))
        })
        .build();

    let mut count = 0u32;
    for entry in walker {
        match entry {
            Ok(e) if e.file_type().is_some_and(|t| t.is_file()) => count += 1,
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "skipping unreadable workspace entry"),
        }
    }
    Ok(count)
}
