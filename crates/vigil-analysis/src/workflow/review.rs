//! Review workflow: `triggered → diff_fetched → checks_run → review_posted`,
//! or `failed`.
//!
//! Step one fetches the diff, runs the checks and checkpoints only the
//! findings. Step two is self-sufficient: it fetches the diff again to place
//! inline comments and posts under a stable idempotency key, so re-running it
//! after a crash never produces a second review.

use std::sync::Arc;

use chrono::Utc;
use vigil_core::config::{ReviewConfig, VigilConfig};
use vigil_core::errors::{VigilErrorCode, WorkflowError};
use vigil_core::events::{
    ChecksCompletedEvent, EventDispatcher, ReviewFailedEvent, ReviewPostedEvent,
    ReviewStartedEvent,
};
use vigil_core::traits::{
    CancellationToken, GitHost, GraphStore, PatternMatcher, ProgressReporter, ReviewStore,
    WorkflowStore,
};
use vigil_core::types::{
    ChangeSet, CheckKind, LedgerEntry, LedgerKind, ReviewRecord, ReviewStatus, RuleQuery,
    WorkflowKind, WorkflowRecord,
};

use super::heartbeat::persist_heartbeats;
use super::retry::{run_step, RetryPolicy};
use super::state::{read_checkpoint, read_input, to_value, ReviewCheckpoint, ReviewRequest, ReviewState};
use super::watchdog::{run_guarded, StepLimits};
use crate::checks::{CheckContext, CheckEngine, CheckRun};
use crate::graph::{compute_blast_radius, resolve_changed_entities};
use crate::review::{build_submission, failure_idempotency_key};

/// Collaborators of the review workflow.
#[derive(Clone)]
pub struct ReviewServices {
    pub graph: Arc<dyn GraphStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub workflows: Arc<dyn WorkflowStore>,
    pub host: Arc<dyn GitHost>,
    /// Without a matcher enforced rules are reported as not evaluated.
    pub matcher: Option<Arc<dyn PatternMatcher>>,
}

pub struct ReviewOrchestrator {
    services: ReviewServices,
    config: VigilConfig,
    engine: CheckEngine,
    events: EventDispatcher,
}

impl ReviewOrchestrator {
    pub fn new(services: ReviewServices, config: VigilConfig) -> Self {
        Self {
            services,
            config,
            engine: CheckEngine::new(),
            events: EventDispatcher::default(),
        }
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.engine = self.engine.with_events(events.clone());
        self.events = events;
        self
    }

    pub fn with_engine(mut self, engine: CheckEngine) -> Self {
        self.engine = engine.with_events(self.events.clone());
        self
    }

    /// Workflow id of the review `review_id`.
    pub fn workflow_id(review_id: &str) -> String {
        format!("review-{review_id}")
    }

    /// Start the review, or pick up an existing run of the same review id.
    pub fn start(
        &self,
        request: ReviewRequest,
        cancel: &CancellationToken,
    ) -> Result<WorkflowRecord, WorkflowError> {
        let id = Self::workflow_id(&request.review_id);
        if let Some(existing) = self.services.workflows.load_workflow(&id)? {
            tracing::info!(workflow_id = %id, state = %existing.state, "review already known");
            return self.resume(existing, cancel);
        }

        let record = WorkflowRecord::new(
            &id,
            WorkflowKind::Review,
            &request.org_id,
            ReviewState::Triggered.as_str(),
            to_value(&request)?,
        );
        self.services.workflows.save_workflow(&record)?;
        self.services.reviews.save_review(&ReviewRecord::new(
            &request.review_id,
            &request.org_id,
            &request.repo_id,
            request.pull.clone(),
        ))?;

        tracing::info!(review_id = %request.review_id, pull = %request.pull, "review triggered");
        self.events.emit_review_started(&ReviewStartedEvent {
            review_id: request.review_id.clone(),
            org_id: request.org_id.clone(),
            repo_id: request.repo_id.clone(),
        });
        self.resume(record, cancel)
    }

    /// Drive `record` from its persisted state to a terminal one.
    ///
    /// A failed step leaves the record in `failed` and is reported through
    /// the record, not the return value; `Err` means even the failure could
    /// not be recorded.
    pub fn resume(
        &self,
        mut record: WorkflowRecord,
        cancel: &CancellationToken,
    ) -> Result<WorkflowRecord, WorkflowError> {
        let request: ReviewRequest = read_input(&record)?;
        let _span = tracing::info_span!("review", review_id = %request.review_id).entered();

        loop {
            let outcome = match ReviewState::of(&record)? {
                ReviewState::Triggered | ReviewState::DiffFetched => {
                    self.fetch_diff_and_run_checks(&mut record, &request, cancel)
                }
                ReviewState::ChecksRun => self.post_review_self_sufficient(&mut record, &request, cancel),
                ReviewState::ReviewPosted | ReviewState::Failed => return Ok(record),
            };
            if let Err(e) = outcome {
                self.fail(&mut record, &request, &e)?;
                return Ok(record);
            }
        }
    }

    fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.config.workflow.effective_review_max_attempts(),
            self.config.workflow.retry_backoff(),
        )
    }

    fn limits(&self) -> StepLimits {
        StepLimits::from_config(&self.config.workflow)
    }

    /// Step 1: fetch the diff, analyse it, persist findings, checkpoint.
    fn fetch_diff_and_run_checks(
        &self,
        record: &mut WorkflowRecord,
        request: &ReviewRequest,
        cancel: &CancellationToken,
    ) -> Result<(), WorkflowError> {
        let workflows = self.services.workflows.as_ref();
        let limits = self.limits();
        let every = limits.heartbeat_timeout / 4;

        run_step(workflows, &self.events, record, "fetch_diff_and_run_checks", self.policy(), cancel, |record| {
            let host = Arc::clone(&self.services.host);
            let pull = request.pull.clone();
            let changes = run_guarded(
                "fetch_diff",
                limits,
                cancel,
                persist_heartbeats(workflows, record, every),
                move |_, _| Ok(host.fetch_diff(&pull)?),
            )?;
            if record.state != ReviewState::DiffFetched.as_str() {
                record.transition(ReviewState::DiffFetched.as_str());
                workflows.save_workflow(record)?;
            }

            let has_changes = changes.has_changes();
            let analysis = Analysis {
                services: self.services.clone(),
                engine: self.engine.clone(),
                config: self.config.clone(),
                request: request.clone(),
            };
            let run = run_guarded(
                "run_checks",
                limits,
                cancel,
                persist_heartbeats(workflows, record, every),
                move |progress, token| analysis.run(&changes, progress, token),
            )?;

            let checkpoint = ReviewCheckpoint {
                findings: run.findings,
                has_changes,
                check_errors: run.failures,
            };
            self.persist_findings(request, &checkpoint)?;

            record.checkpoint = to_value(&checkpoint)?;
            record.last_error = None;
            record.transition(ReviewState::ChecksRun.as_str());
            workflows.save_workflow(record)?;

            self.events.emit_checks_completed(&ChecksCompletedEvent {
                review_id: request.review_id.clone(),
                finding_count: checkpoint.findings.total(),
                failed_checks: checkpoint.check_errors.iter().map(|f| f.check).collect(),
                duration_ms: run.duration_ms,
            });
            Ok(())
        })
    }

    fn persist_findings(&self, request: &ReviewRequest, checkpoint: &ReviewCheckpoint) -> Result<(), WorkflowError> {
        let mut review = self.load_review(request)?;
        review.findings = checkpoint.findings.clone();
        review.check_errors = checkpoint.check_errors.clone();
        review.status = ReviewStatus::ChecksRun;
        review.updated_at = Utc::now();
        self.services.reviews.save_review(&review)?;
        Ok(())
    }

    fn load_review(&self, request: &ReviewRequest) -> Result<ReviewRecord, WorkflowError> {
        Ok(self
            .services
            .reviews
            .get_review(&request.org_id, &request.review_id)?
            .unwrap_or_else(|| {
                ReviewRecord::new(&request.review_id, &request.org_id, &request.repo_id, request.pull.clone())
            }))
    }

    /// Step 2: render and post from the checkpoint alone.
    fn post_review_self_sufficient(
        &self,
        record: &mut WorkflowRecord,
        request: &ReviewRequest,
        cancel: &CancellationToken,
    ) -> Result<(), WorkflowError> {
        let workflows = self.services.workflows.as_ref();
        let limits = self.limits();
        let every = limits.heartbeat_timeout / 4;
        let checkpoint: ReviewCheckpoint = read_checkpoint(record)?;

        run_step(workflows, &self.events, record, "post_review", self.policy(), cancel, |record| {
            let host = Arc::clone(&self.services.host);
            let pull = request.pull.clone();
            let review_id = request.review_id.clone();
            let posted = checkpoint.clone();
            let submission = run_guarded(
                "post_review",
                limits,
                cancel,
                persist_heartbeats(workflows, record, every),
                move |progress, token| {
                    let changes = if posted.has_changes {
                        Some(host.fetch_diff(&pull)?)
                    } else {
                        None
                    };
                    token.ensure_active()?;
                    progress.heartbeat("posting review");
                    let submission = build_submission(
                        &pull,
                        &review_id,
                        &posted.findings,
                        &posted.check_errors,
                        posted.has_changes,
                        changes.as_ref(),
                    );
                    host.post_review(&submission)?;
                    Ok(submission)
                },
            )?;

            let mut review = self.load_review(request)?;
            review.verdict = Some(submission.verdict);
            review.status = ReviewStatus::Posted;
            review.updated_at = Utc::now();
            self.services.reviews.save_review(&review)?;

            self.services.graph.append_ledger(&LedgerEntry::new(
                &request.org_id,
                &request.repo_id,
                LedgerKind::ReviewPosted,
                &request.review_id,
                format!(
                    "Review of {} posted: {} with {} comment(s)",
                    request.pull,
                    submission.verdict.as_str(),
                    submission.comment_count()
                ),
            ))?;

            record.last_error = None;
            record.transition(ReviewState::ReviewPosted.as_str());
            workflows.save_workflow(record)?;

            tracing::info!(verdict = submission.verdict.as_str(), comments = submission.comment_count(), "review posted");
            self.events.emit_review_posted(&ReviewPostedEvent {
                review_id: request.review_id.clone(),
                verdict: submission.verdict,
                comment_count: submission.comment_count(),
            });
            Ok(())
        })
    }

    /// Record the failure everywhere it is visible. Only the workflow record
    /// write is mandatory; the rest is best effort.
    fn fail(&self, record: &mut WorkflowRecord, request: &ReviewRequest, error: &WorkflowError) -> Result<(), WorkflowError> {
        tracing::error!(error = %error, class = %error.class(), state = %record.state, "review failed");
        record.last_error = Some(error.coded_string());
        record.transition(ReviewState::Failed.as_str());
        self.services.workflows.save_workflow(record)?;

        match self.load_review(request) {
            Ok(mut review) => {
                review.status = ReviewStatus::Failed;
                review.updated_at = Utc::now();
                if let Err(e) = self.services.reviews.save_review(&review) {
                    tracing::warn!(error = %e, "failed review not persisted");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed review not loaded"),
        }

        let message = format!("Vigil could not complete this review: {error}");
        if let Err(e) = self.services.host.post_failure(
            &request.pull,
            &request.review_id,
            &message,
            &failure_idempotency_key(&request.review_id),
        ) {
            tracing::warn!(error = %e, "failure notice not posted");
        }

        if let Err(e) = self.services.graph.append_ledger(&LedgerEntry::new(
            &request.org_id,
            &request.repo_id,
            LedgerKind::ReviewFailed,
            &request.review_id,
            format!("Review of {} failed: {}", request.pull, error.error_code()),
        )) {
            tracing::warn!(error = %e, "failure not recorded in ledger");
        }

        self.events.emit_review_failed(&ReviewFailedEvent {
            review_id: request.review_id.clone(),
            error: error.to_string(),
        });
        Ok(())
    }
}

/// Everything the check step needs, owned so it can run on a detached
/// worker.
struct Analysis {
    services: ReviewServices,
    engine: CheckEngine,
    config: VigilConfig,
    request: ReviewRequest,
}

impl Analysis {
    /// Resolve entities, compute blast radius and run the checks.
    fn run(
        &self,
        changes: &ChangeSet,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<CheckRun, WorkflowError> {
        let graph = self.services.graph.as_ref();
        let request = &self.request;
        let org = request.org_id.as_str();
        let repo = request.repo_id.as_str();

        let config = self.review_config(org, repo)?;
        progress.heartbeat("resolving changed entities");
        let entities = resolve_changed_entities(graph, org, repo, changes)?;
        cancel.ensure_active()?;

        progress.heartbeat("computing blast radius");
        let summaries = compute_blast_radius(graph, org, &entities, &self.config.blast_radius)?;
        cancel.ensure_active()?;

        let rules = if config.is_enabled(CheckKind::Pattern) {
            graph.query_rules(org, &RuleQuery::enforced_for(repo))?
        } else {
            Vec::new()
        };
        let api_boundary_kinds = self.config.blast_radius.effective_api_boundary_kinds();

        progress.heartbeat("running checks");
        let ctx = CheckContext {
            org_id: org,
            repo_id: repo,
            entities: &entities,
            summaries: &summaries,
            config: &config,
            changes,
            store: graph,
            rules: &rules,
            matcher: self.services.matcher.as_deref(),
            workspace: request.workspace.as_deref(),
            api_boundary_kinds: &api_boundary_kinds,
            cancel,
        };
        let run = self.engine.run(&ctx);
        cancel.ensure_active()?;
        Ok(run)
    }

    /// Stored repository settings, else the configured defaults.
    fn review_config(&self, org_id: &str, repo_id: &str) -> Result<ReviewConfig, WorkflowError> {
        Ok(self
            .services
            .reviews
            .get_review_config(org_id, repo_id)?
            .unwrap_or_else(|| self.config.review.to_review_config()))
    }
}
