//! Shared fixtures: an in-memory store with call counting, and fake
//! git host, matcher and generator collaborators.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use vigil_core::errors::{GenerationError, GitHostError, MatcherError, StoreError};
use vigil_core::traits::{
    CancellationToken, Cancellable, GitHost, GraphStore, MatchResult, PatternMatcher,
    ProgressReporter, ScanRequest, StructuredGenerator,
};
use vigil_core::types::*;
use vigil_storage::SqliteStore;

pub const ORG: &str = "org";
pub const REPO: &str = "repo";

pub fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().unwrap())
}

pub fn entity(kind: EntityKind, name: &str, file: &str, start: u32, end: u32) -> Entity {
    Entity::new(ORG, REPO, kind, name, file, start, end)
}

pub fn func(name: &str, file: &str) -> Entity {
    entity(EntityKind::Function, name, file, 1, 20)
}

/// Insert `entities` and `(caller, callee)` edges.
pub fn seed(store: &SqliteStore, entities: &[Entity], calls: &[(&Entity, &Entity)]) {
    store.insert_entities(entities).unwrap();
    let edges: Vec<(EntityId, EntityId)> = calls
        .iter()
        .map(|(caller, callee)| (caller.id.clone(), callee.id.clone()))
        .collect();
    store.insert_edges(ORG, &edges).unwrap();
}

pub fn changed(path: &str, added: &[(u32, &str)]) -> ChangedFile {
    ChangedFile {
        path: path.to_string(),
        status: FileStatus::Modified,
        language: None,
        added_lines: added.iter().map(|(n, c)| DiffLine::new(*n, *c)).collect(),
        removed_lines: Vec::new(),
    }
}

pub fn pull() -> PullRequestRef {
    PullRequestRef {
        owner: "acme".into(),
        name: "shop".into(),
        number: 42,
        head_sha: "abc123".into(),
    }
}

pub fn rule(id: &str, query: &str, enforcement: Enforcement) -> Rule {
    let now = Utc::now();
    Rule {
        id: id.into(),
        org_id: ORG.into(),
        repo_id: Some(REPO.into()),
        name: id.into(),
        title: format!("Rule {id}"),
        description: String::new(),
        rule_type: RuleType::Architecture,
        structural_query: query.into(),
        secondary_query: None,
        languages: vec!["typescript".into()],
        path_glob: None,
        enforcement,
        priority: 0,
        status: RuleStatus::Active,
        scope: RuleScope::Repo,
        options: BTreeMap::from([("autofix".to_string(), serde_json::json!({"enabled": true}))]),
        source_pattern_id: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn pattern(hash: &str, status: PatternStatus) -> Pattern {
    Pattern {
        id: format!("pat-{hash}"),
        org_id: ORG.into(),
        repo_id: REPO.into(),
        hash: hash.into(),
        name: "fetch-wrapper".into(),
        description: "Network calls go through the shared client".into(),
        category: "api".into(),
        structural_query: "fetch($URL)".into(),
        languages: vec!["typescript".into()],
        adherence_rate: 0.92,
        match_count: 37,
        status,
        detected_at: Utc::now(),
    }
}

// ---- Counting store ----

/// Delegates to SQLite and counts every graph call. Pattern status writes
/// can be made to fail a set number of times.
pub struct CountingStore {
    pub inner: Arc<SqliteStore>,
    calls: AtomicUsize,
    status_failures: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<SqliteStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            status_failures: AtomicUsize::new(0),
        }
    }

    pub fn fail_pattern_status(&self, times: usize) {
        self.status_failures.store(times, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl GraphStore for CountingStore {
    fn get_entity(&self, org_id: &str, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        self.hit();
        self.inner.get_entity(org_id, id)
    }

    fn get_entities_in_file(&self, org_id: &str, repo_id: &str, file_path: &str) -> Result<Vec<Entity>, StoreError> {
        self.hit();
        self.inner.get_entities_in_file(org_id, repo_id, file_path)
    }

    fn get_callers_of(&self, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        self.hit();
        self.inner.get_callers_of(org_id, id)
    }

    fn get_callees_of(&self, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        self.hit();
        self.inner.get_callees_of(org_id, id)
    }

    fn get_drift_scores(&self, org_id: &str, repo_id: &str) -> Result<Vec<DriftScore>, StoreError> {
        self.hit();
        self.inner.get_drift_scores(org_id, repo_id)
    }

    fn query_rules(&self, org_id: &str, query: &RuleQuery) -> Result<Vec<Rule>, StoreError> {
        self.hit();
        self.inner.query_rules(org_id, query)
    }

    fn get_rule(&self, org_id: &str, rule_id: &str) -> Result<Option<Rule>, StoreError> {
        self.hit();
        self.inner.get_rule(org_id, rule_id)
    }

    fn upsert_rule(&self, rule: &Rule) -> Result<(), StoreError> {
        self.hit();
        self.inner.upsert_rule(rule)
    }

    fn delete_rule(&self, org_id: &str, rule_id: &str) -> Result<bool, StoreError> {
        self.hit();
        self.inner.delete_rule(org_id, rule_id)
    }

    fn get_pattern_by_hash(&self, org_id: &str, repo_id: &str, hash: &str) -> Result<Option<Pattern>, StoreError> {
        self.hit();
        self.inner.get_pattern_by_hash(org_id, repo_id, hash)
    }

    fn update_pattern_status(&self, org_id: &str, pattern_id: &str, status: PatternStatus) -> Result<(), StoreError> {
        self.hit();
        let failing = self
            .status_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable {
                message: "database is locked".into(),
            });
        }
        self.inner.update_pattern_status(org_id, pattern_id, status)
    }

    fn upsert_impact_report(&self, report: &ImpactReportDoc) -> Result<(), StoreError> {
        self.hit();
        self.inner.upsert_impact_report(report)
    }

    fn get_impact_report(&self, org_id: &str, rule_id: &str) -> Result<Option<ImpactReportDoc>, StoreError> {
        self.hit();
        self.inner.get_impact_report(org_id, rule_id)
    }

    fn append_ledger(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.hit();
        self.inner.append_ledger(entry)
    }

    fn query_ledger_timeline(
        &self,
        org_id: &str,
        repo_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<LedgerPage, StoreError> {
        self.hit();
        self.inner.query_ledger_timeline(org_id, repo_id, cursor, limit)
    }

    fn query_ledger_summaries(&self, org_id: &str, repo_id: &str) -> Result<Vec<LedgerSummary>, StoreError> {
        self.hit();
        self.inner.query_ledger_summaries(org_id, repo_id)
    }
}

// ---- Git host ----

#[derive(Default)]
pub struct FakeHost {
    pub diff: Mutex<ChangeSet>,
    /// Number of upcoming `fetch_diff` calls that fail as unavailable.
    pub fetch_failures: AtomicU32,
    /// When set, every `post_review` is rejected.
    pub reject_posts: Mutex<bool>,
    pub fetches: AtomicU32,
    pub posted: Mutex<Vec<ReviewSubmission>>,
    pub failures: Mutex<Vec<(String, String)>>,
}

impl FakeHost {
    pub fn with_diff(diff: ChangeSet) -> Self {
        Self {
            diff: Mutex::new(diff),
            ..Self::default()
        }
    }

    pub fn posted(&self) -> Vec<ReviewSubmission> {
        self.posted.lock().unwrap().clone()
    }
}

impl GitHost for FakeHost {
    fn fetch_diff(&self, _pull: &PullRequestRef) -> Result<ChangeSet, GitHostError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let pending = self.fetch_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.fetch_failures.store(pending - 1, Ordering::SeqCst);
            return Err(GitHostError::Unavailable {
                message: "502 from host".into(),
            });
        }
        Ok(self.diff.lock().unwrap().clone())
    }

    fn post_review(&self, submission: &ReviewSubmission) -> Result<(), GitHostError> {
        if *self.reject_posts.lock().unwrap() {
            return Err(GitHostError::Rejected {
                message: "review body too large".into(),
            });
        }
        let mut posted = self.posted.lock().unwrap();
        if !posted.iter().any(|p| p.idempotency_key == submission.idempotency_key) {
            posted.push(submission.clone());
        }
        Ok(())
    }

    fn post_failure(
        &self,
        _pull: &PullRequestRef,
        _review_id: &str,
        message: &str,
        idempotency_key: &str,
    ) -> Result<(), GitHostError> {
        self.failures
            .lock()
            .unwrap()
            .push((idempotency_key.to_string(), message.to_string()));
        Ok(())
    }
}

// ---- Matcher ----

pub enum MatcherMode {
    /// Return these matches for every scan.
    Matches(Vec<MatchResult>),
    /// Fail every scan.
    Fail(MatcherError),
    /// Keep heartbeating until cancelled.
    Spin,
    /// Sleep without heartbeating until cancelled.
    Stall,
}

pub struct FakeMatcher {
    pub mode: Mutex<MatcherMode>,
    pub scans: Mutex<Vec<ScanRequest>>,
}

impl FakeMatcher {
    pub fn new(mode: MatcherMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            scans: Mutex::new(Vec::new()),
        }
    }

    pub fn matching(matches: Vec<MatchResult>) -> Self {
        Self::new(MatcherMode::Matches(matches))
    }

    pub fn set_mode(&self, mode: MatcherMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn scan_count(&self) -> usize {
        self.scans.lock().unwrap().len()
    }
}

pub fn hit(file: &str, line: u32, code: &str) -> MatchResult {
    MatchResult {
        file: file.into(),
        line,
        column: 1,
        matched_code: code.into(),
    }
}

impl PatternMatcher for FakeMatcher {
    fn scan(
        &self,
        request: &ScanRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Vec<MatchResult>, MatcherError> {
        self.scans.lock().unwrap().push(request.clone());
        let heartbeating = match &*self.mode.lock().unwrap() {
            MatcherMode::Matches(found) => {
                progress.heartbeat("scanned");
                return Ok(found
                    .iter()
                    .filter(|m| request.paths.is_empty() || request.paths.contains(&m.file))
                    .cloned()
                    .collect());
            }
            MatcherMode::Fail(e) => return Err(e.clone()),
            MatcherMode::Spin => true,
            MatcherMode::Stall => false,
        };
        while !cancel.is_cancelled() {
            if heartbeating {
                progress.heartbeat("still scanning");
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        Err(MatcherError::Cancelled)
    }

    fn check_query(&self, query: &str, language: &str) -> Result<(), MatcherError> {
        if language == "cobol" {
            return Err(MatcherError::UnsupportedLanguage(language.into()));
        }
        if query.contains("((") {
            return Err(MatcherError::InvalidQuery {
                language: language.into(),
                message: "unbalanced parentheses".into(),
            });
        }
        Ok(())
    }
}

// ---- Generator ----

/// Replays canned outputs in order; the last one repeats.
pub struct ScriptedGenerator {
    outputs: Mutex<VecDeque<Result<serde_json::Value, GenerationError>>>,
    pub calls: AtomicU32,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(outputs: Vec<Result<serde_json::Value, GenerationError>>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl StructuredGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str, _schema: &serde_json::Value) -> Result<serde_json::Value, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut outputs = self.outputs.lock().unwrap();
        if outputs.len() > 1 {
            outputs.pop_front().unwrap()
        } else {
            outputs.front().cloned().unwrap()
        }
    }
}
