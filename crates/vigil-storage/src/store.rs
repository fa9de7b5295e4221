//! `SqliteStore`: the collaborator traits over one SQLite database.

use std::path::Path;

use vigil_core::config::ReviewConfig;
use vigil_core::errors::StoreError;
use vigil_core::traits::{GraphStore, ReviewStore, WorkflowStore};
use vigil_core::types::{
    DriftScore, Entity, EntityId, ImpactReportDoc, LedgerEntry, LedgerPage, LedgerSummary,
    Pattern, PatternStatus, ReviewRecord, Rule, RuleQuery, WorkflowRecord,
};

use crate::connection::writer::with_immediate_transaction;
use crate::connection::DatabaseManager;
use crate::pagination::PaginationCursor;
use crate::queries::{
    drift, edges, entities, impact_reports, ledger, patterns, review_configs, reviews, rules,
    workflows,
};

/// Largest ledger page served, whatever the caller asks for.
const MAX_LEDGER_PAGE: usize = 500;

pub struct SqliteStore {
    db: DatabaseManager,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            db: DatabaseManager::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    // ---- Indexer-side writes: the engine itself only reads these tables ----

    pub fn insert_entities(&self, batch: &[Entity]) -> Result<usize, StoreError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| entities::insert_entities(tx, batch))
        })
    }

    pub fn insert_edges(&self, org_id: &str, batch: &[(EntityId, EntityId)]) -> Result<usize, StoreError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| edges::insert_edges(tx, org_id, batch))
        })
    }

    pub fn upsert_drift_scores(&self, scores: &[DriftScore]) -> Result<usize, StoreError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| drift::upsert_drift_scores(tx, scores))
        })
    }

    pub fn upsert_pattern(&self, pattern: &Pattern) -> Result<(), StoreError> {
        self.db.with_writer(|conn| patterns::upsert_pattern(conn, pattern))
    }
}

impl GraphStore for SqliteStore {
    fn get_entity(&self, org_id: &str, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        self.db.with_reader(|conn| entities::get_entity(conn, org_id, id))
    }

    fn get_entities_in_file(
        &self,
        org_id: &str,
        repo_id: &str,
        file_path: &str,
    ) -> Result<Vec<Entity>, StoreError> {
        self.db
            .with_reader(|conn| entities::get_entities_in_file(conn, org_id, repo_id, file_path))
    }

    fn get_callers_of(&self, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        self.db.with_reader(|conn| edges::get_callers(conn, org_id, id))
    }

    fn get_callees_of(&self, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        self.db.with_reader(|conn| edges::get_callees(conn, org_id, id))
    }

    fn get_drift_scores(&self, org_id: &str, repo_id: &str) -> Result<Vec<DriftScore>, StoreError> {
        self.db
            .with_reader(|conn| drift::get_drift_scores(conn, org_id, repo_id))
    }

    fn query_rules(&self, org_id: &str, query: &RuleQuery) -> Result<Vec<Rule>, StoreError> {
        self.db.with_reader(|conn| rules::query_rules(conn, org_id, query))
    }

    fn get_rule(&self, org_id: &str, rule_id: &str) -> Result<Option<Rule>, StoreError> {
        self.db.with_reader(|conn| rules::get_rule(conn, org_id, rule_id))
    }

    fn upsert_rule(&self, rule: &Rule) -> Result<(), StoreError> {
        self.db.with_writer(|conn| rules::upsert_rule(conn, rule))
    }

    fn delete_rule(&self, org_id: &str, rule_id: &str) -> Result<bool, StoreError> {
        self.db.with_writer(|conn| rules::delete_rule(conn, org_id, rule_id))
    }

    fn get_pattern_by_hash(
        &self,
        org_id: &str,
        repo_id: &str,
        hash: &str,
    ) -> Result<Option<Pattern>, StoreError> {
        self.db
            .with_reader(|conn| patterns::get_pattern_by_hash(conn, org_id, repo_id, hash))
    }

    fn update_pattern_status(
        &self,
        org_id: &str,
        pattern_id: &str,
        status: PatternStatus,
    ) -> Result<(), StoreError> {
        let updated = self
            .db
            .with_writer(|conn| patterns::update_pattern_status(conn, org_id, pattern_id, status))?;
        if updated == 0 {
            return Err(StoreError::not_found("pattern", pattern_id));
        }
        Ok(())
    }

    fn upsert_impact_report(&self, report: &ImpactReportDoc) -> Result<(), StoreError> {
        self.db
            .with_writer(|conn| impact_reports::upsert_impact_report(conn, report))
    }

    fn get_impact_report(
        &self,
        org_id: &str,
        rule_id: &str,
    ) -> Result<Option<ImpactReportDoc>, StoreError> {
        self.db
            .with_reader(|conn| impact_reports::get_impact_report(conn, org_id, rule_id))
    }

    fn append_ledger(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.db.with_writer(|conn| ledger::append(conn, entry))
    }

    fn query_ledger_timeline(
        &self,
        org_id: &str,
        repo_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<LedgerPage, StoreError> {
        let after = match cursor {
            Some(raw) => Some(PaginationCursor::decode(raw).ok_or_else(|| StoreError::InvalidCursor {
                cursor: raw.to_string(),
            })?),
            None => None,
        };
        let limit = limit.clamp(1, MAX_LEDGER_PAGE);

        let (entries, has_more) = self
            .db
            .with_reader(|conn| ledger::timeline_page(conn, org_id, repo_id, after.as_ref(), limit))?;

        let next_cursor = if has_more {
            entries.last().map(|e| ledger::cursor_after(e).encode())
        } else {
            None
        };
        Ok(LedgerPage {
            entries,
            has_more,
            next_cursor,
        })
    }

    fn query_ledger_summaries(
        &self,
        org_id: &str,
        repo_id: &str,
    ) -> Result<Vec<LedgerSummary>, StoreError> {
        self.db.with_reader(|conn| ledger::summaries(conn, org_id, repo_id))
    }
}

impl ReviewStore for SqliteStore {
    fn get_review_config(&self, org_id: &str, repo_id: &str) -> Result<Option<ReviewConfig>, StoreError> {
        self.db
            .with_reader(|conn| review_configs::get(conn, org_id, repo_id))
    }

    fn put_review_config(
        &self,
        org_id: &str,
        repo_id: &str,
        config: &ReviewConfig,
    ) -> Result<(), StoreError> {
        self.db
            .with_writer(|conn| review_configs::put(conn, org_id, repo_id, config))
    }

    fn save_review(&self, review: &ReviewRecord) -> Result<(), StoreError> {
        self.db.with_writer(|conn| reviews::save(conn, review))
    }

    fn get_review(&self, org_id: &str, review_id: &str) -> Result<Option<ReviewRecord>, StoreError> {
        self.db.with_reader(|conn| reviews::get(conn, org_id, review_id))
    }
}

impl WorkflowStore for SqliteStore {
    fn save_workflow(&self, record: &WorkflowRecord) -> Result<(), StoreError> {
        self.db.with_writer(|conn| workflows::save(conn, record))
    }

    fn load_workflow(&self, id: &str) -> Result<Option<WorkflowRecord>, StoreError> {
        self.db.with_reader(|conn| workflows::load(conn, id))
    }

    fn list_incomplete_workflows(&self) -> Result<Vec<WorkflowRecord>, StoreError> {
        self.db.with_reader(workflows::list_incomplete)
    }
}
