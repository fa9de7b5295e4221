//! Read/write access to the persisted code graph and rule catalogue.

use crate::errors::StoreError;
use crate::types::{
    DriftScore, Entity, EntityId, ImpactReportDoc, LedgerEntry, LedgerPage, LedgerSummary,
    Pattern, PatternStatus, Rule, RuleQuery,
};

/// Graph store collaborator.
///
/// Every lookup is scoped by `org_id`; an id owned by another organisation
/// behaves exactly like a missing id. Callers and callees come back in edge
/// insertion order.
pub trait GraphStore: Send + Sync {
    fn get_entity(&self, org_id: &str, id: &EntityId) -> Result<Option<Entity>, StoreError>;

    fn get_entities_in_file(
        &self,
        org_id: &str,
        repo_id: &str,
        file_path: &str,
    ) -> Result<Vec<Entity>, StoreError>;

    fn get_callers_of(&self, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError>;

    fn get_callees_of(&self, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError>;

    fn get_drift_scores(&self, org_id: &str, repo_id: &str) -> Result<Vec<DriftScore>, StoreError>;

    fn query_rules(&self, org_id: &str, query: &RuleQuery) -> Result<Vec<Rule>, StoreError>;

    fn get_rule(&self, org_id: &str, rule_id: &str) -> Result<Option<Rule>, StoreError>;

    /// Insert or replace by `(org_id, id)`.
    fn upsert_rule(&self, rule: &Rule) -> Result<(), StoreError>;

    /// Returns whether a rule was removed.
    fn delete_rule(&self, org_id: &str, rule_id: &str) -> Result<bool, StoreError>;

    fn get_pattern_by_hash(
        &self,
        org_id: &str,
        repo_id: &str,
        hash: &str,
    ) -> Result<Option<Pattern>, StoreError>;

    fn update_pattern_status(
        &self,
        org_id: &str,
        pattern_id: &str,
        status: PatternStatus,
    ) -> Result<(), StoreError>;

    /// Insert or replace by `(org_id, rule_id)`.
    fn upsert_impact_report(&self, report: &ImpactReportDoc) -> Result<(), StoreError>;

    fn get_impact_report(
        &self,
        org_id: &str,
        rule_id: &str,
    ) -> Result<Option<ImpactReportDoc>, StoreError>;

    fn append_ledger(&self, entry: &LedgerEntry) -> Result<(), StoreError>;

    /// Newest first. `cursor` is the opaque `next_cursor` of a previous page.
    fn query_ledger_timeline(
        &self,
        org_id: &str,
        repo_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<LedgerPage, StoreError>;

    fn query_ledger_summaries(
        &self,
        org_id: &str,
        repo_id: &str,
    ) -> Result<Vec<LedgerSummary>, StoreError>;
}
