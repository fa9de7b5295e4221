//! Persisting rule changes together with their ledger entries.

use vigil_core::errors::RuleError;
use vigil_core::events::{EventDispatcher, RuleDeletedEvent, RuleUpdatedEvent};
use vigil_core::traits::GraphStore;
use vigil_core::types::{LedgerEntry, LedgerKind, Rule, RulePatch};

use super::merge::apply_patch;

/// Store a newly drafted rule and record it on the repository timeline.
pub fn create_rule(store: &dyn GraphStore, repo_id: &str, rule: &Rule) -> Result<(), RuleError> {
    store.upsert_rule(rule)?;
    store.append_ledger(&LedgerEntry::new(
        &rule.org_id,
        repo_id,
        LedgerKind::RuleCreated,
        &rule.id,
        format!("Rule `{}` created as {}", rule.title, rule.status),
    ))?;
    tracing::info!(rule_id = %rule.id, status = %rule.status, "rule created");
    Ok(())
}

/// Load `rule_id` as seen from `repo_id`: org-scoped rules are visible from
/// every repository, repo-scoped ones only from their own.
fn load_in_repo(store: &dyn GraphStore, org_id: &str, repo_id: &str, rule_id: &str) -> Result<Rule, RuleError> {
    store
        .get_rule(org_id, rule_id)?
        .filter(|rule| rule.repo_id.as_deref().map_or(true, |owner| owner == repo_id))
        .ok_or_else(|| RuleError::NotFound {
            rule_id: rule_id.to_string(),
        })
}

/// Load, patch and store a rule.
pub fn update_rule(
    store: &dyn GraphStore,
    events: Option<&EventDispatcher>,
    org_id: &str,
    repo_id: &str,
    rule_id: &str,
    patch: &RulePatch,
) -> Result<Rule, RuleError> {
    let current = load_in_repo(store, org_id, repo_id, rule_id)?;
    let next = apply_patch(&current, patch)?;
    store.upsert_rule(&next)?;
    store.append_ledger(&LedgerEntry::new(
        org_id,
        repo_id,
        LedgerKind::RuleUpdated,
        rule_id,
        format!("Rule `{}` updated", next.title),
    ))?;

    tracing::info!(rule_id, "rule updated");
    if let Some(events) = events {
        events.emit_rule_updated(&RuleUpdatedEvent {
            rule_id: rule_id.to_string(),
        });
    }
    Ok(next)
}

/// Delete a rule. Missing rules are reported, not ignored.
pub fn delete_rule(
    store: &dyn GraphStore,
    events: Option<&EventDispatcher>,
    org_id: &str,
    repo_id: &str,
    rule_id: &str,
) -> Result<(), RuleError> {
    let rule = load_in_repo(store, org_id, repo_id, rule_id)?;
    if !store.delete_rule(org_id, rule_id)? {
        return Err(RuleError::NotFound {
            rule_id: rule_id.to_string(),
        });
    }
    store.append_ledger(&LedgerEntry::new(
        org_id,
        repo_id,
        LedgerKind::RuleDeleted,
        rule_id,
        format!("Rule `{}` deleted", rule.title),
    ))?;

    tracing::info!(rule_id, "rule deleted");
    if let Some(events) = events {
        events.emit_rule_deleted(&RuleDeletedEvent {
            rule_id: rule_id.to_string(),
        });
    }
    Ok(())
}
