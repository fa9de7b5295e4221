//! Promotion of a detected pattern into an active rule.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use vigil_core::errors::RuleError;
use vigil_core::events::{EventDispatcher, RulePromotedEvent};
use vigil_core::traits::GraphStore;
use vigil_core::types::{
    Enforcement, LedgerEntry, LedgerKind, PatternStatus, Rule, RuleScope, RuleStatus, RuleType,
};

/// Caller-supplied adjustments to the rule created from a pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromotionOverrides {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub rule_type: Option<RuleType>,
    pub enforcement: Option<Enforcement>,
    pub priority: Option<i32>,
    pub path_glob: Option<String>,
    pub scope: Option<RuleScope>,
}

/// Create an active rule from the pattern with `pattern_hash`.
///
/// The pattern's structural query and languages are copied verbatim and the
/// pattern moves to `promoted`. Promotion is one-way: a promoted or dismissed
/// pattern is a conflict. The rule id derives from the pattern, so retrying
/// after a failed status write upserts the same rule.
pub fn promote_pattern(
    store: &dyn GraphStore,
    events: Option<&EventDispatcher>,
    org_id: &str,
    repo_id: &str,
    pattern_hash: &str,
    overrides: &PromotionOverrides,
) -> Result<Rule, RuleError> {
    let pattern = store
        .get_pattern_by_hash(org_id, repo_id, pattern_hash)?
        .ok_or_else(|| RuleError::PatternNotFound {
            hash: pattern_hash.to_string(),
        })?;

    match pattern.status {
        PatternStatus::Promoted => {
            return Err(RuleError::AlreadyPromoted {
                pattern_id: pattern.id,
            })
        }
        PatternStatus::Dismissed => {
            return Err(RuleError::PatternDismissed {
                pattern_id: pattern.id,
            })
        }
        PatternStatus::Detected => {}
    }

    if let Some(glob) = overrides.path_glob.as_deref().filter(|g| !g.trim().is_empty()) {
        glob::Pattern::new(glob).map_err(|e| RuleError::InvalidPatch {
            field: "path_glob".to_string(),
            message: e.to_string(),
        })?;
    }

    let scope = overrides.scope.unwrap_or(RuleScope::Repo);
    let now = Utc::now();
    let rule = Rule {
        id: Rule::promoted_id(org_id, &pattern.id),
        org_id: org_id.to_string(),
        repo_id: match scope {
            RuleScope::Repo => Some(repo_id.to_string()),
            RuleScope::Org => None,
        },
        name: overrides.name.clone().unwrap_or_else(|| pattern.name.clone()),
        title: overrides.title.clone().unwrap_or_else(|| pattern.name.clone()),
        description: overrides
            .description
            .clone()
            .unwrap_or_else(|| pattern.description.clone()),
        rule_type: overrides.rule_type.unwrap_or(RuleType::Architecture),
        structural_query: pattern.structural_query.clone(),
        secondary_query: None,
        languages: pattern.languages.clone(),
        path_glob: overrides.path_glob.clone().filter(|g| !g.trim().is_empty()),
        enforcement: overrides.enforcement.unwrap_or(Enforcement::Warn),
        priority: overrides.priority.unwrap_or(0),
        status: RuleStatus::Active,
        scope,
        options: BTreeMap::from([
            ("category".to_string(), serde_json::json!(pattern.category)),
            ("adherence_rate".to_string(), serde_json::json!(pattern.adherence_rate)),
        ]),
        source_pattern_id: Some(pattern.id.clone()),
        created_at: now,
        updated_at: now,
    };

    store.upsert_rule(&rule)?;
    store.update_pattern_status(org_id, &pattern.id, PatternStatus::Promoted)?;
    store.append_ledger(&LedgerEntry::new(
        org_id,
        repo_id,
        LedgerKind::RulePromoted,
        &rule.id,
        format!("Pattern `{}` promoted to rule `{}`", pattern.name, rule.title),
    ))?;

    tracing::info!(rule_id = %rule.id, pattern_id = %pattern.id, "pattern promoted");
    if let Some(events) = events {
        events.emit_rule_promoted(&RulePromotedEvent {
            rule_id: rule.id.clone(),
            pattern_id: pattern.id,
        });
    }
    Ok(rule)
}
