//! Partial rule updates with merge semantics.

use chrono::Utc;
use vigil_core::errors::RuleError;
use vigil_core::types::{Rule, RulePatch};

/// Apply `patch` to a copy of `rule`.
///
/// Absent fields are kept; `options` merges key by key with `null` removing a
/// key; an empty `path_glob` or `secondary_query` clears it. Status changes
/// only when the patch names a status. `updated_at` is refreshed.
pub fn apply_patch(rule: &Rule, patch: &RulePatch) -> Result<Rule, RuleError> {
    validate_patch(patch)?;

    let mut next = rule.clone();
    if let Some(name) = &patch.name {
        next.name = name.trim().to_string();
    }
    if let Some(title) = &patch.title {
        next.title = title.trim().to_string();
    }
    if let Some(description) = &patch.description {
        next.description = description.clone();
    }
    if let Some(rule_type) = patch.rule_type {
        next.rule_type = rule_type;
    }
    if let Some(query) = &patch.structural_query {
        next.structural_query = query.clone();
    }
    if let Some(secondary) = &patch.secondary_query {
        next.secondary_query = non_empty(secondary);
    }
    if let Some(languages) = &patch.languages {
        next.languages = languages.clone();
    }
    if let Some(glob) = &patch.path_glob {
        next.path_glob = non_empty(glob);
    }
    if let Some(enforcement) = patch.enforcement {
        next.enforcement = enforcement;
    }
    if let Some(priority) = patch.priority {
        next.priority = priority;
    }
    if let Some(status) = patch.status {
        next.status = status;
    }
    if let Some(options) = &patch.options {
        for (key, value) in options {
            if value.is_null() {
                next.options.remove(key);
            } else {
                next.options.insert(key.clone(), value.clone());
            }
        }
    }

    next.updated_at = Utc::now();
    Ok(next)
}

fn validate_patch(patch: &RulePatch) -> Result<(), RuleError> {
    let required = [
        ("name", patch.name.as_deref()),
        ("title", patch.title.as_deref()),
        ("structural_query", patch.structural_query.as_deref()),
    ];
    for (field, value) in required {
        if value.is_some_and(|v| v.trim().is_empty()) {
            return Err(invalid(field, "must not be empty"));
        }
    }
    if let Some(languages) = &patch.languages {
        if languages.iter().any(|l| l.trim().is_empty()) {
            return Err(invalid("languages", "must not contain empty names"));
        }
    }
    if let Some(glob) = patch.path_glob.as_deref().filter(|g| !g.trim().is_empty()) {
        glob::Pattern::new(glob).map_err(|e| invalid("path_glob", &e.to_string()))?;
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> RuleError {
    RuleError::InvalidPatch {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
