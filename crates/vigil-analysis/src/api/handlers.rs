//! Request handlers. Each one validates its input, delegates, and returns a
//! serializable value or an [`ApiError`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vigil_core::config::{ReviewConfig, ReviewConfigPatch, ReviewDefaultsConfig};
use vigil_core::events::EventDispatcher;
use vigil_core::traits::{GraphStore, ReviewStore};
use vigil_core::types::{
    CheckKind, DriftCategory, LedgerPage, LedgerSummary, ReviewComment, ReviewRecord, Rule,
    RulePatch,
};

use super::error::ApiError;
use crate::insights::{self, DriftReport};
use crate::review::render_comments;
use crate::rules::{self, PromotionOverrides};

/// Collaborators shared by all handlers.
pub struct ApiContext<'a> {
    pub graph: &'a dyn GraphStore,
    pub reviews: &'a dyn ReviewStore,
    pub defaults: &'a ReviewDefaultsConfig,
    pub events: Option<&'a EventDispatcher>,
}

/// A stored review with its comments grouped by check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    pub review: ReviewRecord,
    pub comments: BTreeMap<CheckKind, Vec<ReviewComment>>,
}

/// `GET /repos/{id}/drift?category&limit`
pub fn get_drift(
    ctx: &ApiContext<'_>,
    org_id: &str,
    repo_id: &str,
    category: Option<&str>,
    limit: Option<usize>,
) -> Result<DriftReport, ApiError> {
    let category = match category.filter(|c| !c.is_empty()) {
        Some(raw) => Some(
            DriftCategory::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("unknown drift category: {raw}")))?,
        ),
        None => None,
    };
    Ok(insights::drift_report(ctx.graph, org_id, repo_id, category, limit)?)
}

/// `PATCH /repos/{id}/rules/{ruleId}`
pub fn patch_rule(
    ctx: &ApiContext<'_>,
    org_id: &str,
    repo_id: &str,
    rule_id: &str,
    body: serde_json::Value,
) -> Result<Rule, ApiError> {
    let patch: RulePatch = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid rule patch: {e}")))?;
    if patch.is_empty() {
        return Err(ApiError::bad_request("rule patch has no fields"));
    }
    Ok(rules::update_rule(ctx.graph, ctx.events, org_id, repo_id, rule_id, &patch)?)
}

/// `POST /repos/{id}/rules/from-pattern`
pub fn create_rule_from_pattern(
    ctx: &ApiContext<'_>,
    org_id: &str,
    repo_id: &str,
    pattern_hash: &str,
    body: Option<serde_json::Value>,
) -> Result<Rule, ApiError> {
    if pattern_hash.trim().is_empty() {
        return Err(ApiError::bad_request("pattern hash is required"));
    }
    let overrides: PromotionOverrides = match body {
        Some(v) if !v.is_null() => serde_json::from_value(v)
            .map_err(|e| ApiError::bad_request(format!("invalid promotion overrides: {e}")))?,
        _ => PromotionOverrides::default(),
    };
    Ok(rules::promote_pattern(ctx.graph, ctx.events, org_id, repo_id, pattern_hash, &overrides)?)
}

/// `DELETE /repos/{id}/rules/{ruleId}`
pub fn delete_rule(ctx: &ApiContext<'_>, org_id: &str, repo_id: &str, rule_id: &str) -> Result<(), ApiError> {
    Ok(rules::delete_rule(ctx.graph, ctx.events, org_id, repo_id, rule_id)?)
}

/// `GET /repos/{id}/reviews/{reviewId}`
///
/// The diff is not re-fetched here, so no comment is marked inline.
pub fn get_review(ctx: &ApiContext<'_>, org_id: &str, review_id: &str) -> Result<ReviewView, ApiError> {
    let review = ctx
        .reviews
        .get_review(org_id, review_id)?
        .ok_or_else(|| ApiError::not_found(format!("review not found: {review_id}")))?;
    let comments = render_comments(&review.findings, None);
    Ok(ReviewView { review, comments })
}

/// `GET /repos/{id}/review-config`
pub fn get_review_config(ctx: &ApiContext<'_>, org_id: &str, repo_id: &str) -> Result<ReviewConfig, ApiError> {
    Ok(ctx
        .reviews
        .get_review_config(org_id, repo_id)?
        .unwrap_or_else(|| ctx.defaults.to_review_config()))
}

/// `PATCH /repos/{id}/review-config`
pub fn patch_review_config(
    ctx: &ApiContext<'_>,
    org_id: &str,
    repo_id: &str,
    body: serde_json::Value,
) -> Result<ReviewConfig, ApiError> {
    let patch: ReviewConfigPatch = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid review config: {e}")))?;
    let mut config = get_review_config(ctx, org_id, repo_id)?;
    config.apply_patch(&patch)?;
    ctx.reviews.put_review_config(org_id, repo_id, &config)?;
    tracing::info!(org_id, repo_id, "review config updated");
    Ok(config)
}

/// `GET /repos/{id}/ledger?cursor&limit`
pub fn get_ledger(
    ctx: &ApiContext<'_>,
    org_id: &str,
    repo_id: &str,
    cursor: Option<&str>,
    limit: Option<usize>,
) -> Result<LedgerPage, ApiError> {
    if limit == Some(0) {
        return Err(ApiError::bad_request("limit must be >= 1"));
    }
    Ok(insights::ledger_timeline(ctx.graph, org_id, repo_id, cursor, limit)?)
}

/// `GET /repos/{id}/ledger/summary`
pub fn get_ledger_summaries(ctx: &ApiContext<'_>, org_id: &str, repo_id: &str) -> Result<Vec<LedgerSummary>, ApiError> {
    Ok(insights::ledger_summaries(ctx.graph, org_id, repo_id)?)
}
