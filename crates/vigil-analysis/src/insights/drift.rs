//! Drift report: recent drift scores plus per-category counts.

use serde::{Deserialize, Serialize};
use vigil_core::constants::{DEFAULT_DRIFT_LIMIT, MAX_DRIFT_LIMIT};
use vigil_core::errors::StoreError;
use vigil_core::traits::GraphStore;
use vigil_core::types::{DriftCategory, DriftScore, DriftSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub drift_scores: Vec<DriftScore>,
    /// Counts over every score of the repository, before category filtering.
    pub summary: DriftSummary,
}

/// Newest scores first, optionally restricted to one category.
///
/// `limit` defaults to 50 and is capped at 500.
pub fn drift_report(
    store: &dyn GraphStore,
    org_id: &str,
    repo_id: &str,
    category: Option<DriftCategory>,
    limit: Option<usize>,
) -> Result<DriftReport, StoreError> {
    let limit = limit.unwrap_or(DEFAULT_DRIFT_LIMIT).clamp(1, MAX_DRIFT_LIMIT);
    let scores = store.get_drift_scores(org_id, repo_id)?;

    let mut summary = DriftSummary::default();
    for score in &scores {
        summary.record(score.category);
    }

    let mut drift_scores: Vec<DriftScore> = scores
        .into_iter()
        .filter(|s| category.map_or(true, |c| s.category == c))
        .collect();
    drift_scores.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
    drift_scores.truncate(limit);

    Ok(DriftReport {
        drift_scores,
        summary,
    })
}
