//! Rule simulation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactMatch {
    pub file: String,
    pub line: u32,
    pub matched_code: String,
}

/// One report per rule; a newer simulation replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReportDoc {
    pub org_id: String,
    pub repo_id: String,
    pub rule_id: String,
    pub findings: Vec<ImpactMatch>,
    pub match_count: u32,
    pub total_files_scanned: u32,
    /// Matches per scanned file.
    pub violation_density: f64,
    pub simulated_at: DateTime<Utc>,
}

impl ImpactReportDoc {
    pub fn new(
        org_id: &str,
        repo_id: &str,
        rule_id: &str,
        findings: Vec<ImpactMatch>,
        total_files_scanned: u32,
    ) -> Self {
        let match_count = findings.len() as u32;
        Self {
            org_id: org_id.to_string(),
            repo_id: repo_id.to_string(),
            rule_id: rule_id.to_string(),
            findings,
            match_count,
            total_files_scanned,
            violation_density: match_count as f64 / total_files_scanned.max(1) as f64,
            simulated_at: Utc::now(),
        }
    }
}
