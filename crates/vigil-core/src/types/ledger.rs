//! Append-only per-repository timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    ReviewPosted,
    ReviewFailed,
    RuleCreated,
    RuleUpdated,
    RulePromoted,
    RuleSimulated,
    RuleDeleted,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewPosted => "review_posted",
            Self::ReviewFailed => "review_failed",
            Self::RuleCreated => "rule_created",
            Self::RuleUpdated => "rule_updated",
            Self::RulePromoted => "rule_promoted",
            Self::RuleSimulated => "rule_simulated",
            Self::RuleDeleted => "rule_deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "review_posted" => Some(Self::ReviewPosted),
            "review_failed" => Some(Self::ReviewFailed),
            "rule_created" => Some(Self::RuleCreated),
            "rule_updated" => Some(Self::RuleUpdated),
            "rule_promoted" => Some(Self::RulePromoted),
            "rule_simulated" => Some(Self::RuleSimulated),
            "rule_deleted" => Some(Self::RuleDeleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub org_id: String,
    pub repo_id: String,
    pub kind: LedgerKind,
    /// Review id, rule id or pattern id the entry is about.
    pub subject_id: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(org_id: &str, repo_id: &str, kind: LedgerKind, subject_id: &str, summary: String) -> Self {
        Self {
            id: uuid_like(org_id, subject_id, kind),
            org_id: org_id.to_string(),
            repo_id: repo_id.to_string(),
            kind,
            subject_id: subject_id.to_string(),
            summary,
            created_at: Utc::now(),
        }
    }
}

/// Time-ordered id: nanosecond timestamp plus a hash of the subject.
fn uuid_like(org_id: &str, subject_id: &str, kind: LedgerKind) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let key = format!("{org_id}\0{subject_id}\0{}\0{nanos}", kind.as_str());
    format!(
        "{nanos:020}-{:016x}",
        xxhash_rust::xxh3::xxh3_64(key.as_bytes())
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub kind: LedgerKind,
    pub count: u64,
    pub last_at: DateTime<Utc>,
}

/// One page of the timeline, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerPage {
    pub entries: Vec<LedgerEntry>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}
