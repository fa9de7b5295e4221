//! Persisted reviews and what gets posted to the git host.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::PullRequestRef;
use super::finding::{CheckFailure, CheckKind, ReviewFindings, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    Approve,
    Comment,
    RequestChanges,
}

impl ReviewVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Comment => "comment",
            Self::RequestChanges => "request_changes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(Self::Approve),
            "comment" => Some(Self::Comment),
            "request_changes" => Some(Self::RequestChanges),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    ChecksRun,
    Posted,
    Failed,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ChecksRun => "checks_run",
            Self::Posted => "posted",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "checks_run" => Some(Self::ChecksRun),
            "posted" => Some(Self::Posted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_id: String,
    pub org_id: String,
    pub repo_id: String,
    pub pull: PullRequestRef,
    pub verdict: Option<ReviewVerdict>,
    pub findings: ReviewFindings,
    #[serde(default)]
    pub check_errors: Vec<CheckFailure>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(review_id: &str, org_id: &str, repo_id: &str, pull: PullRequestRef) -> Self {
        let now = Utc::now();
        Self {
            review_id: review_id.to_string(),
            org_id: org_id.to_string(),
            repo_id: repo_id.to_string(),
            pull,
            verdict: None,
            findings: ReviewFindings::empty(),
            check_errors: Vec::new(),
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One rendered comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub check: CheckKind,
    pub file_path: String,
    pub line: u32,
    pub severity: Severity,
    pub body: String,
    /// Whether the line is part of the diff and can be annotated in place.
    pub inline: bool,
}

/// A complete review, posted at most once per idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub pull: PullRequestRef,
    pub review_id: String,
    pub idempotency_key: String,
    pub verdict: ReviewVerdict,
    pub body: String,
    /// Comments grouped by check. Every check is present, possibly empty.
    pub groups: BTreeMap<CheckKind, Vec<ReviewComment>>,
}

impl ReviewSubmission {
    pub fn comment_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn inline_comments(&self) -> impl Iterator<Item = &ReviewComment> {
        self.groups.values().flatten().filter(|c| c.inline)
    }
}
