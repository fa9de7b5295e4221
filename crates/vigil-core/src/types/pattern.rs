//! Detected recurring structural idioms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternStatus {
    Detected,
    Promoted,
    Dismissed,
}

impl PatternStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Promoted => "promoted",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "detected" => Some(Self::Detected),
            "promoted" => Some(Self::Promoted),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub org_id: String,
    pub repo_id: String,
    /// Content hash of the normalised structural query.
    pub hash: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub structural_query: String,
    pub languages: Vec<String>,
    /// Fraction of matches that follow the idiom, in `[0, 1]`.
    pub adherence_rate: f64,
    pub match_count: u32,
    pub status: PatternStatus,
    pub detected_at: DateTime<Utc>,
}
