//! Drift classifications produced by the external drift detector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftCategory {
    Stable,
    Cosmetic,
    Refactor,
    IntentDrift,
}

impl DriftCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Cosmetic => "cosmetic",
            Self::Refactor => "refactor",
            Self::IntentDrift => "intent_drift",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stable" => Some(Self::Stable),
            "cosmetic" => Some(Self::Cosmetic),
            "refactor" => Some(Self::Refactor),
            "intent_drift" => Some(Self::IntentDrift),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftScore {
    pub entity_id: EntityId,
    pub org_id: String,
    pub repo_id: String,
    pub entity_name: String,
    pub file_path: String,
    pub category: DriftCategory,
    pub score: f64,
    pub detected_at: DateTime<Utc>,
}

/// Count of scores per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub stable: u32,
    pub cosmetic: u32,
    pub refactor: u32,
    pub intent_drift: u32,
}

impl DriftSummary {
    pub fn record(&mut self, category: DriftCategory) {
        match category {
            DriftCategory::Stable => self.stable += 1,
            DriftCategory::Cosmetic => self.cosmetic += 1,
            DriftCategory::Refactor => self.refactor += 1,
            DriftCategory::IntentDrift => self.intent_drift += 1,
        }
    }
}
