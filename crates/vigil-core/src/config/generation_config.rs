//! Structured generation settings.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_GENERATION_MAX_ATTEMPTS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerationConfig {
    /// Attempts before a schema mismatch is surfaced. Default: 2.
    pub max_attempts: Option<u32>,
}

impl GenerationConfig {
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_GENERATION_MAX_ATTEMPTS)
    }

    pub(crate) fn merge_from(&mut self, other: &Self) {
        if other.max_attempts.is_some() {
            self.max_attempts = other.max_attempts;
        }
    }
}
