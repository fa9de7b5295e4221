//! Durable workflow limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HEARTBEAT_TIMEOUT_SECS, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_REVIEW_MAX_ATTEMPTS,
    DEFAULT_SIMULATION_MAX_ATTEMPTS, DEFAULT_STEP_TIMEOUT_SECS,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Attempts per review step. Default: 3.
    pub review_max_attempts: Option<u32>,
    /// Attempts per simulation step. Default: 2.
    pub simulation_max_attempts: Option<u32>,
    /// Wall-clock limit per step. Default: 900.
    pub step_timeout_secs: Option<u64>,
    /// Maximum silence between heartbeats. Default: 120.
    pub heartbeat_timeout_secs: Option<u64>,
    /// Base delay between attempts, multiplied by the attempt number. Default: 500.
    pub retry_backoff_ms: Option<u64>,
}

impl WorkflowConfig {
    pub fn effective_review_max_attempts(&self) -> u32 {
        self.review_max_attempts.unwrap_or(DEFAULT_REVIEW_MAX_ATTEMPTS)
    }

    pub fn effective_simulation_max_attempts(&self) -> u32 {
        self.simulation_max_attempts
            .unwrap_or(DEFAULT_SIMULATION_MAX_ATTEMPTS)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs.unwrap_or(DEFAULT_STEP_TIMEOUT_SECS))
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(
            self.heartbeat_timeout_secs
                .unwrap_or(DEFAULT_HEARTBEAT_TIMEOUT_SECS),
        )
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.unwrap_or(DEFAULT_RETRY_BACKOFF_MS))
    }

    pub(crate) fn merge_from(&mut self, other: &Self) {
        if other.review_max_attempts.is_some() {
            self.review_max_attempts = other.review_max_attempts;
        }
        if other.simulation_max_attempts.is_some() {
            self.simulation_max_attempts = other.simulation_max_attempts;
        }
        if other.step_timeout_secs.is_some() {
            self.step_timeout_secs = other.step_timeout_secs;
        }
        if other.heartbeat_timeout_secs.is_some() {
            self.heartbeat_timeout_secs = other.heartbeat_timeout_secs;
        }
        if other.retry_backoff_ms.is_some() {
            self.retry_backoff_ms = other.retry_backoff_ms;
        }
    }
}
