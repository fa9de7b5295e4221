//! Stable error codes and the error taxonomy shared by every subsystem.

use serde::{Deserialize, Serialize};

/// Taxonomy used by orchestrators and API handlers to decide what to do
/// with an error: reject, report missing, retry, or surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Invalid threshold, malformed request. Rejected synchronously.
    Configuration,
    /// Entity, rule, pattern or review absent.
    NotFound,
    /// Store/matcher/host unavailable, timeouts. Retried with bounded attempts.
    Transient,
    /// Generated output did not match the target schema. Never auto-corrected.
    SchemaValidation,
    /// A single check failed; other checks are unaffected.
    PartialCheck,
    /// State transition not allowed (e.g. re-promoting a pattern).
    Conflict,
    /// Cooperative cancellation was requested.
    Cancelled,
    /// Anything else.
    Internal,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::NotFound => "not_found",
            Self::Transient => "transient",
            Self::SchemaValidation => "schema_validation",
            Self::PartialCheck => "partial_check",
            Self::Conflict => "conflict",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every error enum implements this to expose a structured code and class.
pub trait VigilErrorCode {
    /// Returns the stable error code string (e.g., "STORE_UNAVAILABLE").
    fn error_code(&self) -> &'static str;

    /// Returns the taxonomy class of this error.
    fn class(&self) -> ErrorClass;

    /// Whether an orchestrator may retry the failed step.
    fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
pub const STORE_ERROR: &str = "STORE_ERROR";
pub const INVALID_CURSOR: &str = "INVALID_CURSOR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const CONFLICT: &str = "CONFLICT";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const MATCHER_TIMEOUT: &str = "MATCHER_TIMEOUT";
pub const MATCHER_ERROR: &str = "MATCHER_ERROR";
pub const INVALID_QUERY: &str = "INVALID_QUERY";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";
pub const SCHEMA_VALIDATION: &str = "SCHEMA_VALIDATION";
pub const GENERATION_ERROR: &str = "GENERATION_ERROR";
pub const GIT_HOST_ERROR: &str = "GIT_HOST_ERROR";
pub const CHECK_FAILED: &str = "CHECK_FAILED";
pub const RULE_ERROR: &str = "RULE_ERROR";
pub const STEP_TIMEOUT: &str = "STEP_TIMEOUT";
pub const HEARTBEAT_TIMEOUT: &str = "HEARTBEAT_TIMEOUT";
pub const WORKFLOW_ERROR: &str = "WORKFLOW_ERROR";
pub const CANCELLED: &str = "CANCELLED";
