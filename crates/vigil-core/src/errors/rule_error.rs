//! Rule drafting, update and promotion errors.

use super::error_code::{self, ErrorClass, VigilErrorCode};
use super::{GenerationError, MatcherError, StoreError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    #[error("Rule not found: {rule_id}")]
    NotFound { rule_id: String },

    #[error("Pattern not found: {hash}")]
    PatternNotFound { hash: String },

    #[error("Pattern {pattern_id} is already promoted")]
    AlreadyPromoted { pattern_id: String },

    #[error("Pattern {pattern_id} was dismissed and cannot be promoted")]
    PatternDismissed { pattern_id: String },

    #[error("Invalid drafted rule: {message}")]
    InvalidDraft { message: String },

    #[error("Invalid rule update for {field}: {message}")]
    InvalidPatch { field: String, message: String },

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Matcher error: {0}")]
    Matcher(#[from] MatcherError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl VigilErrorCode for RuleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::PatternNotFound { .. } => error_code::NOT_FOUND,
            Self::AlreadyPromoted { .. } | Self::PatternDismissed { .. } => error_code::CONFLICT,
            Self::InvalidDraft { .. } => error_code::SCHEMA_VALIDATION,
            Self::InvalidPatch { .. } => error_code::CONFIG_ERROR,
            Self::Generation(e) => e.error_code(),
            Self::Matcher(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } | Self::PatternNotFound { .. } => ErrorClass::NotFound,
            Self::AlreadyPromoted { .. } | Self::PatternDismissed { .. } => ErrorClass::Conflict,
            Self::InvalidDraft { .. } => ErrorClass::SchemaValidation,
            Self::InvalidPatch { .. } => ErrorClass::Configuration,
            Self::Generation(e) => e.class(),
            Self::Matcher(e) => e.class(),
            Self::Store(e) => e.class(),
        }
    }
}
