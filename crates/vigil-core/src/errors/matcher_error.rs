//! Structural pattern matcher errors.

use super::error_code::{self, ErrorClass, VigilErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum MatcherError {
    #[error("Matcher timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Matcher I/O error: {message}")]
    Io { message: String },

    #[error("Invalid {language} query: {message}")]
    InvalidQuery { language: String, message: String },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Matcher cancelled")]
    Cancelled,
}

impl VigilErrorCode for MatcherError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::MATCHER_TIMEOUT,
            Self::Io { .. } => error_code::MATCHER_ERROR,
            Self::InvalidQuery { .. } => error_code::INVALID_QUERY,
            Self::UnsupportedLanguage(_) => error_code::UNSUPPORTED_LANGUAGE,
            Self::Cancelled => error_code::CANCELLED,
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Timeout { .. } | Self::Io { .. } => ErrorClass::Transient,
            Self::InvalidQuery { .. } | Self::UnsupportedLanguage(_) => ErrorClass::Configuration,
            Self::Cancelled => ErrorClass::Cancelled,
        }
    }
}
