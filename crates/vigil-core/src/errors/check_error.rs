//! Per-check failures. Always isolated to the failing check.

use super::error_code::{self, ErrorClass, VigilErrorCode};
use super::{MatcherError, StoreError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Matcher error: {0}")]
    Matcher(#[from] MatcherError),

    #[error("Check panicked: {0}")]
    Panicked(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl VigilErrorCode for CheckError {
    fn error_code(&self) -> &'static str {
        error_code::CHECK_FAILED
    }

    fn class(&self) -> ErrorClass {
        ErrorClass::PartialCheck
    }
}
