//! Git hosting collaborator errors.

use super::error_code::{self, ErrorClass, VigilErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum GitHostError {
    #[error("Git host unavailable: {message}")]
    Unavailable { message: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Pull request not found: {what}")]
    NotFound { what: String },

    #[error("Git host rejected the request: {message}")]
    Rejected { message: String },
}

impl VigilErrorCode for GitHostError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            _ => error_code::GIT_HOST_ERROR,
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Unavailable { .. } | Self::RateLimited { .. } => ErrorClass::Transient,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Rejected { .. } => ErrorClass::Internal,
        }
    }
}
