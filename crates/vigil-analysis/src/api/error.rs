//! Error responses of the API handlers.

use serde::Serialize;
use vigil_core::errors::{
    ConfigError, ErrorClass, GenerationError, RuleError, StoreError, VigilErrorCode, WorkflowError,
};

/// An error ready to be written as a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: 404,
            code: vigil_core::errors::error_code::NOT_FOUND.to_string(),
            message: message.into(),
        }
    }

    fn from_coded<E: VigilErrorCode + std::fmt::Display>(e: &E) -> Self {
        Self {
            status: status_for(e.class()),
            code: e.error_code().to_string(),
            message: e.to_string(),
        }
    }
}

/// HTTP status for an error class.
pub fn status_for(class: ErrorClass) -> u16 {
    match class {
        ErrorClass::Configuration | ErrorClass::SchemaValidation => 400,
        ErrorClass::NotFound => 404,
        ErrorClass::Conflict => 409,
        ErrorClass::Transient => 503,
        ErrorClass::PartialCheck | ErrorClass::Cancelled | ErrorClass::Internal => 500,
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::from_coded(&e)
    }
}

impl From<RuleError> for ApiError {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::Store(inner) => inner.into(),
            other => Self::from_coded(&other),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        Self::from_coded(&e)
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        Self::from_coded(&e)
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Store(inner) => inner.into(),
            WorkflowError::Rule(inner) => inner.into(),
            other => Self::from_coded(&other),
        }
    }
}
