//! Graph/review/workflow store errors.

use super::error_code::{self, ErrorClass, VigilErrorCode};

/// Errors surfaced by any store implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store is temporarily unreachable (busy, locked, network down).
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A pagination cursor that this store did not produce.
    #[error("Invalid cursor: {cursor}")]
    InvalidCursor { cursor: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

impl VigilErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => error_code::STORE_UNAVAILABLE,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Conflict { .. } => error_code::CONFLICT,
            Self::InvalidCursor { .. } => error_code::INVALID_CURSOR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::SqliteError { .. } | Self::Serialization { .. } => error_code::STORE_ERROR,
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Unavailable { .. } => ErrorClass::Transient,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Conflict { .. } => ErrorClass::Conflict,
            Self::InvalidCursor { .. } => ErrorClass::Configuration,
            _ => ErrorClass::Internal,
        }
    }
}
