//! Configuration errors.

use super::error_code::{self, ErrorClass, VigilErrorCode};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Unknown check: {0}")]
    UnknownCheck(String),
}

impl ConfigError {
    /// Shorthand for a field validation failure.
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::ValidationFailed {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl VigilErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }

    fn class(&self) -> ErrorClass {
        ErrorClass::Configuration
    }
}
