//! Generative rule drafting errors.

use super::error_code::{self, ErrorClass, VigilErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// The model output did not conform to the requested schema.
    #[error("Generated output failed schema validation after {attempts} attempt(s): {message}")]
    SchemaValidation { attempts: u32, message: String },

    #[error("Generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Generation backend unavailable: {message}")]
    Unavailable { message: String },

    #[error("Generation request rejected: {message}")]
    Rejected { message: String },
}

impl VigilErrorCode for GenerationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaValidation { .. } => error_code::SCHEMA_VALIDATION,
            _ => error_code::GENERATION_ERROR,
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::SchemaValidation { .. } => ErrorClass::SchemaValidation,
            Self::Timeout { .. } | Self::Unavailable { .. } => ErrorClass::Transient,
            Self::Rejected { .. } => ErrorClass::Configuration,
        }
    }
}
