//! Error handling for Vigil.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod check_error;
pub mod config_error;
pub mod error_code;
pub mod generation_error;
pub mod git_host_error;
pub mod matcher_error;
pub mod rule_error;
pub mod store_error;
pub mod workflow_error;

pub use check_error::CheckError;
pub use config_error::ConfigError;
pub use error_code::{ErrorClass, VigilErrorCode};
pub use generation_error::GenerationError;
pub use git_host_error::GitHostError;
pub use matcher_error::MatcherError;
pub use rule_error::RuleError;
pub use store_error::StoreError;
pub use workflow_error::WorkflowError;
