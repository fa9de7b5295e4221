//! Thin request handlers: parse and validate input, call the engine, map
//! errors to HTTP status codes. Transport is left to the embedding service.

pub mod error;
pub mod handlers;

pub use error::ApiError;
pub use handlers::{
    create_rule_from_pattern, delete_rule, get_drift, get_ledger, get_ledger_summaries,
    get_review, get_review_config, patch_review_config, patch_rule, ApiContext, ReviewView,
};
