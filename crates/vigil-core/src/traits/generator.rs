//! Structured output generation (e.g. an LLM with a JSON schema).

use crate::errors::GenerationError;

pub trait StructuredGenerator: Send + Sync {
    /// Produce a JSON value intended to match `schema`. The result is
    /// untrusted; callers validate it.
    fn generate(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError>;
}
