//! Git hosting provider.

use crate::errors::GitHostError;
use crate::types::{ChangeSet, PullRequestRef, ReviewSubmission};

/// Posting is keyed by an idempotency key: a repeated post with the same key
/// must not produce a second review on the host.
pub trait GitHost: Send + Sync {
    fn fetch_diff(&self, pull: &PullRequestRef) -> Result<ChangeSet, GitHostError>;

    fn post_review(&self, submission: &ReviewSubmission) -> Result<(), GitHostError>;

    fn post_failure(
        &self,
        pull: &PullRequestRef,
        review_id: &str,
        message: &str,
        idempotency_key: &str,
    ) -> Result<(), GitHostError>;
}
