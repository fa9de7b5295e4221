//! Persistence of review settings and review results.

use crate::config::ReviewConfig;
use crate::errors::StoreError;
use crate::types::ReviewRecord;

pub trait ReviewStore: Send + Sync {
    /// `None` when the repository never stored settings.
    fn get_review_config(&self, org_id: &str, repo_id: &str) -> Result<Option<ReviewConfig>, StoreError>;

    fn put_review_config(
        &self,
        org_id: &str,
        repo_id: &str,
        config: &ReviewConfig,
    ) -> Result<(), StoreError>;

    /// Insert or replace by `(org_id, review_id)`.
    fn save_review(&self, review: &ReviewRecord) -> Result<(), StoreError>;

    fn get_review(&self, org_id: &str, review_id: &str) -> Result<Option<ReviewRecord>, StoreError>;
}
