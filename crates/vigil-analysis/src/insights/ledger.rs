//! Ledger timeline reads.

use vigil_core::constants::DEFAULT_LEDGER_PAGE_SIZE;
use vigil_core::errors::StoreError;
use vigil_core::traits::GraphStore;
use vigil_core::types::{LedgerPage, LedgerSummary};

/// One page of the timeline, newest first. Pass the previous page's
/// `next_cursor` to continue.
pub fn ledger_timeline(
    store: &dyn GraphStore,
    org_id: &str,
    repo_id: &str,
    cursor: Option<&str>,
    limit: Option<usize>,
) -> Result<LedgerPage, StoreError> {
    let limit = limit.unwrap_or(DEFAULT_LEDGER_PAGE_SIZE);
    store.query_ledger_timeline(org_id, repo_id, cursor.filter(|c| !c.is_empty()), limit)
}

/// Entry count and latest timestamp per ledger kind.
pub fn ledger_summaries(
    store: &dyn GraphStore,
    org_id: &str,
    repo_id: &str,
) -> Result<Vec<LedgerSummary>, StoreError> {
    store.query_ledger_summaries(org_id, repo_id)
}
