//! Durable storage for workflow progress.

use crate::errors::StoreError;
use crate::types::WorkflowRecord;

pub trait WorkflowStore: Send + Sync {
    /// Insert or replace by id.
    fn save_workflow(&self, record: &WorkflowRecord) -> Result<(), StoreError>;

    fn load_workflow(&self, id: &str) -> Result<Option<WorkflowRecord>, StoreError>;

    /// Records not in a terminal state, oldest first.
    fn list_incomplete_workflows(&self) -> Result<Vec<WorkflowRecord>, StoreError>;
}
