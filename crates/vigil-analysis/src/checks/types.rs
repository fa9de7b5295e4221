//! Check trait and the read-only context every check receives.

use std::path::Path;

use vigil_core::config::ReviewConfig;
use vigil_core::errors::CheckError;
use vigil_core::traits::{CancellationToken, GraphStore, PatternMatcher};
use vigil_core::types::{
    BlastRadiusSummary, ChangeSet, ChangedFile, CheckKind, DiffLine, Entity, EntityKind, Finding,
    Rule,
};

/// Everything a check may look at. Checks never write.
pub struct CheckContext<'a> {
    pub org_id: &'a str,
    pub repo_id: &'a str,
    pub entities: &'a [Entity],
    pub summaries: &'a [BlastRadiusSummary],
    pub config: &'a ReviewConfig,
    pub changes: &'a ChangeSet,
    pub store: &'a dyn GraphStore,
    /// Active and promoted rules covering this repository.
    pub rules: &'a [Rule],
    pub matcher: Option<&'a dyn PatternMatcher>,
    /// Checked-out head of the pull request, when available.
    pub workspace: Option<&'a Path>,
    pub api_boundary_kinds: &'a [EntityKind],
    pub cancel: &'a CancellationToken,
}

impl<'a> CheckContext<'a> {
    pub fn changed_file(&self, path: &str) -> Option<&'a ChangedFile> {
        self.changes.file(path)
    }

    /// Added lines of the change that fall inside `entity`.
    pub fn added_lines_of(&self, entity: &Entity) -> Vec<&'a DiffLine> {
        match self.changed_file(&entity.file_path) {
            Some(file) => file.added_in_span(entity.start_line, entity.end_line).collect(),
            None => Vec::new(),
        }
    }

    /// The changed entity a summary refers to.
    pub fn entity(&self, summary: &BlastRadiusSummary) -> Option<&'a Entity> {
        self.entities.iter().find(|e| e.id == summary.entity.id)
    }
}

/// A single review check.
///
/// Implementations are pure functions of the context: running the same check
/// twice over the same context yields the same findings.
pub trait Check: Send + Sync {
    fn kind(&self) -> CheckKind;

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError>;
}
