//! Structural (AST-shaped) pattern matcher.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{CancellationToken, ProgressReporter};
use crate::errors::MatcherError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub workspace: PathBuf,
    pub query: String,
    pub language: String,
    /// Workspace-relative files to restrict the scan to. Empty = whole workspace.
    pub paths: Vec<String>,
}

impl ScanRequest {
    pub fn whole_workspace(workspace: PathBuf, query: &str, language: &str) -> Self {
        Self {
            workspace,
            query: query.to_string(),
            language: language.to_string(),
            paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Workspace-relative path.
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub matched_code: String,
}

/// Implementations must stop promptly once `cancel` fires (returning
/// `MatcherError::Cancelled`) and heartbeat at least once per file.
pub trait PatternMatcher: Send + Sync {
    fn scan(
        &self,
        request: &ScanRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Vec<MatchResult>, MatcherError>;

    /// Validate a query without running it.
    fn check_query(&self, query: &str, language: &str) -> Result<(), MatcherError>;
}
