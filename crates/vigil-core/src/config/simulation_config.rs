//! Rule simulation settings.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_EXCLUDED_DIRS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Directory names skipped when counting workspace files.
    /// Empty means the built-in list (VCS metadata and build output).
    #[serde(default)]
    pub excluded_dirs: Vec<String>,
}

impl SimulationConfig {
    pub fn effective_excluded_dirs(&self) -> Vec<String> {
        if self.excluded_dirs.is_empty() {
            DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect()
        } else {
            self.excluded_dirs.clone()
        }
    }

    pub(crate) fn merge_from(&mut self, other: &Self) {
        if !other.excluded_dirs.is_empty() {
            self.excluded_dirs = other.excluded_dirs.clone();
        }
    }
}
