//! Blast-radius traversal configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_BOUNDARY_KINDS, DEFAULT_BOUNDARY_KINDS, DEFAULT_MAX_DEPTH};
use crate::types::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BlastRadiusConfig {
    /// Maximum caller depth. Default: 5.
    pub max_depth: Option<u32>,
    /// Entity kinds reported as upstream boundaries. Default: api_route, webhook_handler.
    #[serde(default)]
    pub boundary_kinds: Vec<String>,
    /// Boundary kinds the contract check treats as public API.
    #[serde(default)]
    pub api_boundary_kinds: Vec<String>,
}

impl BlastRadiusConfig {
    pub fn effective_max_depth(&self) -> u32 {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    pub fn effective_boundary_kinds(&self) -> Vec<EntityKind> {
        kinds_or_default(&self.boundary_kinds, DEFAULT_BOUNDARY_KINDS)
    }

    pub fn effective_api_boundary_kinds(&self) -> Vec<EntityKind> {
        kinds_or_default(&self.api_boundary_kinds, DEFAULT_API_BOUNDARY_KINDS)
    }

    pub(crate) fn merge_from(&mut self, other: &Self) {
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if !other.boundary_kinds.is_empty() {
            self.boundary_kinds = other.boundary_kinds.clone();
        }
        if !other.api_boundary_kinds.is_empty() {
            self.api_boundary_kinds = other.api_boundary_kinds.clone();
        }
    }
}

fn kinds_or_default(configured: &[String], defaults: &[&str]) -> Vec<EntityKind> {
    if configured.is_empty() {
        defaults.iter().map(|k| EntityKind::parse(k)).collect()
    } else {
        configured.iter().map(|k| EntityKind::parse(k)).collect()
    }
}
