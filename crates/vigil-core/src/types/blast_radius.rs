//! Blast-radius summaries produced per changed entity.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind};

/// Lightweight reference to an entity, safe to carry across step boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub file_path: String,
    pub line: u32,
}

impl From<&Entity> for EntityRef {
    fn from(e: &Entity) -> Self {
        Self {
            id: e.id.clone(),
            kind: e.kind.clone(),
            name: e.name.clone(),
            file_path: e.file_path.clone(),
            line: e.start_line,
        }
    }
}

/// An externally reachable entity found upstream of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryHit {
    pub entity: EntityRef,
    /// Shortest hop count from the changed entity.
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastRadiusSummary {
    pub entity: EntityRef,
    /// Deduplicated transitive callers within the depth bound.
    pub caller_count: u32,
    /// Boundaries in BFS discovery order.
    pub upstream_boundaries: Vec<BoundaryHit>,
    pub max_depth_reached: u32,
}

impl BlastRadiusSummary {
    /// Nearest boundary (smallest depth, first discovered on ties).
    pub fn nearest_boundary(&self) -> Option<&BoundaryHit> {
        self.upstream_boundaries.iter().min_by_key(|b| b.depth)
    }
}
