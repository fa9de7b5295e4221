//! Blast radius computation via level-by-level inverse BFS.
//!
//! Callers of every node in a frontier are fetched concurrently; results are
//! merged in frontier order so the first depth at which a node is reached is
//! its shortest distance, and no node is counted twice.

use rayon::prelude::*;
use vigil_core::config::BlastRadiusConfig;
use vigil_core::errors::StoreError;
use vigil_core::traits::GraphStore;
use vigil_core::types::{
    BlastRadiusSummary, BoundaryHit, Entity, EntityId, EntityKind, EntityRef, FxHashSet,
};

/// Compute one summary per changed entity, in input order.
///
/// Any store failure aborts the whole computation; partial results are never
/// returned.
pub fn compute_blast_radius(
    store: &dyn GraphStore,
    org_id: &str,
    changed: &[Entity],
    config: &BlastRadiusConfig,
) -> Result<Vec<BlastRadiusSummary>, StoreError> {
    let max_depth = config.effective_max_depth();
    let boundary_kinds = config.effective_boundary_kinds();

    changed
        .iter()
        .map(|entity| compute_entity_blast_radius(store, org_id, entity, max_depth, &boundary_kinds))
        .collect()
}

/// Blast radius of a single entity.
pub fn compute_entity_blast_radius(
    store: &dyn GraphStore,
    org_id: &str,
    entity: &Entity,
    max_depth: u32,
    boundary_kinds: &[EntityKind],
) -> Result<BlastRadiusSummary, StoreError> {
    let mut visited: FxHashSet<EntityId> = FxHashSet::default();
    visited.insert(entity.id.clone());

    let mut frontier = vec![entity.id.clone()];
    let mut boundaries = Vec::new();
    let mut depth = 0u32;
    let mut max_depth_reached = 0u32;

    while depth < max_depth && !frontier.is_empty() {
        depth += 1;

        let levels: Vec<Vec<Entity>> = frontier
            .par_iter()
            .map(|id| store.get_callers_of(org_id, id))
            .collect::<Result<_, _>>()?;

        let mut next = Vec::new();
        for caller in levels.into_iter().flatten() {
            if !visited.insert(caller.id.clone()) {
                continue;
            }
            if boundary_kinds.contains(&caller.kind) {
                boundaries.push(BoundaryHit {
                    entity: EntityRef::from(&caller),
                    depth,
                });
            }
            next.push(caller.id);
        }

        if !next.is_empty() {
            max_depth_reached = depth;
        }
        frontier = next;
    }

    let caller_count = (visited.len() - 1) as u32;
    tracing::debug!(
        entity = %entity.id,
        caller_count,
        boundaries = boundaries.len(),
        max_depth_reached,
        "blast radius computed"
    );

    Ok(BlastRadiusSummary {
        entity: EntityRef::from(entity),
        caller_count,
        upstream_boundaries: boundaries,
        max_depth_reached,
    })
}
