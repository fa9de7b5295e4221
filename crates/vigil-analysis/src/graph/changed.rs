//! Map a change set onto the indexed entities it touches.

use vigil_core::errors::StoreError;
use vigil_core::traits::GraphStore;
use vigil_core::types::{ChangeSet, Entity, EntityKind, FxHashSet};

/// Entities whose line span overlaps an added or removed line.
///
/// Removed files contribute nothing. Whole-file entities are skipped since
/// they overlap every change in their file.
pub fn resolve_changed_entities(
    store: &dyn GraphStore,
    org_id: &str,
    repo_id: &str,
    changes: &ChangeSet,
) -> Result<Vec<Entity>, StoreError> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();

    for file in changes.live_files() {
        if file.added_lines.is_empty() && file.removed_lines.is_empty() {
            continue;
        }
        for entity in store.get_entities_in_file(org_id, repo_id, &file.path)? {
            if entity.kind == EntityKind::File {
                continue;
            }
            if file.touches_span(entity.start_line, entity.end_line) && seen.insert(entity.id.clone()) {
                out.push(entity);
            }
        }
    }

    tracing::debug!(files = changes.files.len(), entities = out.len(), "changed entities resolved");
    Ok(out)
}
