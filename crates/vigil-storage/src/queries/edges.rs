//! edges table queries.

use rusqlite::{params, Connection};
use vigil_core::errors::StoreError;
use vigil_core::types::{Entity, EntityId};

use super::entities::{entity_from_row, ENTITY_COLUMNS};
use super::util::{collect_rows, sql_err};

/// Insert caller→callee edges. Duplicates keep their original position.
pub fn insert_edges(
    conn: &Connection,
    org_id: &str,
    edges: &[(EntityId, EntityId)],
) -> Result<usize, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO edges (org_id, caller_id, callee_id) VALUES (?1, ?2, ?3)",
        )
        .map_err(sql_err)?;

    let mut inserted = 0;
    for (caller, callee) in edges {
        inserted += stmt
            .execute(params![org_id, caller.as_str(), callee.as_str()])
            .map_err(sql_err)?;
    }
    Ok(inserted)
}

/// Direct callers of `id`, in edge insertion order. Edges whose caller
/// entity is unknown to the organisation are skipped.
pub fn get_callers(conn: &Connection, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
    let sql = format!(
        "SELECT {ENTITY_COLUMNS} FROM edges g
         JOIN entities e ON e.org_id = g.org_id AND e.id = g.caller_id
         WHERE g.org_id = ?1 AND g.callee_id = ?2
         ORDER BY g.seq"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params![org_id, id.as_str()], entity_from_row)
        .map_err(sql_err)?;
    collect_rows(rows, Ok)
}

/// Direct callees of `id`, in edge insertion order.
pub fn get_callees(conn: &Connection, org_id: &str, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
    let sql = format!(
        "SELECT {ENTITY_COLUMNS} FROM edges g
         JOIN entities e ON e.org_id = g.org_id AND e.id = g.callee_id
         WHERE g.org_id = ?1 AND g.caller_id = ?2
         ORDER BY g.seq"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params![org_id, id.as_str()], entity_from_row)
        .map_err(sql_err)?;
    collect_rows(rows, Ok)
}
