//! entities table queries.

use rusqlite::{params, Connection, OptionalExtension, Row};
use vigil_core::errors::StoreError;
use vigil_core::types::{Entity, EntityId, EntityKind};

use super::util::{collect_rows, sql_err};

pub(crate) const ENTITY_COLUMNS: &str =
    "e.id, e.org_id, e.repo_id, e.kind, e.name, e.file_path, e.start_line, e.end_line";

pub(crate) fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<Entity> {
    let kind: String = row.get(3)?;
    Ok(Entity {
        id: EntityId(row.get(0)?),
        org_id: row.get(1)?,
        repo_id: row.get(2)?,
        kind: EntityKind::parse(&kind),
        name: row.get(4)?,
        file_path: row.get(5)?,
        start_line: row.get(6)?,
        end_line: row.get(7)?,
    })
}

/// Insert or replace a batch of entities.
pub fn insert_entities(conn: &Connection, entities: &[Entity]) -> Result<usize, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO entities
             (id, org_id, repo_id, kind, name, file_path, start_line, end_line)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(sql_err)?;

    for e in entities {
        stmt.execute(params![
            e.id.as_str(),
            e.org_id,
            e.repo_id,
            e.kind.as_str(),
            e.name,
            e.file_path,
            e.start_line,
            e.end_line,
        ])
        .map_err(sql_err)?;
    }
    Ok(entities.len())
}

pub fn get_entity(conn: &Connection, org_id: &str, id: &EntityId) -> Result<Option<Entity>, StoreError> {
    let sql = format!("SELECT {ENTITY_COLUMNS} FROM entities e WHERE e.org_id = ?1 AND e.id = ?2");
    let mut stmt = conn.prepare_cached(&sql).map_err(sql_err)?;
    stmt.query_row(params![org_id, id.as_str()], entity_from_row)
        .optional()
        .map_err(sql_err)
}

/// Entities declared in one file, in source order.
pub fn get_entities_in_file(
    conn: &Connection,
    org_id: &str,
    repo_id: &str,
    file_path: &str,
) -> Result<Vec<Entity>, StoreError> {
    let sql = format!(
        "SELECT {ENTITY_COLUMNS} FROM entities e
         WHERE e.org_id = ?1 AND e.repo_id = ?2 AND e.file_path = ?3
         ORDER BY e.start_line, e.id"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params![org_id, repo_id, file_path], entity_from_row)
        .map_err(sql_err)?;
    collect_rows(rows, Ok)
}
