//! workflows table queries.

use rusqlite::{params, Connection, OptionalExtension, Row};
use vigil_core::errors::StoreError;
use vigil_core::types::{WorkflowKind, WorkflowRecord, TERMINAL_STATES};

use super::util::{collect_rows, from_json, parse_enum, parse_ts, sql_err, to_json, ts};

const COLUMNS: &str = "id, kind, org_id, state, attempts, input, checkpoint, last_error,
    heartbeat_at, created_at, updated_at";

struct WorkflowRow {
    id: String,
    kind: String,
    org_id: String,
    state: String,
    attempts: String,
    input: String,
    checkpoint: String,
    last_error: Option<String>,
    heartbeat_at: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<WorkflowRow> {
    Ok(WorkflowRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        org_id: row.get(2)?,
        state: row.get(3)?,
        attempts: row.get(4)?,
        input: row.get(5)?,
        checkpoint: row.get(6)?,
        last_error: row.get(7)?,
        heartbeat_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn decode(r: WorkflowRow) -> Result<WorkflowRecord, StoreError> {
    Ok(WorkflowRecord {
        id: r.id,
        kind: parse_enum("kind", &r.kind, WorkflowKind::parse)?,
        org_id: r.org_id,
        state: r.state,
        attempts: from_json(&r.attempts)?,
        input: from_json(&r.input)?,
        checkpoint: from_json(&r.checkpoint)?,
        last_error: r.last_error,
        heartbeat_at: r.heartbeat_at.as_deref().map(parse_ts).transpose()?,
        created_at: parse_ts(&r.created_at)?,
        updated_at: parse_ts(&r.updated_at)?,
    })
}

pub fn save(conn: &Connection, w: &WorkflowRecord) -> Result<(), StoreError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "INSERT OR REPLACE INTO workflows ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ))
        .map_err(sql_err)?;
    stmt.execute(params![
        w.id,
        w.kind.as_str(),
        w.org_id,
        w.state,
        to_json(&w.attempts)?,
        to_json(&w.input)?,
        to_json(&w.checkpoint)?,
        w.last_error,
        w.heartbeat_at.as_ref().map(ts),
        ts(&w.created_at),
        ts(&w.updated_at),
    ])
    .map_err(sql_err)?;
    Ok(())
}

pub fn load(conn: &Connection, id: &str) -> Result<Option<WorkflowRecord>, StoreError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM workflows WHERE id = ?1"))
        .map_err(sql_err)?;
    let row = stmt
        .query_row(params![id], read_row)
        .optional()
        .map_err(sql_err)?;
    row.map(decode).transpose()
}

/// Non-terminal records, oldest first.
pub fn list_incomplete(conn: &Connection) -> Result<Vec<WorkflowRecord>, StoreError> {
    let terminal = TERMINAL_STATES
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM workflows WHERE state NOT IN ({terminal})
             ORDER BY created_at, id"
        ))
        .map_err(sql_err)?;
    let rows = stmt.query_map([], read_row).map_err(sql_err)?;
    collect_rows(rows, decode)
}
