//! ledger table queries.

use rusqlite::{params, Connection, Row};
use vigil_core::errors::StoreError;
use vigil_core::types::{LedgerEntry, LedgerKind, LedgerSummary};

use super::util::{collect_rows, parse_enum, parse_ts, sql_err, ts};
use crate::pagination::PaginationCursor;

pub fn append(conn: &Connection, e: &LedgerEntry) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO ledger (org_id, id, repo_id, kind, subject_id, summary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            e.org_id,
            e.id,
            e.repo_id,
            e.kind.as_str(),
            e.subject_id,
            e.summary,
            ts(&e.created_at),
        ],
    )
    .map_err(sql_err)?;
    Ok(())
}

type LedgerRow = (String, String, String, String, String, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<LedgerRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn decode((id, org_id, repo_id, kind, subject_id, summary, created_at): LedgerRow) -> Result<LedgerEntry, StoreError> {
    Ok(LedgerEntry {
        id,
        org_id,
        repo_id,
        kind: parse_enum("kind", &kind, LedgerKind::parse)?,
        subject_id,
        summary,
        created_at: parse_ts(&created_at)?,
    })
}

/// One page of the timeline, newest first, plus whether more rows follow.
/// Fetches `limit + 1` rows to detect a next page.
pub fn timeline_page(
    conn: &Connection,
    org_id: &str,
    repo_id: &str,
    after: Option<&PaginationCursor>,
    limit: usize,
) -> Result<(Vec<LedgerEntry>, bool), StoreError> {
    let fetch = (limit + 1) as i64;
    let mut entries = match after {
        Some(cursor) => {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT id, org_id, repo_id, kind, subject_id, summary, created_at
                     FROM ledger
                     WHERE org_id = ?1 AND repo_id = ?2
                       AND (created_at < ?3 OR (created_at = ?3 AND id < ?4))
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?5",
                )
                .map_err(sql_err)?;
            let rows = stmt
                .query_map(
                    params![org_id, repo_id, cursor.last_sort_value, cursor.last_id, fetch],
                    read_row,
                )
                .map_err(sql_err)?;
            collect_rows(rows, decode)?
        }
        None => {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT id, org_id, repo_id, kind, subject_id, summary, created_at
                     FROM ledger
                     WHERE org_id = ?1 AND repo_id = ?2
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?3",
                )
                .map_err(sql_err)?;
            let rows = stmt
                .query_map(params![org_id, repo_id, fetch], read_row)
                .map_err(sql_err)?;
            collect_rows(rows, decode)?
        }
    };

    let has_more = entries.len() > limit;
    entries.truncate(limit);
    Ok((entries, has_more))
}

/// Cursor pointing after `entry`.
pub fn cursor_after(entry: &LedgerEntry) -> PaginationCursor {
    PaginationCursor::new(ts(&entry.created_at), entry.id.clone())
}

/// Count and latest timestamp per kind.
pub fn summaries(conn: &Connection, org_id: &str, repo_id: &str) -> Result<Vec<LedgerSummary>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT kind, COUNT(*), MAX(created_at) FROM ledger
             WHERE org_id = ?1 AND repo_id = ?2
             GROUP BY kind ORDER BY kind",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![org_id, repo_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(sql_err)?;
    collect_rows(rows, |(kind, count, last_at)| {
        Ok(LedgerSummary {
            kind: parse_enum("kind", &kind, LedgerKind::parse)?,
            count: count.max(0) as u64,
            last_at: parse_ts(&last_at)?,
        })
    })
}
