//! patterns table queries.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StoreError;
use vigil_core::types::{Pattern, PatternStatus};

use super::util::{from_json, parse_enum, parse_ts, sql_err, to_json, ts};

pub fn upsert_pattern(conn: &Connection, p: &Pattern) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO patterns
         (org_id, id, repo_id, hash, name, description, category, structural_query,
          languages, adherence_rate, match_count, status, detected_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            p.org_id,
            p.id,
            p.repo_id,
            p.hash,
            p.name,
            p.description,
            p.category,
            p.structural_query,
            to_json(&p.languages)?,
            p.adherence_rate,
            p.match_count,
            p.status.as_str(),
            ts(&p.detected_at),
        ],
    )
    .map_err(sql_err)?;
    Ok(())
}

pub fn get_pattern_by_hash(
    conn: &Connection,
    org_id: &str,
    repo_id: &str,
    hash: &str,
) -> Result<Option<Pattern>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, org_id, repo_id, hash, name, description, category, structural_query,
                    languages, adherence_rate, match_count, status, detected_at
             FROM patterns WHERE org_id = ?1 AND repo_id = ?2 AND hash = ?3",
        )
        .map_err(sql_err)?;
    let row = stmt
        .query_row(params![org_id, repo_id, hash], |row| {
            Ok((
                (
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ),
                (
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, f64>(9)?,
                    row.get::<_, u32>(10)?,
                    row.get::<_, String>(11)?,
                    row.get::<_, String>(12)?,
                ),
            ))
        })
        .optional()
        .map_err(sql_err)?;

    let Some(((id, org_id, repo_id, hash, name, description, category), rest)) = row else {
        return Ok(None);
    };
    let (structural_query, languages, adherence_rate, match_count, status, detected_at) = rest;
    Ok(Some(Pattern {
        id,
        org_id,
        repo_id,
        hash,
        name,
        description,
        category,
        structural_query,
        languages: from_json(&languages)?,
        adherence_rate,
        match_count,
        status: parse_enum("status", &status, PatternStatus::parse)?,
        detected_at: parse_ts(&detected_at)?,
    }))
}

/// Returns the number of rows updated (0 when the pattern is unknown).
pub fn update_pattern_status(
    conn: &Connection,
    org_id: &str,
    pattern_id: &str,
    status: PatternStatus,
) -> Result<usize, StoreError> {
    conn.execute(
        "UPDATE patterns SET status = ?3 WHERE org_id = ?1 AND id = ?2",
        params![org_id, pattern_id, status.as_str()],
    )
    .map_err(sql_err)
}
