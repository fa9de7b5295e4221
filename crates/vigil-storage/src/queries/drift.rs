//! drift_scores table queries.

use rusqlite::{params, Connection};
use vigil_core::errors::StoreError;
use vigil_core::types::{DriftCategory, DriftScore, EntityId};

use super::util::{collect_rows, parse_enum, parse_ts, sql_err, ts};

pub fn upsert_drift_scores(conn: &Connection, scores: &[DriftScore]) -> Result<usize, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO drift_scores
             (org_id, entity_id, repo_id, entity_name, file_path, category, score, detected_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(sql_err)?;
    for s in scores {
        stmt.execute(params![
            s.org_id,
            s.entity_id.as_str(),
            s.repo_id,
            s.entity_name,
            s.file_path,
            s.category.as_str(),
            s.score,
            ts(&s.detected_at),
        ])
        .map_err(sql_err)?;
    }
    Ok(scores.len())
}

/// All scores of a repository, newest first.
pub fn get_drift_scores(conn: &Connection, org_id: &str, repo_id: &str) -> Result<Vec<DriftScore>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_id, org_id, repo_id, entity_name, file_path, category, score, detected_at
             FROM drift_scores WHERE org_id = ?1 AND repo_id = ?2
             ORDER BY detected_at DESC, entity_id",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![org_id, repo_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, String>(7)?,
            ))
        })
        .map_err(sql_err)?;
    collect_rows(rows, |(entity_id, org_id, repo_id, entity_name, file_path, category, score, at)| {
        Ok(DriftScore {
            entity_id: EntityId(entity_id),
            org_id,
            repo_id,
            entity_name,
            file_path,
            category: parse_enum("category", &category, DriftCategory::parse)?,
            score,
            detected_at: parse_ts(&at)?,
        })
    })
}
