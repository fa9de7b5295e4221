//! review_configs table queries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::config::ReviewConfig;
use vigil_core::errors::StoreError;

use super::util::{from_json, sql_err, to_json, ts};

pub fn get(conn: &Connection, org_id: &str, repo_id: &str) -> Result<Option<ReviewConfig>, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT config FROM review_configs WHERE org_id = ?1 AND repo_id = ?2",
            params![org_id, repo_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(sql_err)?;
    raw.map(|r| from_json(&r)).transpose()
}

pub fn put(conn: &Connection, org_id: &str, repo_id: &str, config: &ReviewConfig) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO review_configs (org_id, repo_id, config, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (org_id, repo_id) DO UPDATE SET
            config = excluded.config, updated_at = excluded.updated_at",
        params![org_id, repo_id, to_json(config)?, ts(&Utc::now())],
    )
    .map_err(sql_err)?;
    Ok(())
}
