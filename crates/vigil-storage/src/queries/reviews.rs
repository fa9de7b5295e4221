//! reviews table queries.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StoreError;
use vigil_core::types::{ReviewRecord, ReviewStatus, ReviewVerdict};

use super::util::{from_json, parse_enum, parse_ts, sql_err, to_json, ts};

pub fn save(conn: &Connection, r: &ReviewRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO reviews
         (org_id, review_id, repo_id, pull, verdict, findings, check_errors, status,
          created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            r.org_id,
            r.review_id,
            r.repo_id,
            to_json(&r.pull)?,
            r.verdict.map(|v| v.as_str()),
            to_json(&r.findings)?,
            to_json(&r.check_errors)?,
            r.status.as_str(),
            ts(&r.created_at),
            ts(&r.updated_at),
        ],
    )
    .map_err(sql_err)?;
    Ok(())
}

pub fn get(conn: &Connection, org_id: &str, review_id: &str) -> Result<Option<ReviewRecord>, StoreError> {
    let row = conn
        .query_row(
            "SELECT org_id, review_id, repo_id, pull, verdict, findings, check_errors, status,
                    created_at, updated_at
             FROM reviews WHERE org_id = ?1 AND review_id = ?2",
            params![org_id, review_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            },
        )
        .optional()
        .map_err(sql_err)?;

    let Some((org_id, review_id, repo_id, pull, verdict, findings, errors, status, created, updated)) = row
    else {
        return Ok(None);
    };
    Ok(Some(ReviewRecord {
        review_id,
        org_id,
        repo_id,
        pull: from_json(&pull)?,
        verdict: verdict
            .map(|v| parse_enum("verdict", &v, ReviewVerdict::parse))
            .transpose()?,
        findings: from_json(&findings)?,
        check_errors: from_json(&errors)?,
        status: parse_enum("status", &status, ReviewStatus::parse)?,
        created_at: parse_ts(&created)?,
        updated_at: parse_ts(&updated)?,
    }))
}
