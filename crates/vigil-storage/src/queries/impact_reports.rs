//! impact_reports table queries.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StoreError;
use vigil_core::types::ImpactReportDoc;

use super::util::{from_json, parse_ts, sql_err, to_json, ts};

/// One row per `(org_id, rule_id)`; a newer report replaces the old one.
pub fn upsert_impact_report(conn: &Connection, r: &ImpactReportDoc) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO impact_reports
         (org_id, rule_id, repo_id, findings, match_count, total_files_scanned,
          violation_density, simulated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (org_id, rule_id) DO UPDATE SET
            repo_id = excluded.repo_id,
            findings = excluded.findings,
            match_count = excluded.match_count,
            total_files_scanned = excluded.total_files_scanned,
            violation_density = excluded.violation_density,
            simulated_at = excluded.simulated_at",
        params![
            r.org_id,
            r.rule_id,
            r.repo_id,
            to_json(&r.findings)?,
            r.match_count,
            r.total_files_scanned,
            r.violation_density,
            ts(&r.simulated_at),
        ],
    )
    .map_err(sql_err)?;
    Ok(())
}

pub fn get_impact_report(
    conn: &Connection,
    org_id: &str,
    rule_id: &str,
) -> Result<Option<ImpactReportDoc>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT org_id, repo_id, rule_id, findings, match_count, total_files_scanned,
                    violation_density, simulated_at
             FROM impact_reports WHERE org_id = ?1 AND rule_id = ?2",
        )
        .map_err(sql_err)?;
    let row = stmt
        .query_row(params![org_id, rule_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, String>(7)?,
            ))
        })
        .optional()
        .map_err(sql_err)?;

    row.map(
        |(org_id, repo_id, rule_id, findings, match_count, total_files_scanned, density, at)| {
            Ok(ImpactReportDoc {
                org_id,
                repo_id,
                rule_id,
                findings: from_json(&findings)?,
                match_count,
                total_files_scanned,
                violation_density: density,
                simulated_at: parse_ts(&at)?,
            })
        },
    )
    .transpose()
}
