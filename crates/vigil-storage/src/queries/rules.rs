//! rules table queries.

use rusqlite::{params, Connection, OptionalExtension, Row};
use vigil_core::errors::StoreError;
use vigil_core::types::{Enforcement, Rule, RuleQuery, RuleScope, RuleStatus, RuleType};

use super::util::{collect_rows, from_json, parse_enum, parse_ts, sql_err, to_json, ts};

const RULE_COLUMNS: &str = "id, org_id, repo_id, name, title, description, rule_type,
    structural_query, secondary_query, languages, path_glob, enforcement, priority, status,
    scope, options, source_pattern_id, created_at, updated_at";

/// Raw column values; enum and JSON columns are decoded afterwards.
struct RuleRow {
    id: String,
    org_id: String,
    repo_id: Option<String>,
    name: String,
    title: String,
    description: String,
    rule_type: String,
    structural_query: String,
    secondary_query: Option<String>,
    languages: String,
    path_glob: Option<String>,
    enforcement: String,
    priority: i32,
    status: String,
    scope: String,
    options: String,
    source_pattern_id: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RuleRow> {
    Ok(RuleRow {
        id: row.get(0)?,
        org_id: row.get(1)?,
        repo_id: row.get(2)?,
        name: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        rule_type: row.get(6)?,
        structural_query: row.get(7)?,
        secondary_query: row.get(8)?,
        languages: row.get(9)?,
        path_glob: row.get(10)?,
        enforcement: row.get(11)?,
        priority: row.get(12)?,
        status: row.get(13)?,
        scope: row.get(14)?,
        options: row.get(15)?,
        source_pattern_id: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

fn decode(r: RuleRow) -> Result<Rule, StoreError> {
    Ok(Rule {
        id: r.id,
        org_id: r.org_id,
        repo_id: r.repo_id,
        name: r.name,
        title: r.title,
        description: r.description,
        rule_type: parse_enum("rule_type", &r.rule_type, RuleType::parse)?,
        structural_query: r.structural_query,
        secondary_query: r.secondary_query,
        languages: from_json(&r.languages)?,
        path_glob: r.path_glob,
        enforcement: parse_enum("enforcement", &r.enforcement, Enforcement::parse)?,
        priority: r.priority,
        status: parse_enum("status", &r.status, RuleStatus::parse)?,
        scope: parse_enum("scope", &r.scope, RuleScope::parse)?,
        options: from_json(&r.options)?,
        source_pattern_id: r.source_pattern_id,
        created_at: parse_ts(&r.created_at)?,
        updated_at: parse_ts(&r.updated_at)?,
    })
}

pub fn upsert_rule(conn: &Connection, rule: &Rule) -> Result<(), StoreError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "INSERT OR REPLACE INTO rules ({RULE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ))
        .map_err(sql_err)?;
    stmt.execute(params![
        rule.id,
        rule.org_id,
        rule.repo_id,
        rule.name,
        rule.title,
        rule.description,
        rule.rule_type.as_str(),
        rule.structural_query,
        rule.secondary_query,
        to_json(&rule.languages)?,
        rule.path_glob,
        rule.enforcement.as_str(),
        rule.priority,
        rule.status.as_str(),
        rule.scope.as_str(),
        to_json(&rule.options)?,
        rule.source_pattern_id,
        ts(&rule.created_at),
        ts(&rule.updated_at),
    ])
    .map_err(sql_err)?;
    Ok(())
}

pub fn get_rule(conn: &Connection, org_id: &str, rule_id: &str) -> Result<Option<Rule>, StoreError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {RULE_COLUMNS} FROM rules WHERE org_id = ?1 AND id = ?2"
        ))
        .map_err(sql_err)?;
    let row = stmt
        .query_row(params![org_id, rule_id], read_row)
        .optional()
        .map_err(sql_err)?;
    row.map(decode).transpose()
}

/// Rules of an organisation, highest priority first. With a repo filter,
/// repo-scoped rules of that repo plus org-scoped rules.
pub fn query_rules(conn: &Connection, org_id: &str, query: &RuleQuery) -> Result<Vec<Rule>, StoreError> {
    let rules = match &query.repo_id {
        Some(repo_id) => {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "SELECT {RULE_COLUMNS} FROM rules
                     WHERE org_id = ?1 AND (repo_id = ?2 OR repo_id IS NULL)
                     ORDER BY priority DESC, id"
                ))
                .map_err(sql_err)?;
            let rows = stmt.query_map(params![org_id, repo_id], read_row).map_err(sql_err)?;
            collect_rows(rows, decode)?
        }
        None => {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "SELECT {RULE_COLUMNS} FROM rules WHERE org_id = ?1 ORDER BY priority DESC, id"
                ))
                .map_err(sql_err)?;
            let rows = stmt.query_map(params![org_id], read_row).map_err(sql_err)?;
            collect_rows(rows, decode)?
        }
    };

    if query.statuses.is_empty() {
        return Ok(rules);
    }
    Ok(rules
        .into_iter()
        .filter(|r| query.statuses.contains(&r.status))
        .collect())
}

/// Returns whether a row was deleted.
pub fn delete_rule(conn: &Connection, org_id: &str, rule_id: &str) -> Result<bool, StoreError> {
    let n = conn
        .execute(
            "DELETE FROM rules WHERE org_id = ?1 AND id = ?2",
            params![org_id, rule_id],
        )
        .map_err(sql_err)?;
    Ok(n > 0)
}
