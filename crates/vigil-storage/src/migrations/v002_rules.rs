//! V002: rule catalogue.
//!
//! Tables: rules, patterns, impact_reports.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS rules (
    org_id TEXT NOT NULL,
    id TEXT NOT NULL,
    repo_id TEXT,
    name TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    rule_type TEXT NOT NULL,
    structural_query TEXT NOT NULL,
    secondary_query TEXT,
    languages TEXT NOT NULL,
    path_glob TEXT,
    enforcement TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL,
    scope TEXT NOT NULL,
    options TEXT NOT NULL DEFAULT '{}',
    source_pattern_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (org_id, id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_rules_repo ON rules(org_id, repo_id, status);

CREATE TABLE IF NOT EXISTS patterns (
    org_id TEXT NOT NULL,
    id TEXT NOT NULL,
    repo_id TEXT NOT NULL,
    hash TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    structural_query TEXT NOT NULL,
    languages TEXT NOT NULL,
    adherence_rate REAL NOT NULL,
    match_count INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'detected',
    detected_at TEXT NOT NULL,
    PRIMARY KEY (org_id, id),
    UNIQUE (org_id, repo_id, hash)
) STRICT;

-- one row per rule; the latest simulation replaces the previous one
CREATE TABLE IF NOT EXISTS impact_reports (
    org_id TEXT NOT NULL,
    rule_id TEXT NOT NULL,
    repo_id TEXT NOT NULL,
    findings TEXT NOT NULL,
    match_count INTEGER NOT NULL,
    total_files_scanned INTEGER NOT NULL,
    violation_density REAL NOT NULL,
    simulated_at TEXT NOT NULL,
    PRIMARY KEY (org_id, rule_id)
) STRICT;
"#;
