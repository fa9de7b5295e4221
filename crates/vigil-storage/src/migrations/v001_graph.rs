//! V001: code graph tables owned by the indexer.
//!
//! Tables: entities, edges, drift_scores.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    org_id TEXT NOT NULL,
    id TEXT NOT NULL,
    repo_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    PRIMARY KEY (org_id, id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_entities_file ON entities(org_id, repo_id, file_path);

-- seq preserves insertion order for caller/callee listings
CREATE TABLE IF NOT EXISTS edges (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    org_id TEXT NOT NULL,
    caller_id TEXT NOT NULL,
    callee_id TEXT NOT NULL,
    UNIQUE (org_id, caller_id, callee_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_edges_callee ON edges(org_id, callee_id, seq);
CREATE INDEX IF NOT EXISTS idx_edges_caller ON edges(org_id, caller_id, seq);

CREATE TABLE IF NOT EXISTS drift_scores (
    org_id TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    repo_id TEXT NOT NULL,
    entity_name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    category TEXT NOT NULL,
    score REAL NOT NULL,
    detected_at TEXT NOT NULL,
    PRIMARY KEY (org_id, entity_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_drift_scores_repo ON drift_scores(org_id, repo_id, detected_at);
"#;
