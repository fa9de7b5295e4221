//! V003: review results, settings, durable workflows, ledger.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS review_configs (
    org_id TEXT NOT NULL,
    repo_id TEXT NOT NULL,
    config TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (org_id, repo_id)
) STRICT;

CREATE TABLE IF NOT EXISTS reviews (
    org_id TEXT NOT NULL,
    review_id TEXT NOT NULL,
    repo_id TEXT NOT NULL,
    pull TEXT NOT NULL,
    verdict TEXT,
    findings TEXT NOT NULL,
    check_errors TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (org_id, review_id)
) STRICT;

CREATE TABLE IF NOT EXISTS workflows (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    org_id TEXT NOT NULL,
    state TEXT NOT NULL,
    attempts TEXT NOT NULL,
    input TEXT NOT NULL,
    checkpoint TEXT NOT NULL,
    last_error TEXT,
    heartbeat_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_workflows_state ON workflows(state, created_at);

CREATE TABLE IF NOT EXISTS ledger (
    org_id TEXT NOT NULL,
    id TEXT NOT NULL,
    repo_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    summary TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (org_id, id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_ledger_timeline ON ledger(org_id, repo_id, created_at DESC, id DESC);
"#;
