//! Schema migrations using PRAGMA user_version.

pub mod v001_graph;
pub mod v002_rules;
pub mod v003_reviews;

use rusqlite::Connection;
use vigil_core::errors::StoreError;

const MIGRATIONS: &[(&str, u32)] = &[
    (v001_graph::MIGRATION_SQL, 1),
    (v002_rules::MIGRATION_SQL, 2),
    (v003_reviews::MIGRATION_SQL, 3),
];

/// Run all pending migrations, each in its own transaction.
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current = current_version(conn).map_err(|e| StoreError::MigrationFailed {
        version: 0,
        message: e.to_string(),
    })?;

    for (sql, version) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        let failed = |e: rusqlite::Error| StoreError::MigrationFailed {
            version: *version,
            message: e.to_string(),
        };
        conn.execute_batch(&format!("BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;"))
            .map_err(|e| {
                let _ = conn.execute_batch("ROLLBACK;");
                failed(e)
            })?;
        tracing::info!(version = version, "applied migration");
    }

    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<u32, StoreError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StoreError::SqliteError {
            message: e.to_string(),
        })
}

/// Highest version this build knows.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|(_, v)| *v).unwrap_or(0)
}
