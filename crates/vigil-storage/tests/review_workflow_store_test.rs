//! ReviewStore and WorkflowStore over SQLite, plus on-disk behaviour.

use vigil_core::config::ReviewConfig;
use vigil_core::traits::{GraphStore, ReviewStore, WorkflowStore};
use vigil_core::types::*;
use vigil_storage::connection::pragmas::verify_wal_mode;
use vigil_storage::migrations;
use vigil_storage::SqliteStore;

fn pull() -> PullRequestRef {
    PullRequestRef {
        owner: "acme".into(),
        name: "shop".into(),
        number: 42,
        head_sha: "deadbeef".into(),
    }
}

#[test]
fn test_review_config_roundtrip_and_tenancy() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.get_review_config("org", "repo").unwrap().is_none());

    let mut config = ReviewConfig::default();
    config.impact_threshold = 9;
    config.checks_enabled.insert("env".into(), false);
    store.put_review_config("org", "repo", &config).unwrap();

    assert_eq!(store.get_review_config("org", "repo").unwrap(), Some(config));
    assert!(store.get_review_config("org-b", "repo").unwrap().is_none());
}

#[test]
fn test_review_record_roundtrip() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut review = ReviewRecord::new("rev-1", "org", "repo", pull());
    review.findings.set(
        CheckKind::Env,
        vec![Finding::Env(EnvFinding {
            file_path: "src/a.ts".into(),
            line: 4,
            variable: "STRIPE_KEY".into(),
            severity: Severity::Low,
            message: "undeclared".into(),
            suggestion: Some("add to .env.example".into()),
        })],
    );
    review.check_errors.push(CheckFailure {
        check: CheckKind::Pattern,
        code: "MATCHER_TIMEOUT".into(),
        message: "timed out".into(),
    });
    review.verdict = Some(ReviewVerdict::Comment);
    review.status = ReviewStatus::Posted;
    store.save_review(&review).unwrap();

    let got = store.get_review("org", "rev-1").unwrap().unwrap();
    assert_eq!(got, review);
    assert!(store.get_review("org-b", "rev-1").unwrap().is_none());
}

#[test]
fn test_incomplete_workflows_exclude_terminal_states() {
    let store = SqliteStore::open_in_memory().unwrap();
    let running = WorkflowRecord::new("wf-1", WorkflowKind::Review, "org", "diff_fetched", serde_json::json!({"x": 1}));
    let mut done = WorkflowRecord::new("wf-2", WorkflowKind::Simulation, "org", "queued", serde_json::json!({}));
    done.transition("persisted");
    let mut failed = WorkflowRecord::new("wf-3", WorkflowKind::Review, "org", "triggered", serde_json::json!({}));
    failed.transition("failed");
    for w in [&running, &done, &failed] {
        store.save_workflow(w).unwrap();
    }

    let incomplete = store.list_incomplete_workflows().unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0], running);
    assert_eq!(store.load_workflow("wf-2").unwrap().unwrap().state, "persisted");
    assert!(store.load_workflow("nope").unwrap().is_none());
}

#[test]
fn test_on_disk_database_uses_wal_and_reader_pool() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");
    {
        let store = SqliteStore::open(&path).unwrap();
        let e = Entity::new("org", "repo", EntityKind::ApiRoute, "GET /users", "src/routes.ts", 1, 5);
        store.insert_entities(&[e.clone()]).unwrap();
        // read goes through the pool and sees the committed write
        assert_eq!(store.get_entity("org", &e.id).unwrap(), Some(e));
        let wal = store
            .database()
            .with_writer(|conn| verify_wal_mode(conn))
            .unwrap();
        assert!(wal);
    }

    // reopening runs no migration twice
    let store = SqliteStore::open(&path).unwrap();
    let version = store
        .database()
        .with_reader(|conn| migrations::current_version(conn))
        .unwrap();
    assert_eq!(version, migrations::latest_version());
}
