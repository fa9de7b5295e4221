//! Ledger timeline keyset pagination and summaries.

use chrono::{Duration, Utc};
use vigil_core::errors::{ErrorClass, StoreError, VigilErrorCode};
use vigil_core::traits::GraphStore;
use vigil_core::types::{LedgerEntry, LedgerKind};
use vigil_storage::pagination::PaginationCursor;
use vigil_storage::SqliteStore;

fn seed(store: &SqliteStore, n: usize) {
    let base = Utc::now() - Duration::hours(1);
    for i in 0..n {
        let kind = if i % 3 == 0 { LedgerKind::RuleCreated } else { LedgerKind::ReviewPosted };
        let mut entry = LedgerEntry::new("org", "repo", kind, &format!("subject-{i}"), format!("entry {i}"));
        entry.id = format!("id-{i:03}");
        entry.created_at = base + Duration::seconds(i as i64);
        store.append_ledger(&entry).unwrap();
    }
}

#[test]
fn test_timeline_pages_cover_everything_newest_first() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, 7);

    let first = store.query_ledger_timeline("org", "repo", None, 3).unwrap();
    assert_eq!(first.entries.len(), 3);
    assert!(first.has_more);
    assert_eq!(first.entries[0].subject_id, "subject-6");

    let second = store
        .query_ledger_timeline("org", "repo", first.next_cursor.as_deref(), 3)
        .unwrap();
    let third = store
        .query_ledger_timeline("org", "repo", second.next_cursor.as_deref(), 3)
        .unwrap();
    assert_eq!(third.entries.len(), 1);
    assert!(!third.has_more);
    assert!(third.next_cursor.is_none());

    let ids: Vec<_> = first
        .entries
        .iter()
        .chain(&second.entries)
        .chain(&third.entries)
        .map(|e| e.subject_id.clone())
        .collect();
    let expected: Vec<_> = (0..7).rev().map(|i| format!("subject-{i}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_equal_timestamps_break_ties_by_id() {
    let store = SqliteStore::open_in_memory().unwrap();
    let at = Utc::now();
    for id in ["a", "b", "c"] {
        let mut e = LedgerEntry::new("org", "repo", LedgerKind::ReviewPosted, id, String::new());
        e.id = id.into();
        e.created_at = at;
        store.append_ledger(&e).unwrap();
    }
    let p1 = store.query_ledger_timeline("org", "repo", None, 2).unwrap();
    let p2 = store
        .query_ledger_timeline("org", "repo", p1.next_cursor.as_deref(), 2)
        .unwrap();
    let ids: Vec<_> = p1.entries.iter().chain(&p2.entries).map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
}

#[test]
fn test_invalid_cursor_is_rejected() {
    let store = SqliteStore::open_in_memory().unwrap();
    let err = store
        .query_ledger_timeline("org", "repo", Some("not a cursor!"), 10)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidCursor { ref cursor } if cursor == "not a cursor!"));
    assert_eq!(err.class(), ErrorClass::Configuration);
}

#[test]
fn test_cursor_encoding_roundtrip() {
    let cursor = PaginationCursor::new("2026-01-01T00:00:00.000000000Z", "id-9");
    assert_eq!(PaginationCursor::decode(&cursor.encode()), Some(cursor));
}

#[test]
fn test_summaries_per_kind() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, 7);
    let summaries = store.query_ledger_summaries("org", "repo").unwrap();
    let created = summaries.iter().find(|s| s.kind == LedgerKind::RuleCreated).unwrap();
    let posted = summaries.iter().find(|s| s.kind == LedgerKind::ReviewPosted).unwrap();
    assert_eq!(created.count, 3);
    assert_eq!(posted.count, 4);
    assert!(store.query_ledger_summaries("other", "repo").unwrap().is_empty());
}
