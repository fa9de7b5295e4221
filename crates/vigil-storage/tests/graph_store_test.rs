//! GraphStore over SQLite: graph reads, tenancy, rules, patterns, reports.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use vigil_core::traits::GraphStore;
use vigil_core::types::*;
use vigil_storage::SqliteStore;

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

fn func(org: &str, name: &str, file: &str) -> Entity {
    Entity::new(org, "repo", EntityKind::Function, name, file, 1, 20)
}

fn rule(org: &str, id: &str, repo: Option<&str>, status: RuleStatus) -> Rule {
    let now = Utc::now();
    Rule {
        id: id.into(),
        org_id: org.into(),
        repo_id: repo.map(str::to_string),
        name: id.into(),
        title: format!("Rule {id}"),
        description: "desc".into(),
        rule_type: RuleType::Architecture,
        structural_query: "fetch($URL)".into(),
        secondary_query: None,
        languages: vec!["typescript".into()],
        path_glob: Some("src/**".into()),
        enforcement: Enforcement::Warn,
        priority: 1,
        status,
        scope: if repo.is_some() { RuleScope::Repo } else { RuleScope::Org },
        options: BTreeMap::from([("autofix".to_string(), serde_json::json!({"enabled": true}))]),
        source_pattern_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_callers_in_insertion_order() {
    let s = store();
    let target = func("org", "target", "src/t.ts");
    let callers: Vec<Entity> = ["zeta", "alpha", "mid"]
        .iter()
        .map(|n| func("org", n, "src/c.ts"))
        .collect();
    let mut all = vec![target.clone()];
    all.extend(callers.iter().cloned());
    s.insert_entities(&all).unwrap();
    let edges: Vec<_> = callers
        .iter()
        .map(|c| (c.id.clone(), target.id.clone()))
        .collect();
    s.insert_edges("org", &edges).unwrap();

    let got = s.get_callers_of("org", &target.id).unwrap();
    let names: Vec<_> = got.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);

    let callees = s.get_callees_of("org", &callers[0].id).unwrap();
    assert_eq!(callees.len(), 1);
    assert_eq!(callees[0].id, target.id);
}

#[test]
fn test_duplicate_edge_keeps_position() {
    let s = store();
    let t = func("org", "t", "a.ts");
    let a = func("org", "a", "a.ts");
    let b = func("org", "b", "a.ts");
    s.insert_entities(&[t.clone(), a.clone(), b.clone()]).unwrap();
    s.insert_edges("org", &[(a.id.clone(), t.id.clone()), (b.id.clone(), t.id.clone())])
        .unwrap();
    let inserted = s.insert_edges("org", &[(a.id.clone(), t.id.clone())]).unwrap();
    assert_eq!(inserted, 0);
    let names: Vec<_> = s
        .get_callers_of("org", &t.id)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_cross_tenant_lookups_return_nothing() {
    let s = store();
    let mine = func("org-a", "handler", "src/h.ts");
    let caller = func("org-a", "caller", "src/c.ts");
    s.insert_entities(&[mine.clone(), caller.clone()]).unwrap();
    s.insert_edges("org-a", &[(caller.id.clone(), mine.id.clone())]).unwrap();
    s.upsert_rule(&rule("org-a", "r1", Some("repo"), RuleStatus::Active)).unwrap();

    assert!(s.get_entity("org-b", &mine.id).unwrap().is_none());
    assert!(s.get_callers_of("org-b", &mine.id).unwrap().is_empty());
    assert!(s.get_entities_in_file("org-b", "repo", "src/h.ts").unwrap().is_empty());
    assert!(s.get_rule("org-b", "r1").unwrap().is_none());
    assert!(s.query_rules("org-b", &RuleQuery::default()).unwrap().is_empty());
    assert!(!s.delete_rule("org-b", "r1").unwrap());
    assert!(s.get_rule("org-a", "r1").unwrap().is_some());
}

#[test]
fn test_entities_in_file_source_order() {
    let s = store();
    let later = Entity::new("org", "repo", EntityKind::Function, "later", "src/x.ts", 40, 60);
    let first = Entity::new("org", "repo", EntityKind::Function, "first", "src/x.ts", 1, 10);
    let other = Entity::new("org", "repo", EntityKind::Function, "other", "src/y.ts", 1, 10);
    s.insert_entities(&[later, first, other]).unwrap();

    let got = s.get_entities_in_file("org", "repo", "src/x.ts").unwrap();
    let names: Vec<_> = got.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["first", "later"]);
}

#[test]
fn test_rule_roundtrip_and_scoped_query() {
    let s = store();
    let repo_rule = rule("org", "r-repo", Some("repo"), RuleStatus::Active);
    let org_rule = rule("org", "r-org", None, RuleStatus::Promoted);
    let other_repo = rule("org", "r-other", Some("elsewhere"), RuleStatus::Active);
    let draft = rule("org", "r-draft", Some("repo"), RuleStatus::Draft);
    for r in [&repo_rule, &org_rule, &other_repo, &draft] {
        s.upsert_rule(r).unwrap();
    }

    let loaded = s.get_rule("org", "r-repo").unwrap().unwrap();
    assert_eq!(loaded, repo_rule);

    let enforced = s.query_rules("org", &RuleQuery::enforced_for("repo")).unwrap();
    let mut ids: Vec<_> = enforced.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["r-org", "r-repo"]);

    assert_eq!(s.query_rules("org", &RuleQuery::default()).unwrap().len(), 4);
    assert!(s.delete_rule("org", "r-draft").unwrap());
    assert!(s.get_rule("org", "r-draft").unwrap().is_none());
}

#[test]
fn test_pattern_status_update() {
    let s = store();
    let pattern = Pattern {
        id: "p1".into(),
        org_id: "org".into(),
        repo_id: "repo".into(),
        hash: "abc123".into(),
        name: "guarded fetch".into(),
        description: "fetch wrapped in retry".into(),
        category: "reliability".into(),
        structural_query: "retry(fetch($URL))".into(),
        languages: vec!["typescript".into()],
        adherence_rate: 0.9,
        match_count: 14,
        status: PatternStatus::Detected,
        detected_at: Utc::now(),
    };
    s.upsert_pattern(&pattern).unwrap();

    s.update_pattern_status("org", "p1", PatternStatus::Promoted).unwrap();
    let got = s.get_pattern_by_hash("org", "repo", "abc123").unwrap().unwrap();
    assert_eq!(got.status, PatternStatus::Promoted);
    assert!(s.get_pattern_by_hash("org-b", "repo", "abc123").unwrap().is_none());

    let err = s
        .update_pattern_status("org", "missing", PatternStatus::Promoted)
        .unwrap_err();
    assert!(matches!(err, vigil_core::errors::StoreError::NotFound { .. }));
}

#[test]
fn test_impact_report_latest_run_supersedes() {
    let s = store();
    let first = ImpactReportDoc::new(
        "org",
        "repo",
        "r1",
        vec![ImpactMatch { file: "a.ts".into(), line: 3, matched_code: "x".into() }],
        10,
    );
    s.upsert_impact_report(&first).unwrap();
    let second = ImpactReportDoc::new("org", "repo", "r1", Vec::new(), 12);
    s.upsert_impact_report(&second).unwrap();

    let got = s.get_impact_report("org", "r1").unwrap().unwrap();
    assert_eq!(got.match_count, 0);
    assert_eq!(got.total_files_scanned, 12);
    assert!(s.get_impact_report("org-b", "r1").unwrap().is_none());
}

#[test]
fn test_drift_scores_newest_first() {
    let s = store();
    let now = Utc::now();
    let score = |name: &str, age_mins: i64, category| DriftScore {
        entity_id: EntityId::from(name),
        org_id: "org".into(),
        repo_id: "repo".into(),
        entity_name: name.into(),
        file_path: "src/a.ts".into(),
        category,
        score: 0.5,
        detected_at: now - Duration::minutes(age_mins),
    };
    s.upsert_drift_scores(&[
        score("old", 30, DriftCategory::Stable),
        score("new", 1, DriftCategory::IntentDrift),
        score("mid", 10, DriftCategory::Refactor),
    ])
    .unwrap();

    let got = s.get_drift_scores("org", "repo").unwrap();
    let names: Vec<_> = got.iter().map(|d| d.entity_name.as_str()).collect();
    assert_eq!(names, vec!["new", "mid", "old"]);
    assert!(s.get_drift_scores("org-b", "repo").unwrap().is_empty());
}
