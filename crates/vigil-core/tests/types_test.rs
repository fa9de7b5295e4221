//! Tests for domain types.

use std::collections::BTreeMap;

use chrono::Utc;
use vigil_core::types::*;

fn rule(languages: &[&str], path_glob: Option<&str>) -> Rule {
    Rule {
        id: "r1".into(),
        org_id: "org".into(),
        repo_id: Some("repo".into()),
        name: "no-raw-sql".into(),
        title: "No raw SQL".into(),
        description: String::new(),
        rule_type: RuleType::Security,
        structural_query: "db.raw($A)".into(),
        secondary_query: None,
        languages: languages.iter().map(|s| s.to_string()).collect(),
        path_glob: path_glob.map(str::to_string),
        enforcement: Enforcement::Warn,
        priority: 0,
        status: RuleStatus::Active,
        scope: RuleScope::Repo,
        options: BTreeMap::new(),
        source_pattern_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_entity_id_is_content_addressed() {
    let a = Entity::new("org", "repo", EntityKind::Function, "handle", "src/a.ts", 1, 9);
    let b = Entity::new("other-org", "repo", EntityKind::Function, "handle", "src/a.ts", 4, 20);
    let c = Entity::new("org", "repo", EntityKind::Method, "handle", "src/a.ts", 1, 9);
    assert_eq!(a.id, b.id);
    assert_ne!(a.id, c.id);
    assert_eq!(a.id.as_str().len(), 32);
}

#[test]
fn test_unknown_entity_kind_roundtrips() {
    let kind: EntityKind = serde_json::from_str("\"graphql_resolver\"").unwrap();
    assert_eq!(kind, EntityKind::Other("graphql_resolver".into()));
    assert_eq!(serde_json::to_string(&kind).unwrap(), "\"graphql_resolver\"");
    assert_eq!(EntityKind::parse("api_route"), EntityKind::ApiRoute);
}

#[test]
fn test_test_path_detection() {
    assert!(entity::is_test_path("src/__tests__/user.ts"));
    assert!(entity::is_test_path("pkg/user_test.go"));
    assert!(entity::is_test_path("web/user.spec.tsx"));
    assert!(entity::is_test_path("tests/test_api.py"));
    assert!(!entity::is_test_path("src/contest.ts"));
}

#[test]
fn test_rule_applies_to_language_and_glob() {
    let r = rule(&["typescript"], Some("src/**/*.ts"));
    assert!(r.applies_to("src/api/users.ts", Some("typescript")));
    assert!(!r.applies_to("lib/users.ts", Some("typescript")));
    assert!(!r.applies_to("src/api/users.py", Some("python")));
    assert!(!r.applies_to("src/api/users.ts", None));

    let any = rule(&[], None);
    assert!(any.applies_to("anything/at/all.rb", None));
}

#[test]
fn test_rule_invalid_glob_matches_nothing() {
    let r = rule(&[], Some("src/[*.ts"));
    assert!(!r.applies_to("src/a.ts", Some("typescript")));
}

#[test]
fn test_rule_patch_rejects_unknown_fields() {
    let ok: RulePatch = serde_json::from_str(r#"{"priority": 5}"#).unwrap();
    assert_eq!(ok.priority, Some(5));
    assert!(!ok.is_empty());
    assert!(serde_json::from_str::<RulePatch>(r#"{"prio": 5}"#).is_err());
}

#[test]
fn test_review_findings_empty_has_every_check() {
    let findings = ReviewFindings::empty();
    assert_eq!(findings.groups().count(), CheckKind::ALL.len());
    assert!(findings.is_empty());

    let json = serde_json::to_value(&findings).unwrap();
    assert_eq!(json.as_object().unwrap().len(), CheckKind::ALL.len());
    assert!(json["trust_boundary"].as_array().unwrap().is_empty());
}

#[test]
fn test_review_findings_set_drops_foreign_findings() {
    let env = Finding::Env(EnvFinding {
        file_path: "src/a.ts".into(),
        line: 3,
        variable: "API_KEY".into(),
        severity: Severity::Low,
        message: "undeclared".into(),
        suggestion: None,
    });
    let mut findings = ReviewFindings::empty();
    findings.set(CheckKind::Impact, vec![env.clone()]);
    assert!(findings.get(CheckKind::Impact).is_empty());

    findings.set(CheckKind::Env, vec![env]);
    assert_eq!(findings.total(), 1);
    assert!(!findings.has_blocking());
}

#[test]
fn test_finding_serializes_with_check_tag() {
    let f = Finding::Pattern(PatternFinding {
        rule_id: "r1".into(),
        rule_title: "No raw SQL".into(),
        enforcement: Enforcement::Block,
        file_path: "src/db.ts".into(),
        line: 12,
        matched_code: "db.raw(q)".into(),
        severity: Severity::High,
        message: "raw SQL".into(),
    });
    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(json["check"], "pattern");
    assert_eq!(json["enforcement"], "block");
    assert!(f.is_blocking());
    assert_eq!(f.check(), CheckKind::Pattern);
}

#[test]
fn test_violation_density_avoids_division_by_zero() {
    let report = ImpactReportDoc::new("org", "repo", "r1", Vec::new(), 0);
    assert_eq!(report.violation_density, 0.0);

    let matches = vec![
        ImpactMatch { file: "a.ts".into(), line: 1, matched_code: "x".into() },
        ImpactMatch { file: "b.ts".into(), line: 2, matched_code: "y".into() },
    ];
    let report = ImpactReportDoc::new("org", "repo", "r1", matches, 8);
    assert_eq!(report.match_count, 2);
    assert!((report.violation_density - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_changed_file_span_helpers() {
    let file = ChangedFile {
        path: "src/app.py".into(),
        status: FileStatus::Modified,
        language: None,
        added_lines: vec![DiffLine::new(10, "x = 1"), DiffLine::new(30, "y = 2")],
        removed_lines: vec![DiffLine::new(50, "z = 3")],
    };
    assert_eq!(file.language(), Some("python"));
    assert!(file.touches_span(5, 12));
    assert!(file.touches_span(45, 55));
    assert!(!file.touches_span(11, 29));
    assert_eq!(file.added_in_span(1, 40).count(), 2);
    assert_eq!(file.file_name(), "app.py");
}

#[test]
fn test_drift_summary_counts() {
    let mut summary = DriftSummary::default();
    summary.record(DriftCategory::IntentDrift);
    summary.record(DriftCategory::IntentDrift);
    summary.record(DriftCategory::Stable);
    assert_eq!(summary.intent_drift, 2);
    assert_eq!(summary.stable, 1);
    assert_eq!(DriftCategory::parse("intent_drift"), Some(DriftCategory::IntentDrift));
}

#[test]
fn test_workflow_record_attempts_and_terminal_states() {
    let mut record = WorkflowRecord::new(
        "wf-1",
        WorkflowKind::Simulation,
        "org",
        "queued",
        serde_json::json!({}),
    );
    assert!(!record.is_terminal());
    assert_eq!(record.bump_attempt("scanning"), 1);
    assert_eq!(record.bump_attempt("scanning"), 2);
    assert_eq!(record.attempts_for("aggregating"), 0);
    record.transition("persisted");
    assert!(record.is_terminal());
}
