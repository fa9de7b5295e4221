//! Rule drafting, partial updates, promotion and deletion.

mod common;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use vigil_analysis::rules::{
    apply_patch, create_rule, delete_rule, promote_pattern, update_rule, DraftedRule, PromotionOverrides,
    RuleCompiler,
};
use vigil_core::config::GenerationConfig;
use vigil_core::errors::{ErrorClass, GenerationError, MatcherError, RuleError, VigilErrorCode};
use vigil_core::events::{EventDispatcher, RulePromotedEvent, VigilEventHandler};
use vigil_core::traits::GraphStore;
use vigil_core::types::*;

use common::*;

// ---- apply_patch ----

#[test]
fn test_priority_patch_keeps_everything_else() {
    let original = rule("r1", "fetch($URL)", Enforcement::Warn);
    let patch = RulePatch {
        priority: Some(5),
        ..RulePatch::default()
    };
    let next = apply_patch(&original, &patch).unwrap();

    assert_eq!(next.priority, 5);
    assert_eq!(next.options, original.options);
    assert_eq!(next.structural_query, original.structural_query);
    assert_eq!(next.status, original.status);
    assert!(next.updated_at >= original.updated_at);
}

#[test]
fn test_enforcement_patch_keeps_status() {
    let mut original = rule("r1", "fetch($URL)", Enforcement::Warn);
    original.status = RuleStatus::Promoted;
    let patch = RulePatch {
        enforcement: Some(Enforcement::Block),
        ..RulePatch::default()
    };
    let next = apply_patch(&original, &patch).unwrap();
    assert_eq!(next.enforcement, Enforcement::Block);
    assert_eq!(next.status, RuleStatus::Promoted);
}

#[test]
fn test_options_merge_by_key() {
    let original = rule("r1", "fetch($URL)", Enforcement::Warn);
    let patch: RulePatch = serde_json::from_value(json!({
        "options": {"autofix": null, "severity_override": "high"}
    }))
    .unwrap();
    let next = apply_patch(&original, &patch).unwrap();
    assert!(!next.options.contains_key("autofix"));
    assert_eq!(next.options["severity_override"], json!("high"));
}

#[test]
fn test_empty_glob_clears_and_bad_glob_rejected() {
    let mut original = rule("r1", "fetch($URL)", Enforcement::Warn);
    original.path_glob = Some("src/**".into());

    let cleared = apply_patch(
        &original,
        &RulePatch {
            path_glob: Some(String::new()),
            ..RulePatch::default()
        },
    )
    .unwrap();
    assert_eq!(cleared.path_glob, None);

    let err = apply_patch(
        &original,
        &RulePatch {
            path_glob: Some("src/[".into()),
            ..RulePatch::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, RuleError::InvalidPatch { ref field, .. } if field == "path_glob"));
    assert_eq!(err.class(), ErrorClass::Configuration);
}

#[test]
fn test_blank_title_rejected() {
    let original = rule("r1", "fetch($URL)", Enforcement::Warn);
    let err = apply_patch(
        &original,
        &RulePatch {
            title: Some("   ".into()),
            ..RulePatch::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, RuleError::InvalidPatch { ref field, .. } if field == "title"));
}

#[test]
fn test_unknown_patch_field_rejected() {
    let parsed: Result<RulePatch, _> = serde_json::from_value(json!({"colour": "red"}));
    assert!(parsed.is_err());
}

// ---- lifecycle ----

#[test]
fn test_update_and_delete_persist_and_ledger() {
    let s = store();
    let r = rule("r1", "fetch($URL)", Enforcement::Warn);
    create_rule(s.as_ref(), REPO, &r).unwrap();

    let updated = update_rule(
        s.as_ref(),
        None,
        ORG,
        REPO,
        "r1",
        &RulePatch {
            priority: Some(9),
            ..RulePatch::default()
        },
    )
    .unwrap();
    assert_eq!(s.get_rule(ORG, "r1").unwrap().unwrap().priority, 9);
    assert_eq!(updated.options, r.options);

    delete_rule(s.as_ref(), None, ORG, REPO, "r1").unwrap();
    assert!(s.get_rule(ORG, "r1").unwrap().is_none());

    let err = delete_rule(s.as_ref(), None, ORG, REPO, "r1").unwrap_err();
    assert_eq!(err.class(), ErrorClass::NotFound);

    let kinds: Vec<LedgerKind> = s
        .query_ledger_timeline(ORG, REPO, None, 10)
        .unwrap()
        .entries
        .iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![LedgerKind::RuleDeleted, LedgerKind::RuleUpdated, LedgerKind::RuleCreated]
    );
}

#[test]
fn test_update_unknown_rule_is_not_found() {
    let s = store();
    let err = update_rule(s.as_ref(), None, ORG, REPO, "missing", &RulePatch::default()).unwrap_err();
    assert!(matches!(err, RuleError::NotFound { .. }));
}

#[test]
fn test_rule_of_another_repo_is_not_found() {
    let s = store();
    let mut other = rule("r-b", "fetch($URL)", Enforcement::Warn);
    other.repo_id = Some("repo-b".into());
    create_rule(s.as_ref(), "repo-b", &other).unwrap();
    let patch = RulePatch {
        priority: Some(3),
        ..RulePatch::default()
    };

    let err = update_rule(s.as_ref(), None, ORG, REPO, "r-b", &patch).unwrap_err();
    assert!(matches!(err, RuleError::NotFound { .. }));
    let err = delete_rule(s.as_ref(), None, ORG, REPO, "r-b").unwrap_err();
    assert!(matches!(err, RuleError::NotFound { .. }));
    assert!(s.get_rule(ORG, "r-b").unwrap().is_some());
    assert!(s.query_ledger_timeline(ORG, REPO, None, 10).unwrap().entries.is_empty());

    delete_rule(s.as_ref(), None, ORG, "repo-b", "r-b").unwrap();
    assert!(s.get_rule(ORG, "r-b").unwrap().is_none());
}

#[test]
fn test_org_scoped_rule_is_visible_from_every_repo() {
    let s = store();
    let mut shared = rule("r-org", "fetch($URL)", Enforcement::Warn);
    shared.repo_id = None;
    shared.scope = RuleScope::Org;
    create_rule(s.as_ref(), REPO, &shared).unwrap();
    let patch = RulePatch {
        priority: Some(4),
        ..RulePatch::default()
    };

    let updated = update_rule(s.as_ref(), None, ORG, "repo-b", "r-org", &patch).unwrap();
    assert_eq!(updated.priority, 4);
    let entries = s.query_ledger_timeline(ORG, "repo-b", None, 10).unwrap().entries;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, LedgerKind::RuleUpdated);
    assert_eq!(entries[0].subject_id, "r-org");
}

#[test]
fn test_rules_are_tenant_scoped() {
    let s = store();
    create_rule(s.as_ref(), REPO, &rule("r1", "fetch($URL)", Enforcement::Warn)).unwrap();
    assert!(s.get_rule("other-org", "r1").unwrap().is_none());
    let err = delete_rule(s.as_ref(), None, "other-org", REPO, "r1").unwrap_err();
    assert!(matches!(err, RuleError::NotFound { .. }));
    assert!(s.get_rule(ORG, "r1").unwrap().is_some());
}

// ---- promotion ----

struct PromotedCounter(AtomicUsize);

impl VigilEventHandler for PromotedCounter {
    fn on_rule_promoted(&self, _event: &RulePromotedEvent) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_promotion_copies_query_and_flips_status() {
    let s = store();
    s.upsert_pattern(&pattern("h1", PatternStatus::Detected)).unwrap();
    let counter = Arc::new(PromotedCounter(AtomicUsize::new(0)));
    let mut events = EventDispatcher::new();
    events.register(counter.clone());

    let overrides = PromotionOverrides {
        enforcement: Some(Enforcement::Block),
        ..PromotionOverrides::default()
    };
    let promoted = promote_pattern(s.as_ref(), Some(&events), ORG, REPO, "h1", &overrides).unwrap();

    assert_eq!(promoted.structural_query, "fetch($URL)");
    assert_eq!(promoted.languages, vec!["typescript".to_string()]);
    assert_eq!(promoted.status, RuleStatus::Active);
    assert_eq!(promoted.enforcement, Enforcement::Block);
    assert_eq!(promoted.source_pattern_id.as_deref(), Some("pat-h1"));
    assert_eq!(promoted.options["category"], json!("api"));

    let stored = s.get_pattern_by_hash(ORG, REPO, "h1").unwrap().unwrap();
    assert_eq!(stored.status, PatternStatus::Promoted);
    assert!(s.get_rule(ORG, &promoted.id).unwrap().is_some());
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);

    let again = promote_pattern(s.as_ref(), None, ORG, REPO, "h1", &overrides).unwrap_err();
    assert!(matches!(again, RuleError::AlreadyPromoted { .. }));
    assert_eq!(again.class(), ErrorClass::Conflict);
}

#[test]
fn test_promotion_retry_after_status_failure_keeps_one_rule() {
    let s = store();
    s.upsert_pattern(&pattern("h1", PatternStatus::Detected)).unwrap();
    let flaky = CountingStore::new(s.clone());
    flaky.fail_pattern_status(1);
    let overrides = PromotionOverrides::default();

    let err = promote_pattern(&flaky, None, ORG, REPO, "h1", &overrides).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Transient);
    assert_eq!(s.get_pattern_by_hash(ORG, REPO, "h1").unwrap().unwrap().status, PatternStatus::Detected);

    let promoted = promote_pattern(&flaky, None, ORG, REPO, "h1", &overrides).unwrap();
    assert_eq!(promoted.id, Rule::promoted_id(ORG, "pat-h1"));
    let sourced: Vec<Rule> = s
        .query_rules(ORG, &RuleQuery::default())
        .unwrap()
        .into_iter()
        .filter(|r| r.source_pattern_id.as_deref() == Some("pat-h1"))
        .collect();
    assert_eq!(sourced.len(), 1);
    assert_eq!(s.get_pattern_by_hash(ORG, REPO, "h1").unwrap().unwrap().status, PatternStatus::Promoted);
}

#[test]
fn test_promotion_rejects_dismissed_and_missing() {
    let s = store();
    s.upsert_pattern(&pattern("h2", PatternStatus::Dismissed)).unwrap();
    let overrides = PromotionOverrides::default();

    let dismissed = promote_pattern(s.as_ref(), None, ORG, REPO, "h2", &overrides).unwrap_err();
    assert!(matches!(dismissed, RuleError::PatternDismissed { .. }));

    let missing = promote_pattern(s.as_ref(), None, ORG, REPO, "nope", &overrides).unwrap_err();
    assert!(matches!(missing, RuleError::PatternNotFound { .. }));
    assert_eq!(missing.class(), ErrorClass::NotFound);
}

// ---- compiler ----

fn drafted(language: &str, enforcement: &str, query: &str) -> serde_json::Value {
    json!({
        "name": "no-raw-fetch",
        "title": "Use the shared HTTP client",
        "description": "Direct fetch calls bypass retries and auth",
        "rule_type": "architecture",
        "structural_query": query,
        "languages": [language],
        "path_glob": "src/**",
        "enforcement": enforcement,
    })
}

#[test]
fn test_draft_accepted_first_time() {
    let generator = ScriptedGenerator::new(vec![Ok(drafted("typescript", "warn", "fetch($URL)"))]);
    let matcher = FakeMatcher::matching(Vec::new());
    let compiler = RuleCompiler::new(&generator, &matcher, &GenerationConfig::default());

    let draft = compiler
        .draft_rule("Do not call fetch directly", "typescript", Enforcement::Warn)
        .unwrap();
    assert_eq!(draft.name, "no-raw-fetch");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    let rule = draft.into_rule(ORG, Some(REPO));
    assert_eq!(rule.status, RuleStatus::Draft);
    assert_eq!(rule.scope, RuleScope::Repo);
    assert!(uuid::Uuid::parse_str(&rule.id).is_ok());
}

#[test]
fn test_invalid_query_is_retried_with_feedback() {
    let generator = ScriptedGenerator::new(vec![
        Ok(drafted("typescript", "warn", "fetch(($URL)")),
        Ok(drafted("typescript", "warn", "fetch($URL)")),
    ]);
    let matcher = FakeMatcher::matching(Vec::new());
    let compiler = RuleCompiler::new(&generator, &matcher, &GenerationConfig::default());

    let draft = compiler.draft_rule("No raw fetch", "typescript", Enforcement::Warn).unwrap();
    assert_eq!(draft.structural_query, "fetch($URL)");
    let prompts = generator.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("unbalanced parentheses"));
}

#[test]
fn test_schema_failures_exhaust_attempts() {
    let mut extra = drafted("typescript", "warn", "fetch($URL)");
    extra["confidence"] = json!(0.9);
    let generator = ScriptedGenerator::new(vec![Ok(extra)]);
    let matcher = FakeMatcher::matching(Vec::new());
    let compiler = RuleCompiler::new(&generator, &matcher, &GenerationConfig::default());

    let err = compiler.draft_rule("No raw fetch", "typescript", Enforcement::Warn).unwrap_err();
    assert!(matches!(
        err,
        RuleError::Generation(GenerationError::SchemaValidation { attempts: 2, .. })
    ));
    assert_eq!(err.class(), ErrorClass::SchemaValidation);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_wrong_enforcement_is_not_corrected() {
    let generator = ScriptedGenerator::new(vec![Ok(drafted("typescript", "block", "fetch($URL)"))]);
    let matcher = FakeMatcher::matching(Vec::new());
    let config = GenerationConfig { max_attempts: Some(3) };
    let compiler = RuleCompiler::new(&generator, &matcher, &config);

    let err = compiler.draft_rule("No raw fetch", "typescript", Enforcement::Warn).unwrap_err();
    assert_eq!(err.error_code(), "SCHEMA_VALIDATION");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_generator_outage_is_not_retried() {
    let generator = ScriptedGenerator::new(vec![Err(GenerationError::Unavailable {
        message: "503".into(),
    })]);
    let matcher = FakeMatcher::new(MatcherMode::Fail(MatcherError::Io {
        message: "unused".into(),
    }));
    let compiler = RuleCompiler::new(&generator, &matcher, &GenerationConfig::default());

    let err = compiler.draft_rule("No raw fetch", "typescript", Enforcement::Warn).unwrap_err();
    assert!(matches!(err, RuleError::Generation(GenerationError::Unavailable { .. })));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_schema_describes_drafted_rule() {
    let schema = RuleCompiler::schema().unwrap();
    let props = schema["properties"].as_object().unwrap();
    for field in ["name", "title", "structural_query", "languages", "enforcement"] {
        assert!(props.contains_key(field), "missing {field}");
    }
    let required: BTreeMap<String, ()> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| (v.as_str().unwrap().to_string(), ()))
        .collect();
    assert!(required.contains_key("structural_query"));
    assert!(!required.contains_key("path_glob"));

    let roundtrip: DraftedRule = serde_json::from_value(drafted("python", "suggest", "print($X)")).unwrap();
    assert_eq!(roundtrip.enforcement, Enforcement::Suggest);
}
