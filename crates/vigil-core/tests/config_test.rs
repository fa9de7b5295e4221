//! Tests for the Vigil configuration system.

use std::collections::HashMap;

use vigil_core::config::{ConfigOverrides, ReviewConfig, ReviewConfigPatch, VigilConfig};
use vigil_core::errors::ConfigError;
use vigil_core::types::{CheckKind, EntityKind};

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_layered_resolution() {
    let dir = tempdir();
    std::fs::write(
        dir.path().join("vigil.toml"),
        r#"
[review]
impact_threshold = 8
complexity_threshold = 20

[blast_radius]
max_depth = 3
"#,
    )
    .unwrap();

    let env = env_of(&[("VIGIL_REVIEW_IMPACT_THRESHOLD", "12")]);
    let overrides = ConfigOverrides {
        max_depth: Some(7),
        ..Default::default()
    };

    let config = VigilConfig::load_with_env(dir.path(), Some(&overrides), env).unwrap();
    // override > env > file
    assert_eq!(config.blast_radius.effective_max_depth(), 7);
    assert_eq!(config.review.effective_impact_threshold(), 12);
    assert_eq!(config.review.effective_complexity_threshold(), 20);
}

#[test]
fn test_defaults_without_file() {
    let dir = tempdir();
    let config = VigilConfig::load_with_env(dir.path(), None, env_of(&[])).unwrap();
    assert_eq!(config.blast_radius.effective_max_depth(), 5);
    assert_eq!(config.review.effective_impact_threshold(), 5);
    assert_eq!(config.review.effective_complexity_threshold(), 10);
    assert_eq!(config.workflow.effective_review_max_attempts(), 3);
    assert_eq!(config.workflow.effective_simulation_max_attempts(), 2);
    assert_eq!(config.workflow.step_timeout().as_secs(), 900);
    assert_eq!(config.workflow.heartbeat_timeout().as_secs(), 120);
    assert_eq!(config.generation.effective_max_attempts(), 2);
    assert_eq!(
        config.blast_radius.effective_boundary_kinds(),
        vec![EntityKind::ApiRoute, EntityKind::WebhookHandler]
    );
    assert!(config
        .simulation
        .effective_excluded_dirs()
        .contains(&"node_modules".to_string()));
}

#[test]
fn test_extensible_boundary_kinds() {
    let config = VigilConfig::from_toml(
        r#"
[blast_radius]
boundary_kinds = ["api_route", "graphql_resolver"]
"#,
    )
    .unwrap();
    let kinds = config.blast_radius.effective_boundary_kinds();
    assert_eq!(kinds.len(), 2);
    assert_eq!(kinds[1], EntityKind::Other("graphql_resolver".to_string()));
}

#[test]
fn test_unparseable_env_is_ignored() {
    let dir = tempdir();
    let env = env_of(&[("VIGIL_BLAST_RADIUS_MAX_DEPTH", "deep")]);
    let config = VigilConfig::load_with_env(dir.path(), None, env).unwrap();
    assert_eq!(config.blast_radius.effective_max_depth(), 5);
}

#[test]
fn test_zero_depth_rejected() {
    let dir = tempdir();
    std::fs::write(dir.path().join("vigil.toml"), "[blast_radius]\nmax_depth = 0\n").unwrap();
    let err = VigilConfig::load_with_env(dir.path(), None, env_of(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "blast_radius.max_depth"));
}

#[test]
fn test_zero_timeout_rejected() {
    let config = VigilConfig::from_toml("[workflow]\nheartbeat_timeout_secs = 0\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_disabled_check_rejected() {
    let config = VigilConfig::from_toml("[review]\ndisabled_checks = [\"spelling\"]\n").unwrap();
    assert_eq!(
        config.validate().unwrap_err(),
        ConfigError::UnknownCheck("spelling".to_string())
    );
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let dir = tempdir();
    std::fs::write(dir.path().join("vigil.toml"), "[review\nimpact_threshold = ").unwrap();
    let err = VigilConfig::load_with_env(dir.path(), None, env_of(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_toml_roundtrip_keeps_values() {
    let config = VigilConfig::from_toml("[workflow]\nstep_timeout_secs = 60\n").unwrap();
    let text = config.to_toml().unwrap();
    let back = VigilConfig::from_toml(&text).unwrap();
    assert_eq!(back.workflow.step_timeout().as_secs(), 60);
}

#[test]
fn test_review_defaults_disable_checks() {
    let config = VigilConfig::from_toml("[review]\ndisabled_checks = [\"env\"]\n").unwrap();
    let review = config.review.to_review_config();
    assert!(!review.is_enabled(CheckKind::Env));
    assert!(review.is_enabled(CheckKind::Impact));
}

// ---- ReviewConfig patches ----

#[test]
fn test_absent_check_is_enabled() {
    let config = ReviewConfig::default();
    for check in CheckKind::ALL {
        assert!(config.is_enabled(*check));
    }
}

#[test]
fn test_negative_threshold_rejected_without_changes() {
    let mut config = ReviewConfig::default();
    let patch: ReviewConfigPatch = serde_json::from_value(serde_json::json!({
        "impact_threshold": -1,
        "checks_enabled": {"impact": false}
    }))
    .unwrap();

    let err = config.apply_patch(&patch).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "impact_threshold"));
    assert_eq!(config, ReviewConfig::default());
}

#[test]
fn test_negative_complexity_threshold_rejected() {
    let mut config = ReviewConfig::default();
    let patch = ReviewConfigPatch {
        complexity_threshold: Some(-3),
        ..Default::default()
    };
    assert!(config.apply_patch(&patch).is_err());
}

#[test]
fn test_checks_map_merged_by_key() {
    let mut config = ReviewConfig::default();
    config.checks_enabled.insert("env".to_string(), false);

    let patch: ReviewConfigPatch = serde_json::from_value(serde_json::json!({
        "checks_enabled": {"impact": false},
        "impact_threshold": 0
    }))
    .unwrap();
    config.apply_patch(&patch).unwrap();

    assert!(!config.is_enabled(CheckKind::Env));
    assert!(!config.is_enabled(CheckKind::Impact));
    assert_eq!(config.impact_threshold, 0);
    assert_eq!(config.complexity_threshold, 10);
}

#[test]
fn test_patch_unknown_check_rejected() {
    let mut config = ReviewConfig::default();
    let patch: ReviewConfigPatch =
        serde_json::from_value(serde_json::json!({"checks_enabled": {"lint": true}})).unwrap();
    assert_eq!(
        config.apply_patch(&patch).unwrap_err(),
        ConfigError::UnknownCheck("lint".to_string())
    );
}

#[test]
fn test_patch_unknown_field_rejected() {
    let result: Result<ReviewConfigPatch, _> =
        serde_json::from_value(serde_json::json!({"impact": 3}));
    assert!(result.is_err());
}
