//! Per-repository review settings and the `[review]` defaults section.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMPLEXITY_THRESHOLD, DEFAULT_IMPACT_THRESHOLD};
use crate::errors::ConfigError;
use crate::types::CheckKind;

/// Review settings of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Check name to enabled flag. An absent key means enabled.
    #[serde(default)]
    pub checks_enabled: BTreeMap<String, bool>,
    pub impact_threshold: u32,
    pub complexity_threshold: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            checks_enabled: BTreeMap::new(),
            impact_threshold: DEFAULT_IMPACT_THRESHOLD,
            complexity_threshold: DEFAULT_COMPLEXITY_THRESHOLD,
        }
    }
}

impl ReviewConfig {
    pub fn is_enabled(&self, check: CheckKind) -> bool {
        self.checks_enabled
            .get(check.as_str())
            .copied()
            .unwrap_or(true)
    }

    /// Reject check names this build does not know.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.checks_enabled.keys() {
            if CheckKind::parse(name).is_none() {
                return Err(ConfigError::UnknownCheck(name.clone()));
            }
        }
        Ok(())
    }

    /// Apply a partial update. The check map is merged by key; thresholds are
    /// replaced only when present. Nothing changes if validation fails.
    pub fn apply_patch(&mut self, patch: &ReviewConfigPatch) -> Result<(), ConfigError> {
        let impact = patch
            .impact_threshold
            .map(|v| threshold("impact_threshold", v))
            .transpose()?;
        let complexity = patch
            .complexity_threshold
            .map(|v| threshold("complexity_threshold", v))
            .transpose()?;
        if let Some(checks) = &patch.checks_enabled {
            if let Some(unknown) = checks.keys().find(|k| CheckKind::parse(k).is_none()) {
                return Err(ConfigError::UnknownCheck(unknown.clone()));
            }
        }

        if let Some(v) = impact {
            self.impact_threshold = v;
        }
        if let Some(v) = complexity {
            self.complexity_threshold = v;
        }
        if let Some(checks) = &patch.checks_enabled {
            for (name, enabled) in checks {
                self.checks_enabled.insert(name.clone(), *enabled);
            }
        }
        Ok(())
    }
}

fn threshold(field: &str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::invalid(field, "must be >= 0"));
    }
    u32::try_from(value).map_err(|_| ConfigError::invalid(field, "out of range"))
}

/// Partial review config update. Signed thresholds so negative input is
/// rejected with a validation error rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewConfigPatch {
    pub checks_enabled: Option<BTreeMap<String, bool>>,
    pub impact_threshold: Option<i64>,
    pub complexity_threshold: Option<i64>,
}

/// `[review]` section: defaults for repositories without stored settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReviewDefaultsConfig {
    /// Default: 5.
    pub impact_threshold: Option<u32>,
    /// Default: 10.
    pub complexity_threshold: Option<u32>,
    /// Checks disabled unless a repository enables them.
    #[serde(default)]
    pub disabled_checks: Vec<String>,
}

impl ReviewDefaultsConfig {
    pub fn effective_impact_threshold(&self) -> u32 {
        self.impact_threshold.unwrap_or(DEFAULT_IMPACT_THRESHOLD)
    }

    pub fn effective_complexity_threshold(&self) -> u32 {
        self.complexity_threshold
            .unwrap_or(DEFAULT_COMPLEXITY_THRESHOLD)
    }

    /// The review config a repository starts with.
    pub fn to_review_config(&self) -> ReviewConfig {
        ReviewConfig {
            checks_enabled: self
                .disabled_checks
                .iter()
                .map(|c| (c.clone(), false))
                .collect(),
            impact_threshold: self.effective_impact_threshold(),
            complexity_threshold: self.effective_complexity_threshold(),
        }
    }

    pub(crate) fn merge_from(&mut self, other: &Self) {
        if other.impact_threshold.is_some() {
            self.impact_threshold = other.impact_threshold;
        }
        if other.complexity_threshold.is_some() {
            self.complexity_threshold = other.complexity_threshold;
        }
        if !other.disabled_checks.is_empty() {
            self.disabled_checks = other.disabled_checks.clone();
        }
    }
}
