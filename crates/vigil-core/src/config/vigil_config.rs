//! Top-level Vigil configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    BlastRadiusConfig, GenerationConfig, ReviewDefaultsConfig, SimulationConfig, WorkflowConfig,
};
use crate::errors::ConfigError;
use crate::types::CheckKind;

/// Project config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "vigil.toml";

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides
/// 2. Environment variables (`VIGIL_*`)
/// 3. Project config (`vigil.toml` in project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VigilConfig {
    pub review: ReviewDefaultsConfig,
    pub blast_radius: BlastRadiusConfig,
    pub workflow: WorkflowConfig,
    pub generation: GenerationConfig,
    pub simulation: SimulationConfig,
}

/// Overrides applied on top of every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_depth: Option<u32>,
    pub impact_threshold: Option<u32>,
    pub complexity_threshold: Option<u32>,
    pub step_timeout_secs: Option<u64>,
    pub heartbeat_timeout_secs: Option<u64>,
}

impl VigilConfig {
    /// Load configuration for the project at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        Self::load_with_env(root, overrides, |key| std::env::var(key).ok())
    }

    /// Same as [`VigilConfig::load`] with an explicit environment lookup.
    pub fn load_with_env<F>(
        root: &Path,
        overrides: Option<&ConfigOverrides>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let project_path = root.join(CONFIG_FILE_NAME);
        if project_path.exists() {
            let file_config = Self::read_toml_file(&project_path)?;
            config.merge_from(&file_config);
        }

        config.apply_env(env);

        if let Some(o) = overrides {
            config.apply_overrides(o);
        }

        config.validate()?;
        tracing::debug!(root = %root.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Reject values that make no sense (zero depth, zero attempts, zero
    /// timeouts, unknown check names).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blast_radius.max_depth == Some(0) {
            return Err(ConfigError::invalid("blast_radius.max_depth", "must be greater than 0"));
        }
        if self.workflow.review_max_attempts == Some(0) {
            return Err(ConfigError::invalid(
                "workflow.review_max_attempts",
                "must be greater than 0",
            ));
        }
        if self.workflow.simulation_max_attempts == Some(0) {
            return Err(ConfigError::invalid(
                "workflow.simulation_max_attempts",
                "must be greater than 0",
            ));
        }
        if self.workflow.step_timeout_secs == Some(0) {
            return Err(ConfigError::invalid("workflow.step_timeout_secs", "must be greater than 0"));
        }
        if self.workflow.heartbeat_timeout_secs == Some(0) {
            return Err(ConfigError::invalid(
                "workflow.heartbeat_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.generation.max_attempts == Some(0) {
            return Err(ConfigError::invalid("generation.max_attempts", "must be greater than 0"));
        }
        if let Some(unknown) = self
            .review
            .disabled_checks
            .iter()
            .find(|c| CheckKind::parse(c).is_none())
        {
            return Err(ConfigError::UnknownCheck(unknown.clone()));
        }
        if self
            .blast_radius
            .boundary_kinds
            .iter()
            .chain(self.blast_radius.api_boundary_kinds.iter())
            .any(|k| k.trim().is_empty())
        {
            return Err(ConfigError::invalid("blast_radius", "boundary kinds must be non-empty"));
        }
        Ok(())
    }

    fn read_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Values present in `other` win.
    fn merge_from(&mut self, other: &Self) {
        self.review.merge_from(&other.review);
        self.blast_radius.merge_from(&other.blast_radius);
        self.workflow.merge_from(&other.workflow);
        self.generation.merge_from(&other.generation);
        self.simulation.merge_from(&other.simulation);
    }

    /// Pattern: `VIGIL_<SECTION>_<KEY>`. Unparseable values are ignored.
    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| env(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(v) = parsed("VIGIL_BLAST_RADIUS_MAX_DEPTH") {
            self.blast_radius.max_depth = u32::try_from(v).ok();
        }
        if let Some(v) = env("VIGIL_BLAST_RADIUS_BOUNDARY_KINDS") {
            self.blast_radius.boundary_kinds = split_list(&v);
        }
        if let Some(v) = parsed("VIGIL_REVIEW_IMPACT_THRESHOLD") {
            self.review.impact_threshold = u32::try_from(v).ok();
        }
        if let Some(v) = parsed("VIGIL_REVIEW_COMPLEXITY_THRESHOLD") {
            self.review.complexity_threshold = u32::try_from(v).ok();
        }
        if let Some(v) = parsed("VIGIL_WORKFLOW_STEP_TIMEOUT_SECS") {
            self.workflow.step_timeout_secs = Some(v);
        }
        if let Some(v) = parsed("VIGIL_WORKFLOW_HEARTBEAT_TIMEOUT_SECS") {
            self.workflow.heartbeat_timeout_secs = Some(v);
        }
        if let Some(v) = parsed("VIGIL_GENERATION_MAX_ATTEMPTS") {
            self.generation.max_attempts = u32::try_from(v).ok();
        }
    }

    fn apply_overrides(&mut self, o: &ConfigOverrides) {
        if let Some(v) = o.max_depth {
            self.blast_radius.max_depth = Some(v);
        }
        if let Some(v) = o.impact_threshold {
            self.review.impact_threshold = Some(v);
        }
        if let Some(v) = o.complexity_threshold {
            self.review.complexity_threshold = Some(v);
        }
        if let Some(v) = o.step_timeout_secs {
            self.workflow.step_timeout_secs = Some(v);
        }
        if let Some(v) = o.heartbeat_timeout_secs {
            self.workflow.heartbeat_timeout_secs = Some(v);
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
