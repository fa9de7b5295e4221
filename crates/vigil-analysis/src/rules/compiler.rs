//! Rule compiler: natural-language description to a validated draft rule.
//!
//! The generator is asked for JSON matching the [`DraftedRule`] schema. Output
//! is deserialised strictly and validated; a draft that fails either step is
//! requested again, up to the configured attempt budget, and never repaired.

use std::collections::BTreeMap;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vigil_core::config::GenerationConfig;
use vigil_core::errors::{GenerationError, MatcherError, RuleError};
use vigil_core::events::{EventDispatcher, RuleDraftedEvent};
use vigil_core::traits::{PatternMatcher, StructuredGenerator};
use vigil_core::types::{Enforcement, Rule, RuleScope, RuleStatus, RuleType};

/// What the generator must produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DraftedRule {
    /// Short machine-friendly identifier, e.g. `no-raw-fetch`.
    pub name: String,
    pub title: String,
    pub description: String,
    pub rule_type: RuleType,
    /// Structural query in the pattern matcher's syntax.
    pub structural_query: String,
    #[serde(default)]
    pub secondary_query: Option<String>,
    pub languages: Vec<String>,
    #[serde(default)]
    pub path_glob: Option<String>,
    pub enforcement: Enforcement,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl DraftedRule {
    /// A draft-status rule. `repo_id = None` yields an org-scoped rule.
    pub fn into_rule(self, org_id: &str, repo_id: Option<&str>) -> Rule {
        let now = Utc::now();
        Rule {
            id: uuid::Uuid::new_v4().to_string(),
            org_id: org_id.to_string(),
            repo_id: repo_id.map(str::to_string),
            name: self.name,
            title: self.title,
            description: self.description,
            rule_type: self.rule_type,
            structural_query: self.structural_query,
            secondary_query: self.secondary_query.filter(|q| !q.trim().is_empty()),
            languages: self.languages,
            path_glob: self.path_glob.filter(|g| !g.trim().is_empty()),
            enforcement: self.enforcement,
            priority: self.priority,
            status: RuleStatus::Draft,
            scope: if repo_id.is_some() { RuleScope::Repo } else { RuleScope::Org },
            options: self.options,
            source_pattern_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Why a single generation attempt was rejected.
enum Rejection {
    /// Schema or semantic problem; worth asking again.
    Invalid(String),
    /// Collaborator failure; surfaced as is.
    Fatal(RuleError),
}

pub struct RuleCompiler<'a> {
    generator: &'a dyn StructuredGenerator,
    matcher: &'a dyn PatternMatcher,
    max_attempts: u32,
    events: Option<&'a EventDispatcher>,
}

impl<'a> RuleCompiler<'a> {
    pub fn new(
        generator: &'a dyn StructuredGenerator,
        matcher: &'a dyn PatternMatcher,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            generator,
            matcher,
            max_attempts: config.effective_max_attempts().max(1),
            events: None,
        }
    }

    pub fn with_events(mut self, events: &'a EventDispatcher) -> Self {
        self.events = Some(events);
        self
    }

    /// JSON schema sent to the generator.
    pub fn schema() -> Result<serde_json::Value, RuleError> {
        serde_json::to_value(schemars::schema_for!(DraftedRule)).map_err(|e| RuleError::InvalidDraft {
            message: format!("schema serialisation failed: {e}"),
        })
    }

    pub fn draft_rule(
        &self,
        description: &str,
        language: &str,
        enforcement: Enforcement,
    ) -> Result<DraftedRule, RuleError> {
        if description.trim().is_empty() {
            return Err(RuleError::InvalidDraft {
                message: "description must not be empty".to_string(),
            });
        }
        let schema = Self::schema()?;
        let mut last_problem = String::new();

        for attempt in 1..=self.max_attempts {
            let prompt = build_prompt(description, language, enforcement, &last_problem);
            let output = self.generator.generate(&prompt, &schema)?;

            match self.accept(output, language, enforcement) {
                Ok(draft) => {
                    tracing::info!(title = %draft.title, attempt, "rule drafted");
                    if let Some(events) = self.events {
                        events.emit_rule_drafted(&RuleDraftedEvent {
                            title: draft.title.clone(),
                            attempts: attempt,
                        });
                    }
                    return Ok(draft);
                }
                Err(Rejection::Fatal(e)) => return Err(e),
                Err(Rejection::Invalid(problem)) => {
                    tracing::warn!(attempt, max = self.max_attempts, %problem, "drafted rule rejected");
                    last_problem = problem;
                }
            }
        }

        Err(GenerationError::SchemaValidation {
            attempts: self.max_attempts,
            message: last_problem,
        }
        .into())
    }

    fn accept(
        &self,
        output: serde_json::Value,
        language: &str,
        enforcement: Enforcement,
    ) -> Result<DraftedRule, Rejection> {
        let draft: DraftedRule =
            serde_json::from_value(output).map_err(|e| Rejection::Invalid(format!("schema mismatch: {e}")))?;
        validate_draft(&draft, language, enforcement).map_err(Rejection::Invalid)?;

        for lang in &draft.languages {
            match self.matcher.check_query(&draft.structural_query, lang) {
                Ok(()) => {}
                Err(e @ (MatcherError::InvalidQuery { .. } | MatcherError::UnsupportedLanguage(_))) => {
                    return Err(Rejection::Invalid(e.to_string()));
                }
                Err(e) => return Err(Rejection::Fatal(e.into())),
            }
        }
        Ok(draft)
    }
}

/// Semantic checks that do not need the matcher.
pub fn validate_draft(draft: &DraftedRule, language: &str, enforcement: Enforcement) -> Result<(), String> {
    for (field, value) in [
        ("name", &draft.name),
        ("title", &draft.title),
        ("structural_query", &draft.structural_query),
    ] {
        if value.trim().is_empty() {
            return Err(format!("{field} must not be empty"));
        }
    }
    if draft.languages.is_empty() || draft.languages.iter().any(|l| l.trim().is_empty()) {
        return Err("languages must list at least one language".to_string());
    }
    if !draft.languages.iter().any(|l| l.eq_ignore_ascii_case(language)) {
        return Err(format!("languages must include the requested language `{language}`"));
    }
    if draft.enforcement != enforcement {
        return Err(format!(
            "enforcement must be `{enforcement}`, got `{}`",
            draft.enforcement
        ));
    }
    if let Some(glob) = draft.path_glob.as_deref().filter(|g| !g.trim().is_empty()) {
        glob::Pattern::new(glob).map_err(|e| format!("path_glob does not compile: {e}"))?;
    }
    Ok(())
}

fn build_prompt(description: &str, language: &str, enforcement: Enforcement, last_problem: &str) -> String {
    let mut prompt = format!(
        "Write a code rule for {language} that enforces the following policy.\n\n\
         Policy: {description}\n\n\
         Use enforcement `{enforcement}`. Include `{language}` in `languages`. \
         `structural_query` must be a structural pattern the matcher accepts, using \
         metavariables such as $NAME for wildcards. Respond with JSON only, matching the schema."
    );
    if !last_problem.is_empty() {
        prompt.push_str(&format!("\n\nThe previous answer was rejected: {last_problem}"));
    }
    prompt
}
