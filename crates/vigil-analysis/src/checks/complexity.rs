//! Complexity: cyclomatic estimate over the lines a change adds to an entity.

use std::sync::LazyLock;

use regex::Regex;
use vigil_core::errors::CheckError;
use vigil_core::types::{CheckKind, ComplexityFinding, DiffLine, Finding, Severity};

use super::types::{Check, CheckContext};

static BRANCH_TOKENS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:if|elif|elsif|for|foreach|while|until|case|when|catch|except|rescue|guard)\b|&&|\|\||\?\?| \? ",
    )
    .ok()
});

pub struct ComplexityCheck;

impl Check for ComplexityCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Complexity
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let threshold = ctx.config.complexity_threshold;
        let mut findings = Vec::new();

        for entity in ctx.entities.iter().filter(|e| e.kind.is_callable()) {
            let added = ctx.added_lines_of(entity);
            if added.is_empty() {
                continue;
            }
            let complexity = estimate_complexity(added.iter().copied());
            if complexity <= threshold {
                continue;
            }

            let severity = if u64::from(complexity) > u64::from(threshold) * 2 {
                Severity::High
            } else {
                Severity::Medium
            };
            findings.push(Finding::Complexity(ComplexityFinding {
                entity_id: entity.id.clone(),
                entity_name: entity.name.clone(),
                file_path: entity.file_path.clone(),
                line: entity.start_line,
                complexity,
                threshold,
                severity,
                message: format!(
                    "Added code in `{}` has an estimated cyclomatic complexity of {complexity} (threshold {threshold})",
                    entity.name
                ),
                suggestion: Some("Extract branches into smaller functions or use early returns".to_string()),
            }));
        }

        Ok(findings)
    }
}

/// `1 + branch tokens`, ignoring comment-only lines.
pub fn estimate_complexity<'a>(lines: impl IntoIterator<Item = &'a DiffLine>) -> u32 {
    let Some(re) = BRANCH_TOKENS.as_ref() else {
        return 1;
    };
    let branches: usize = lines
        .into_iter()
        .map(|l| l.content.trim_start())
        .filter(|c| !is_comment(c))
        .map(|c| re.find_iter(c).count())
        .sum();
    1 + branches as u32
}

fn is_comment(line: &str) -> bool {
    line.starts_with("//") || line.starts_with('#') || line.starts_with("/*") || line.starts_with('*')
}
