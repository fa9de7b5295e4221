//! Pattern: enforced rules matched against the added lines of the change.

use std::collections::BTreeMap;

use vigil_core::errors::CheckError;
use vigil_core::traits::{NoopProgress, ScanRequest};
use vigil_core::types::{CheckKind, Enforcement, Finding, PatternFinding, Rule, Severity};

use super::types::{Check, CheckContext};

pub struct PatternCheck;

impl Check for PatternCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Pattern
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut rules: Vec<&Rule> = ctx.rules.iter().filter(|r| r.status.is_enforced()).collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

        let (Some(matcher), Some(workspace)) = (ctx.matcher, ctx.workspace) else {
            let findings = not_evaluated(ctx, &rules);
            if !findings.is_empty() {
                tracing::warn!(rules = findings.len(), "no matcher or workspace, enforced rules not evaluated");
            }
            return Ok(findings);
        };

        let mut findings = Vec::new();
        for rule in rules {
            for (language, paths) in covered_files(ctx, rule) {
                let request = ScanRequest {
                    workspace: workspace.to_path_buf(),
                    query: rule.structural_query.clone(),
                    language: language.to_string(),
                    paths,
                };
                for m in matcher.scan(&request, &NoopProgress, ctx.cancel)? {
                    let on_added_line = ctx
                        .changed_file(&m.file)
                        .is_some_and(|f| f.has_added_line(m.line));
                    if !on_added_line {
                        continue;
                    }
                    findings.push(Finding::Pattern(PatternFinding {
                        rule_id: rule.id.clone(),
                        rule_title: rule.title.clone(),
                        enforcement: rule.enforcement,
                        file_path: m.file,
                        line: m.line,
                        matched_code: m.matched_code,
                        severity: enforcement_severity(rule.enforcement),
                        message: if rule.description.is_empty() {
                            rule.title.clone()
                        } else {
                            format!("{}: {}", rule.title, rule.description)
                        },
                    }));
                }
            }
        }

        Ok(findings)
    }
}

/// Files with added lines the rule covers, grouped by language so each
/// language is scanned once.
fn covered_files<'c>(ctx: &'c CheckContext<'_>, rule: &Rule) -> BTreeMap<&'c str, Vec<String>> {
    let mut by_language: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for file in ctx.changes.live_files() {
        if file.added_lines.is_empty() {
            continue;
        }
        let Some(language) = file.language() else { continue };
        if rule.applies_to(&file.path, Some(language)) {
            by_language.entry(language).or_default().push(file.path.clone());
        }
    }
    by_language
}

/// One low-severity finding per enforced rule that covers the change but
/// could not be run.
fn not_evaluated(ctx: &CheckContext<'_>, rules: &[&Rule]) -> Vec<Finding> {
    rules
        .iter()
        .filter_map(|rule| {
            let first = covered_files(ctx, rule).into_values().flatten().min()?;
            Some(Finding::Pattern(PatternFinding {
                rule_id: rule.id.clone(),
                rule_title: rule.title.clone(),
                enforcement: rule.enforcement,
                file_path: first,
                line: 0,
                matched_code: String::new(),
                severity: Severity::Low,
                message: format!(
                    "Rule `{}` was not evaluated: no pattern matcher or workspace is available",
                    rule.title
                ),
            }))
        })
        .collect()
}

pub fn enforcement_severity(enforcement: Enforcement) -> Severity {
    match enforcement {
        Enforcement::Block => Severity::High,
        Enforcement::Warn => Severity::Medium,
        Enforcement::Suggest => Severity::Low,
    }
}
