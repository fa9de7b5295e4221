//! Env: environment variables read by new code but not documented in an
//! example env file of the same change.

use std::sync::LazyLock;

use regex::Regex;
use vigil_core::errors::CheckError;
use vigil_core::types::{CheckKind, EnvFinding, Finding, FxHashSet, Severity};

use super::types::{Check, CheckContext};

/// Example env files whose added lines count as declarations.
pub const ENV_EXAMPLE_FILES: &[&str] = &[".env.example", ".env.sample", ".env.template"];

/// Provided by every runtime; never worth documenting.
const AMBIENT_VARS: &[&str] = &["NODE_ENV", "HOME", "PATH", "PWD", "USER", "SHELL", "TMPDIR", "CI"];

static RE_REFERENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?:process\.env|import\.meta\.env)\.([A-Z_][A-Z0-9_]*)"#,
        r#"|process\.env\[\s*['"]([A-Z_][A-Z0-9_]*)['"]\s*\]"#,
        r#"|os\.environ(?:\.get)?\s*[\[(]\s*['"]([A-Z_][A-Z0-9_]*)['"]"#,
        r#"|(?:os\.getenv|os\.Getenv|System\.getenv|getenv|env::var|env::var_os|std::env::var)\s*\(\s*"?'?([A-Z_][A-Z0-9_]*)['"]"#,
        r#"|ENV(?:\.fetch\(|\[)\s*['"]([A-Z_][A-Z0-9_]*)['"]"#,
    ))
    .ok()
});

static RE_DECLARATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(?:export\s+)?([A-Z_][A-Z0-9_]*)\s*=").ok());

pub struct EnvCheck;

impl Check for EnvCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Env
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let (Some(reference), Some(declaration)) = (RE_REFERENCE.as_ref(), RE_DECLARATION.as_ref()) else {
            return Err(CheckError::MalformedInput("env patterns failed to compile".to_string()));
        };

        let declared: FxHashSet<&str> = ctx
            .changes
            .live_files()
            .filter(|f| ENV_EXAMPLE_FILES.contains(&f.file_name()))
            .flat_map(|f| f.added_lines.iter())
            .filter_map(|l| declaration.captures(&l.content)?.get(1).map(|m| m.as_str()))
            .collect();

        let mut findings = Vec::new();
        for file in ctx.changes.live_files() {
            if file.file_name().starts_with(".env") {
                continue;
            }
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            for line in &file.added_lines {
                for caps in reference.captures_iter(&line.content) {
                    let Some(var) = caps.iter().skip(1).flatten().next().map(|m| m.as_str()) else {
                        continue;
                    };
                    if AMBIENT_VARS.contains(&var) || declared.contains(var) || !seen.insert(var) {
                        continue;
                    }
                    findings.push(Finding::Env(EnvFinding {
                        file_path: file.path.clone(),
                        line: line.line,
                        variable: var.to_string(),
                        severity: Severity::Medium,
                        message: format!("`{var}` is read here but not declared in an example env file"),
                        suggestion: Some(format!("Add `{var}=` to .env.example with a safe placeholder")),
                    }));
                }
            }
        }

        Ok(findings)
    }
}
