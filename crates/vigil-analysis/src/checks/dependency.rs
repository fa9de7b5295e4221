//! Dependency: new declarations in package manifests, and manifests changed
//! without their lockfile.

use std::sync::LazyLock;

use regex::Regex;
use vigil_core::errors::CheckError;
use vigil_core::types::{ChangedFile, CheckKind, DependencyFinding, Finding, Severity};

use super::types::{Check, CheckContext};

/// A manifest format the check understands.
struct Manifest {
    file_name: &'static str,
    ecosystem: &'static str,
    /// Any of these in the same directory counts as the lockfile.
    lockfiles: &'static [&'static str],
    declaration: &'static LazyLock<Option<Regex>>,
}

macro_rules! decl_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

decl_pattern!(RE_TOML_KEY, r#"^\s*([A-Za-z0-9_.-]+)\s*=\s*(?:"[^"]*"|\{.*\})\s*$"#);
decl_pattern!(RE_JSON_KEY, r#"^\s*"(@?[A-Za-z0-9_./-]+)"\s*:\s*"[^"]*"\s*,?\s*$"#);
decl_pattern!(RE_REQUIREMENT, r"^\s*([A-Za-z0-9][A-Za-z0-9_.-]*)\s*(?:\[[^\]]*\])?\s*(?:[=<>~!]=?.*)?$");
decl_pattern!(RE_PEP508, r#"^\s*"([A-Za-z0-9][A-Za-z0-9_.-]*)\s*(?:\[[^\]]*\])?\s*[=<>~!]"#);
decl_pattern!(RE_GO_REQUIRE, r"^\s*(?:require\s+)?([A-Za-z0-9.-]+\.[A-Za-z]+/[A-Za-z0-9_./-]+)\s+v\d");
decl_pattern!(RE_MAVEN_ARTIFACT, r"<artifactId>\s*([^<\s]+)\s*</artifactId>");
decl_pattern!(
    RE_GRADLE,
    r#"^\s*(?:implementation|api|compileOnly|runtimeOnly|testImplementation|kapt|annotationProcessor)\s*\(?\s*['"]([^'"]+)['"]"#
);
decl_pattern!(RE_GEM, r#"^\s*gem\s+['"]([^'"]+)['"]"#);

static MANIFESTS: &[Manifest] = &[
    Manifest { file_name: "Cargo.toml", ecosystem: "cargo", lockfiles: &["Cargo.lock"], declaration: &RE_TOML_KEY },
    Manifest {
        file_name: "package.json",
        ecosystem: "npm",
        lockfiles: &["package-lock.json", "yarn.lock", "pnpm-lock.yaml", "bun.lockb"],
        declaration: &RE_JSON_KEY,
    },
    Manifest { file_name: "requirements.txt", ecosystem: "pip", lockfiles: &[], declaration: &RE_REQUIREMENT },
    Manifest {
        file_name: "pyproject.toml",
        ecosystem: "python",
        lockfiles: &["poetry.lock", "uv.lock", "pdm.lock"],
        declaration: &RE_PEP508,
    },
    Manifest { file_name: "go.mod", ecosystem: "go", lockfiles: &["go.sum"], declaration: &RE_GO_REQUIRE },
    Manifest { file_name: "pom.xml", ecosystem: "maven", lockfiles: &[], declaration: &RE_MAVEN_ARTIFACT },
    Manifest { file_name: "build.gradle", ecosystem: "gradle", lockfiles: &[], declaration: &RE_GRADLE },
    Manifest { file_name: "build.gradle.kts", ecosystem: "gradle", lockfiles: &[], declaration: &RE_GRADLE },
    Manifest { file_name: "Gemfile", ecosystem: "bundler", lockfiles: &["Gemfile.lock"], declaration: &RE_GEM },
];

/// Keys that look like declarations but describe the package itself.
const METADATA_KEYS: &[&str] = &[
    "name", "version", "edition", "description", "license", "authors", "readme", "homepage",
    "repository", "documentation", "keywords", "categories", "rust-version", "publish", "main",
    "module", "types", "private", "type", "resolver", "workspace", "build", "exclude", "include",
    "requires-python", "python", "test", "start", "lint", "dev", "format", "prepare",
];

pub struct DependencyCheck;

impl Check for DependencyCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Dependency
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut findings = Vec::new();

        for file in ctx.changes.files.iter() {
            let Some(manifest) = MANIFESTS.iter().find(|m| m.file_name == file.file_name()) else {
                continue;
            };
            if file.added_lines.is_empty() && file.removed_lines.is_empty() {
                continue;
            }

            for (line, name) in added_declarations(manifest, file) {
                findings.push(Finding::Dependency(DependencyFinding {
                    file_path: file.path.clone(),
                    line,
                    ecosystem: manifest.ecosystem.to_string(),
                    message: format!("New {} dependency `{name}`; confirm it is vetted and maintained", manifest.ecosystem),
                    dependency: Some(name),
                    severity: Severity::Low,
                }));
            }

            if !manifest.lockfiles.is_empty() && !lockfile_changed(ctx, file, manifest) {
                findings.push(Finding::Dependency(DependencyFinding {
                    file_path: file.path.clone(),
                    line: first_changed_line(file),
                    ecosystem: manifest.ecosystem.to_string(),
                    dependency: None,
                    severity: Severity::Medium,
                    message: format!(
                        "{} changed without a matching {} update",
                        manifest.file_name,
                        manifest.lockfiles.join(" / ")
                    ),
                }));
            }
        }

        Ok(findings)
    }
}

fn added_declarations(manifest: &Manifest, file: &ChangedFile) -> Vec<(u32, String)> {
    let Some(re) = manifest.declaration.as_ref() else {
        return Vec::new();
    };
    file.added_lines
        .iter()
        .filter(|l| {
            let t = l.content.trim_start();
            !t.is_empty() && !t.starts_with('#') && !t.starts_with("//") && !t.starts_with('-')
        })
        .filter_map(|l| {
            let name = re.captures(&l.content)?.get(1)?.as_str();
            if METADATA_KEYS.contains(&name) {
                return None;
            }
            Some((l.line, name.to_string()))
        })
        .collect()
}

fn lockfile_changed(ctx: &CheckContext<'_>, manifest_file: &ChangedFile, manifest: &Manifest) -> bool {
    let dir = parent_dir(&manifest_file.path);
    ctx.changes
        .files
        .iter()
        .any(|f| parent_dir(&f.path) == dir && manifest.lockfiles.contains(&f.file_name()))
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn first_changed_line(file: &ChangedFile) -> u32 {
    file.added_lines
        .iter()
        .chain(file.removed_lines.iter())
        .map(|l| l.line)
        .min()
        .unwrap_or(1)
}
