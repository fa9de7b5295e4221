//! Trust boundary: dangerous sinks added to code reachable from outside.

use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, MatchKind};
use vigil_core::errors::CheckError;
use vigil_core::types::{CheckKind, Finding, FxHashSet, Severity, TrustBoundaryFinding};

use super::types::{Check, CheckContext};

/// `(needle, sink category)`. Matching is case-sensitive.
const SINKS: &[(&str, &str)] = &[
    // raw SQL
    ("$queryRawUnsafe", "raw SQL execution"),
    ("$executeRawUnsafe", "raw SQL execution"),
    ("sequelize.query(", "raw SQL execution"),
    ("cursor.execute(", "raw SQL execution"),
    (".executeQuery(", "raw SQL execution"),
    (".createNativeQuery(", "raw SQL execution"),
    ("db.Exec(", "raw SQL execution"),
    ("db.Query(", "raw SQL execution"),
    ("sql_query(", "raw SQL execution"),
    ("FromSqlRaw(", "raw SQL execution"),
    // eval / exec
    ("eval(", "dynamic code evaluation"),
    ("new Function(", "dynamic code evaluation"),
    ("exec(", "dynamic code evaluation"),
    ("instance_eval", "dynamic code evaluation"),
    // shell
    ("child_process", "shell command"),
    ("execSync(", "shell command"),
    ("spawn(", "shell command"),
    ("os.system(", "shell command"),
    ("subprocess.", "shell command"),
    ("shell=True", "shell command"),
    ("Runtime.getRuntime().exec", "shell command"),
    ("ProcessBuilder(", "shell command"),
    ("exec.Command(", "shell command"),
    ("Command::new(", "shell command"),
    ("shell_exec(", "shell command"),
    // HTML
    ("innerHTML", "HTML injection"),
    ("outerHTML", "HTML injection"),
    ("dangerouslySetInnerHTML", "HTML injection"),
    ("document.write(", "HTML injection"),
    ("v-html", "HTML injection"),
    ("html_safe", "HTML injection"),
    ("mark_safe(", "HTML injection"),
    // deserialisation
    ("pickle.loads(", "unsafe deserialisation"),
    ("pickle.load(", "unsafe deserialisation"),
    ("yaml.load(", "unsafe deserialisation"),
    ("Marshal.load", "unsafe deserialisation"),
    ("unserialize(", "unsafe deserialisation"),
    ("ObjectInputStream", "unsafe deserialisation"),
    ("BinaryFormatter", "unsafe deserialisation"),
    ("node-serialize", "unsafe deserialisation"),
];

static SINK_MATCHER: LazyLock<Option<AhoCorasick>> = LazyLock::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(SINKS.iter().map(|(needle, _)| *needle))
        .ok()
});

pub struct TrustBoundaryCheck;

impl Check for TrustBoundaryCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::TrustBoundary
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let Some(matcher) = SINK_MATCHER.as_ref() else {
            return Err(CheckError::MalformedInput("sink table failed to compile".to_string()));
        };
        let mut findings = Vec::new();

        for summary in ctx.summaries {
            let entity = &summary.entity;
            // An exposed entity is its own boundary at depth zero.
            let (boundary_name, boundary_depth) = if ctx.api_boundary_kinds.contains(&entity.kind) {
                (entity.name.clone(), 0)
            } else {
                match summary.nearest_boundary() {
                    Some(hit) => (hit.entity.name.clone(), hit.depth),
                    None => continue,
                }
            };
            let Some(full) = ctx.entity(summary) else { continue };

            let mut reported: FxHashSet<(u32, &str)> = FxHashSet::default();
            for line in ctx.added_lines_of(full) {
                for m in matcher.find_iter(&line.content) {
                    let (needle, category) = SINKS[m.pattern().as_usize()];
                    if !at_word_start(&line.content, m.start(), needle) {
                        continue;
                    }
                    if !reported.insert((line.line, category)) {
                        continue;
                    }
                    findings.push(Finding::TrustBoundary(TrustBoundaryFinding {
                        entity_id: entity.id.clone(),
                        entity_name: entity.name.clone(),
                        file_path: entity.file_path.clone(),
                        line: line.line,
                        sink: category.to_string(),
                        boundary_name: boundary_name.clone(),
                        boundary_depth,
                        severity: Severity::High,
                        message: format!(
                            "{category} (`{}`) added in `{}`, reachable from `{boundary_name}` at depth {boundary_depth}",
                            needle.trim_end_matches('('),
                            entity.name
                        ),
                    }));
                }
            }
        }

        Ok(findings)
    }
}

/// Identifier-like needles must not be the tail of a longer identifier
/// (`retrieval(` is not `eval(`).
fn at_word_start(content: &str, start: usize, needle: &str) -> bool {
    if !needle.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return true;
    }
    content[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
}
