//! Markdown rendering of findings, grouped by check.

use std::collections::BTreeMap;
use std::fmt::Write;

use vigil_core::types::{
    ChangeSet, CheckFailure, CheckKind, Finding, PullRequestRef, ReviewComment, ReviewFindings,
    ReviewSubmission, ReviewVerdict, Severity,
};

use super::verdict::decide_verdict;

/// Stable key for posting the review of `review_id`.
pub fn review_idempotency_key(review_id: &str) -> String {
    format!("vigil-review-{review_id}")
}

/// Stable key for posting the failure notice of `review_id`.
pub fn failure_idempotency_key(review_id: &str) -> String {
    format!("vigil-review-{review_id}-failed")
}

/// One comment per finding, every check present. A comment is inline when
/// `changes` shows its line as added.
pub fn render_comments(
    findings: &ReviewFindings,
    changes: Option<&ChangeSet>,
) -> BTreeMap<CheckKind, Vec<ReviewComment>> {
    findings
        .groups()
        .map(|(check, list)| {
            let comments = list
                .iter()
                .map(|f| ReviewComment {
                    check,
                    file_path: f.file_path().to_string(),
                    line: f.line(),
                    severity: f.severity(),
                    body: comment_body(f),
                    inline: changes
                        .and_then(|c| c.file(f.file_path()))
                        .is_some_and(|file| file.has_added_line(f.line())),
                })
                .collect();
            (check, comments)
        })
        .collect()
}

/// Assemble the submission for one review.
///
/// When `has_changes` is false the review states so explicitly and carries an
/// empty list for every check.
pub fn build_submission(
    pull: &PullRequestRef,
    review_id: &str,
    findings: &ReviewFindings,
    check_errors: &[CheckFailure],
    has_changes: bool,
    changes: Option<&ChangeSet>,
) -> ReviewSubmission {
    let empty = ReviewFindings::empty();
    let findings = if has_changes { findings } else { &empty };
    let verdict = decide_verdict(findings);

    ReviewSubmission {
        pull: pull.clone(),
        review_id: review_id.to_string(),
        idempotency_key: review_idempotency_key(review_id),
        verdict,
        body: render_body(findings, verdict, check_errors, has_changes),
        groups: render_comments(findings, changes),
    }
}

fn render_body(
    findings: &ReviewFindings,
    verdict: ReviewVerdict,
    check_errors: &[CheckFailure],
    has_changes: bool,
) -> String {
    let mut out = String::from("## Vigil review\n\n");

    if !has_changes {
        out.push_str("No reviewable changes in this pull request. No findings.\n");
        return out;
    }
    if findings.is_empty() {
        out.push_str("No findings.\n");
    } else {
        let _ = writeln!(
            out,
            "**{}** finding(s), verdict: `{}`\n",
            findings.total(),
            verdict.as_str()
        );
        out.push_str("| Check | Findings | High |\n|---|---|---|\n");
        for (check, list) in findings.groups().filter(|(_, l)| !l.is_empty()) {
            let high = list.iter().filter(|f| f.severity() == Severity::High).count();
            let _ = writeln!(out, "| {} | {} | {} |", check.title(), list.len(), high);
        }
    }

    if !check_errors.is_empty() {
        out.push_str("\n**Checks that could not run:**\n");
        for failure in check_errors {
            let _ = writeln!(out, "- {}: {}", failure.check.title(), failure.message);
        }
    }
    out
}

fn comment_body(finding: &Finding) -> String {
    let mut body = format!(
        "**[{}] {}**: {}",
        finding.severity(),
        finding.check().title(),
        finding.message()
    );
    match finding {
        Finding::Impact(f) if !f.top_callers.is_empty() => {
            body.push_str("\n\nCallers:");
            for caller in &f.top_callers {
                let _ = write!(body, "\n- `{}` ({})", caller.name, caller.file_path);
            }
        }
        Finding::Pattern(f) if !f.matched_code.is_empty() => {
            let _ = write!(body, "\n\n```\n{}\n```", f.matched_code.trim_end());
        }
        _ => {}
    }
    if let Some(suggestion) = finding.suggestion() {
        let _ = write!(body, "\n\n> Suggestion: {suggestion}");
    }
    body
}
