//! Review verdict.

use vigil_core::types::{ReviewFindings, ReviewVerdict};

/// `request_changes` on any blocking finding (high severity or a
/// block-enforced rule match), `comment` on any finding, else `approve`.
pub fn decide_verdict(findings: &ReviewFindings) -> ReviewVerdict {
    if findings.has_blocking() {
        ReviewVerdict::RequestChanges
    } else if !findings.is_empty() {
        ReviewVerdict::Comment
    } else {
        ReviewVerdict::Approve
    }
}
