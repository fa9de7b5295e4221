//! Impact: changes with a wide transitive caller set.

use vigil_core::constants::MAX_LISTED_CALLERS;
use vigil_core::errors::CheckError;
use vigil_core::types::{CallerRef, CheckKind, Finding, ImpactFinding, Severity, SmallVec5};

use super::types::{Check, CheckContext};

pub struct ImpactCheck;

impl Check for ImpactCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Impact
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let threshold = ctx.config.impact_threshold;
        let mut findings = Vec::new();

        for summary in ctx.summaries {
            if summary.caller_count < threshold {
                continue;
            }
            let entity = &summary.entity;
            // First direct callers in store order; any beyond that are omitted.
            let top_callers: SmallVec5<CallerRef> = ctx
                .store
                .get_callers_of(ctx.org_id, &entity.id)?
                .into_iter()
                .take(MAX_LISTED_CALLERS)
                .map(|c| CallerRef {
                    id: c.id,
                    name: c.name,
                    file_path: c.file_path,
                })
                .collect();

            findings.push(Finding::Impact(ImpactFinding {
                entity_id: entity.id.clone(),
                entity_name: entity.name.clone(),
                file_path: entity.file_path.clone(),
                line: entity.line,
                caller_count: summary.caller_count,
                severity: impact_severity(summary.caller_count, threshold),
                message: format!(
                    "`{}` has {} transitive caller(s); changes here ripple widely",
                    entity.name, summary.caller_count
                ),
                top_callers,
            }));
        }

        Ok(findings)
    }
}

/// `>= 4x` threshold is high, `>= 2x` medium, anything else low.
pub fn impact_severity(caller_count: u32, threshold: u32) -> Severity {
    let count = u64::from(caller_count);
    let threshold = u64::from(threshold);
    if count >= threshold * 4 {
        Severity::High
    } else if count >= threshold * 2 {
        Severity::Medium
    } else {
        Severity::Low
    }
}
