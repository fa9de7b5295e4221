//! Test: changed code without a test among its direct callers.

use vigil_core::errors::CheckError;
use vigil_core::types::{CheckKind, Finding, Severity, TestFinding};

use super::types::{Check, CheckContext};

pub struct TestCoverageCheck;

impl Check for TestCoverageCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Test
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut findings = Vec::new();

        for entity in ctx.entities {
            if !entity.kind.is_callable() || entity.is_in_test_file() {
                continue;
            }
            let callers = ctx.store.get_callers_of(ctx.org_id, &entity.id)?;
            if callers.iter().any(|c| c.is_in_test_file()) {
                continue;
            }

            let (severity, message) = if callers.is_empty() {
                (
                    Severity::Low,
                    format!("No callers known for `{}`, so no test could be associated", entity.name),
                )
            } else {
                (
                    Severity::Medium,
                    format!(
                        "`{}` changed but none of its {} direct caller(s) is a test",
                        entity.name,
                        callers.len()
                    ),
                )
            };

            findings.push(Finding::Test(TestFinding {
                entity_id: entity.id.clone(),
                entity_name: entity.name.clone(),
                file_path: entity.file_path.clone(),
                line: entity.start_line,
                severity,
                message,
                suggestion: Some(format!(
                    "Add a test that exercises `{}` directly",
                    entity.name
                )),
            }));
        }

        Ok(findings)
    }
}
