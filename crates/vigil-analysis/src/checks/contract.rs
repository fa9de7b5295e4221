//! Contract: changes reachable from externally exposed API boundaries.

use vigil_core::errors::CheckError;
use vigil_core::types::{CheckKind, ContractFinding, Finding, Severity};

use super::types::{Check, CheckContext};

pub struct ContractCheck;

impl Check for ContractCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Contract
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut findings = Vec::new();

        for summary in ctx.summaries {
            let entity = &summary.entity;
            for hit in summary
                .upstream_boundaries
                .iter()
                .filter(|b| ctx.api_boundary_kinds.contains(&b.entity.kind))
            {
                findings.push(Finding::Contract(ContractFinding {
                    entity_id: entity.id.clone(),
                    entity_name: entity.name.clone(),
                    file_path: entity.file_path.clone(),
                    line: entity.line,
                    boundary_id: hit.entity.id.clone(),
                    boundary_name: hit.entity.name.clone(),
                    boundary_kind: hit.entity.kind.clone(),
                    depth: hit.depth,
                    caller_count: summary.caller_count,
                    severity: contract_severity(summary.caller_count),
                    message: format!(
                        "`{}` is reachable from {} `{}` ({} hop(s) upstream); verify the contract still holds",
                        entity.name, hit.entity.kind, hit.entity.name, hit.depth
                    ),
                }));
            }
        }

        Ok(findings)
    }
}

pub fn contract_severity(caller_count: u32) -> Severity {
    match caller_count {
        n if n >= 10 => Severity::High,
        n if n >= 3 => Severity::Medium,
        _ => Severity::Low,
    }
}
