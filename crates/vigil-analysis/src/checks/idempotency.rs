//! Idempotency: webhook-driven code must tolerate redelivery.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use vigil_core::errors::CheckError;
use vigil_core::types::{CheckKind, EntityKind, Finding, IdempotencyFinding, Severity};

use super::types::{Check, CheckContext};

const MARKERS: &[&str] = &[
    "idempoten",
    "delivery_id",
    "deliveryid",
    "delivery-id",
    "x-github-delivery",
    "event_id",
    "eventid",
    "dedup",
    "upsert",
    "on conflict",
    "on duplicate key",
    "insert or ignore",
    "insert or replace",
    "if not exists",
    "already processed",
    "processed_events",
    "setnx",
];

static MARKER_MATCHER: LazyLock<Option<AhoCorasick>> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(MARKERS)
        .ok()
});

pub struct IdempotencyCheck;

impl Check for IdempotencyCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Idempotency
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let Some(markers) = MARKER_MATCHER.as_ref() else {
            return Err(CheckError::MalformedInput("idempotency markers failed to compile".to_string()));
        };
        let mut findings = Vec::new();

        for summary in ctx.summaries {
            let entity = &summary.entity;
            let webhook_driven = entity.kind == EntityKind::WebhookHandler
                || summary
                    .nearest_boundary()
                    .is_some_and(|b| b.entity.kind == EntityKind::WebhookHandler);
            if !webhook_driven {
                continue;
            }
            let Some(full) = ctx.entity(summary) else { continue };
            let added = ctx.added_lines_of(full);
            if added.is_empty() || added.iter().any(|l| markers.is_match(&l.content)) {
                continue;
            }

            findings.push(Finding::Idempotency(IdempotencyFinding {
                entity_id: entity.id.clone(),
                entity_name: entity.name.clone(),
                file_path: entity.file_path.clone(),
                line: added.first().map_or(entity.line, |l| l.line),
                severity: Severity::Medium,
                message: format!(
                    "`{}` runs on webhook delivery but the change carries no idempotency guard",
                    entity.name
                ),
                suggestion: Some(
                    "Key processing on the delivery id, or make writes upserts so redelivery is harmless"
                        .to_string(),
                ),
            }));
        }

        Ok(findings)
    }
}
