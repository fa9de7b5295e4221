//! Domain types shared across the workspace.

pub mod blast_radius;
pub mod collections;
pub mod diff;
pub mod drift;
pub mod entity;
pub mod finding;
pub mod impact_report;
pub mod ledger;
pub mod pattern;
pub mod review;
pub mod rule;
pub mod workflow;

pub use blast_radius::{BlastRadiusSummary, BoundaryHit, EntityRef};
pub use collections::{FxHashMap, FxHashSet, SmallVec5};
pub use diff::{ChangeSet, ChangedFile, DiffLine, FileStatus, PullRequestRef};
pub use drift::{DriftCategory, DriftScore, DriftSummary};
pub use entity::{Entity, EntityId, EntityKind};
pub use finding::{
    CallerRef, CheckFailure, CheckKind, ComplexityFinding, ContractFinding, DependencyFinding,
    EnvFinding, Finding, IdempotencyFinding, ImpactFinding, PatternFinding, ReviewFindings,
    Severity, TestFinding, TrustBoundaryFinding,
};
pub use impact_report::{ImpactMatch, ImpactReportDoc};
pub use ledger::{LedgerEntry, LedgerKind, LedgerPage, LedgerSummary};
pub use pattern::{Pattern, PatternStatus};
pub use review::{ReviewComment, ReviewRecord, ReviewStatus, ReviewSubmission, ReviewVerdict};
pub use rule::{Enforcement, Rule, RulePatch, RuleQuery, RuleScope, RuleStatus, RuleType};
pub use workflow::{WorkflowKind, WorkflowRecord, TERMINAL_STATES};
