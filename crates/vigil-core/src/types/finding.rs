//! Findings: one record type per check, grouped by check for presentation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::collections::SmallVec5;
use super::entity::{EntityId, EntityKind};
use super::rule::Enforcement;

/// Severity of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of checks. Adding a check means extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Impact,
    Contract,
    Pattern,
    Test,
    Complexity,
    Dependency,
    TrustBoundary,
    Env,
    Idempotency,
}

impl CheckKind {
    pub const ALL: &'static [CheckKind] = &[
        Self::Impact,
        Self::Contract,
        Self::Pattern,
        Self::Test,
        Self::Complexity,
        Self::Dependency,
        Self::TrustBoundary,
        Self::Env,
        Self::Idempotency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Impact => "impact",
            Self::Contract => "contract",
            Self::Pattern => "pattern",
            Self::Test => "test",
            Self::Complexity => "complexity",
            Self::Dependency => "dependency",
            Self::TrustBoundary => "trust_boundary",
            Self::Env => "env",
            Self::Idempotency => "idempotency",
        }
    }

    /// Heading used when rendering a group of findings.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Impact => "Impact",
            Self::Contract => "API contracts",
            Self::Pattern => "Rules & patterns",
            Self::Test => "Test coverage",
            Self::Complexity => "Complexity",
            Self::Dependency => "Dependencies",
            Self::TrustBoundary => "Trust boundaries",
            Self::Env => "Environment",
            Self::Idempotency => "Idempotency",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller named by an impact finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerRef {
    pub id: EntityId,
    pub name: String,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactFinding {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub file_path: String,
    pub line: u32,
    pub caller_count: u32,
    /// At most five callers, in graph-store order.
    pub top_callers: SmallVec5<CallerRef>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFinding {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub file_path: String,
    pub line: u32,
    pub boundary_id: EntityId,
    pub boundary_name: String,
    pub boundary_kind: EntityKind,
    pub depth: u32,
    pub caller_count: u32,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFinding {
    pub rule_id: String,
    pub rule_title: String,
    pub enforcement: Enforcement,
    pub file_path: String,
    pub line: u32,
    pub matched_code: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFinding {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub file_path: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityFinding {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub file_path: String,
    pub line: u32,
    pub complexity: u32,
    pub threshold: u32,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyFinding {
    pub file_path: String,
    pub line: u32,
    pub ecosystem: String,
    /// Declared dependency, or `None` for manifest-level findings.
    pub dependency: Option<String>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustBoundaryFinding {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub file_path: String,
    pub line: u32,
    pub sink: String,
    pub boundary_name: String,
    pub boundary_depth: u32,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvFinding {
    pub file_path: String,
    pub line: u32,
    pub variable: String,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyFinding {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub file_path: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

/// A single finding, tagged by the check that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Finding {
    Impact(ImpactFinding),
    Contract(ContractFinding),
    Pattern(PatternFinding),
    Test(TestFinding),
    Complexity(ComplexityFinding),
    Dependency(DependencyFinding),
    TrustBoundary(TrustBoundaryFinding),
    Env(EnvFinding),
    Idempotency(IdempotencyFinding),
}

macro_rules! finding_field {
    ($self:ident, $field:ident) => {
        match $self {
            Finding::Impact(f) => &f.$field,
            Finding::Contract(f) => &f.$field,
            Finding::Pattern(f) => &f.$field,
            Finding::Test(f) => &f.$field,
            Finding::Complexity(f) => &f.$field,
            Finding::Dependency(f) => &f.$field,
            Finding::TrustBoundary(f) => &f.$field,
            Finding::Env(f) => &f.$field,
            Finding::Idempotency(f) => &f.$field,
        }
    };
}

impl Finding {
    pub fn check(&self) -> CheckKind {
        match self {
            Self::Impact(_) => CheckKind::Impact,
            Self::Contract(_) => CheckKind::Contract,
            Self::Pattern(_) => CheckKind::Pattern,
            Self::Test(_) => CheckKind::Test,
            Self::Complexity(_) => CheckKind::Complexity,
            Self::Dependency(_) => CheckKind::Dependency,
            Self::TrustBoundary(_) => CheckKind::TrustBoundary,
            Self::Env(_) => CheckKind::Env,
            Self::Idempotency(_) => CheckKind::Idempotency,
        }
    }

    pub fn file_path(&self) -> &str {
        finding_field!(self, file_path)
    }

    pub fn line(&self) -> u32 {
        *finding_field!(self, line)
    }

    pub fn message(&self) -> &str {
        finding_field!(self, message)
    }

    pub fn severity(&self) -> Severity {
        *finding_field!(self, severity)
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Test(f) => f.suggestion.as_deref(),
            Self::Complexity(f) => f.suggestion.as_deref(),
            Self::Env(f) => f.suggestion.as_deref(),
            Self::Idempotency(f) => f.suggestion.as_deref(),
            _ => None,
        }
    }

    /// Whether this finding should block the change.
    pub fn is_blocking(&self) -> bool {
        match self {
            Self::Pattern(p) => p.enforcement == Enforcement::Block,
            other => other.severity() == Severity::High,
        }
    }
}

/// A check that failed while the others completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub check: CheckKind,
    pub code: String,
    pub message: String,
}

/// Findings grouped by check. Every check has an entry, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewFindings {
    groups: BTreeMap<CheckKind, Vec<Finding>>,
}

impl Default for ReviewFindings {
    fn default() -> Self {
        Self::empty()
    }
}

impl ReviewFindings {
    /// An explicit "no findings" result: every check present with an empty list.
    pub fn empty() -> Self {
        Self {
            groups: CheckKind::ALL.iter().map(|k| (*k, Vec::new())).collect(),
        }
    }

    /// Record the findings of one check, replacing any previous list for it.
    /// Findings tagged with another check are dropped.
    pub fn set(&mut self, check: CheckKind, findings: Vec<Finding>) {
        let owned = findings.into_iter().filter(|f| f.check() == check).collect();
        self.groups.insert(check, owned);
    }

    pub fn get(&self, check: CheckKind) -> &[Finding] {
        self.groups.get(&check).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Groups in check order, including empty ones.
    pub fn groups(&self) -> impl Iterator<Item = (CheckKind, &[Finding])> {
        CheckKind::ALL.iter().map(move |k| (*k, self.get(*k)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.groups.values().flatten()
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn has_blocking(&self) -> bool {
        self.iter().any(Finding::is_blocking)
    }
}
