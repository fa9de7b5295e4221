//! Indexed code entities and their content-addressed identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;

/// Content-addressed entity identifier: xxh3-128 over repo, path, kind and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Compute the stable id for an entity.
    pub fn compute(repo_id: &str, file_path: &str, kind: &EntityKind, name: &str) -> Self {
        let key = format!("{repo_id}\0{file_path}\0{}\0{name}", kind.as_str());
        Self(format!("{:032x}", xxh3_128(key.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of an indexed code unit.
///
/// Open enumeration: kinds produced by a newer indexer round-trip through
/// `Other` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    File,
    Function,
    Method,
    Class,
    ApiRoute,
    WebhookHandler,
    ScheduledJob,
    MessageConsumer,
    Other(String),
}

impl EntityKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::File => "file",
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::ApiRoute => "api_route",
            Self::WebhookHandler => "webhook_handler",
            Self::ScheduledJob => "scheduled_job",
            Self::MessageConsumer => "message_consumer",
            Self::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "file" => Self::File,
            "function" => Self::Function,
            "method" => Self::Method,
            "class" => Self::Class,
            "api_route" => Self::ApiRoute,
            "webhook_handler" => Self::WebhookHandler,
            "scheduled_job" => Self::ScheduledJob,
            "message_consumer" => Self::MessageConsumer,
            other => Self::Other(other.to_string()),
        }
    }

    /// Kinds that carry executable code and can be tested or measured.
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Self::Function
                | Self::Method
                | Self::ApiRoute
                | Self::WebhookHandler
                | Self::ScheduledJob
                | Self::MessageConsumer
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EntityKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A named code unit owned by the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub org_id: String,
    pub repo_id: String,
    pub kind: EntityKind,
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl Entity {
    /// Build an entity, deriving its content-addressed id.
    pub fn new(
        org_id: &str,
        repo_id: &str,
        kind: EntityKind,
        name: &str,
        file_path: &str,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        Self {
            id: EntityId::compute(repo_id, file_path, &kind, name),
            org_id: org_id.to_string(),
            repo_id: repo_id.to_string(),
            kind,
            name: name.to_string(),
            file_path: file_path.to_string(),
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// Whether `line` falls inside this entity's span (inclusive).
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    pub fn is_in_test_file(&self) -> bool {
        is_test_path(&self.file_path)
    }
}

/// Heuristic test-file detection across the common conventions.
pub fn is_test_path(path: &str) -> bool {
    let lower = path.to_lowercase().replace('\\', "/");
    let file = lower.rsplit('/').next().unwrap_or(&lower);
    lower.contains("/tests/")
        || lower.starts_with("tests/")
        || lower.contains("/test/")
        || lower.starts_with("test/")
        || lower.contains("/__tests__/")
        || lower.contains("/spec/")
        || file.starts_with("test_")
        || file.contains("_test.")
        || file.contains(".test.")
        || file.contains(".spec.")
        || file.contains("_spec.")
        || file.ends_with("test.java")
        || file.ends_with("tests.cs")
}
