//! Rules: structural queries promoted to enforceable policy.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// What a rule guards.
    RuleType {
        Architecture => "architecture",
        Naming => "naming",
        Security => "security",
        Performance => "performance",
        Style => "style",
        Custom => "custom",
    }
);

string_enum!(
    /// How a rule violation is surfaced in review.
    Enforcement {
        Suggest => "suggest",
        Warn => "warn",
        Block => "block",
    }
);

string_enum!(
    /// Rule lifecycle status.
    RuleStatus {
        Draft => "draft",
        Active => "active",
        Promoted => "promoted",
        Archived => "archived",
    }
);

string_enum!(
    /// Whether a rule applies to one repository or the whole organisation.
    RuleScope {
        Repo => "repo",
        Org => "org",
    }
);

impl RuleStatus {
    /// Statuses enforced during review.
    pub fn is_enforced(&self) -> bool {
        matches!(self, Self::Active | Self::Promoted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub org_id: String,
    /// `None` for org-scoped rules.
    pub repo_id: Option<String>,
    pub name: String,
    pub title: String,
    pub description: String,
    pub rule_type: RuleType,
    /// Primary structural (AST-shaped) query.
    pub structural_query: String,
    /// Optional rule text for a secondary engine.
    pub secondary_query: Option<String>,
    pub languages: Vec<String>,
    pub path_glob: Option<String>,
    pub enforcement: Enforcement,
    pub priority: i32,
    pub status: RuleStatus,
    pub scope: RuleScope,
    /// Nested feature map, merged key by key on update.
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
    pub source_pattern_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    /// Stable id of the rule promoted from `pattern_id`, so a retried
    /// promotion rewrites the same row.
    pub fn promoted_id(org_id: &str, pattern_id: &str) -> String {
        let key = format!("{org_id}\0{pattern_id}");
        format!("rule-{:032x}", xxh3_128(key.as_bytes()))
    }

    /// Whether the rule covers a file in the given language.
    /// Empty language lists and absent globs match everything.
    pub fn applies_to(&self, path: &str, language: Option<&str>) -> bool {
        let language_ok = self.languages.is_empty()
            || language.is_some_and(|l| self.languages.iter().any(|x| x.eq_ignore_ascii_case(l)));
        if !language_ok {
            return false;
        }
        match self.path_glob.as_deref() {
            None | Some("") => true,
            Some(glob) => glob::Pattern::new(glob)
                .map(|p| p.matches(path))
                .unwrap_or(false),
        }
    }
}

/// Filter for `GraphStore::query_rules`.
#[derive(Debug, Clone, Default)]
pub struct RuleQuery {
    /// Repo-scoped rules for this repository plus org-scoped rules. `None` = all.
    pub repo_id: Option<String>,
    /// Empty = any status.
    pub statuses: Vec<RuleStatus>,
}

impl RuleQuery {
    /// Rules enforced during review of `repo_id`.
    pub fn enforced_for(repo_id: &str) -> Self {
        Self {
            repo_id: Some(repo_id.to_string()),
            statuses: vec![RuleStatus::Active, RuleStatus::Promoted],
        }
    }
}

/// Partial rule update. Absent fields are preserved.
///
/// `options` is merged key by key; a JSON `null` removes the key.
/// An empty `path_glob` clears the glob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulePatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub rule_type: Option<RuleType>,
    pub structural_query: Option<String>,
    pub secondary_query: Option<String>,
    pub languages: Option<Vec<String>>,
    pub path_glob: Option<String>,
    pub enforcement: Option<Enforcement>,
    pub priority: Option<i32>,
    pub status: Option<RuleStatus>,
    pub options: Option<BTreeMap<String, serde_json::Value>>,
}

impl RulePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
