//! Pull-request change sets as supplied by the git host.

use serde::{Deserialize, Serialize};

/// Identifies a pull request on the git host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub name: String,
    pub number: u64,
    pub head_sha: String,
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.name, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

/// One line of a diff hunk, numbered in the post-image (added) or pre-image (removed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub line: u32,
    pub content: String,
}

impl DiffLine {
    pub fn new(line: u32, content: impl Into<String>) -> Self {
        Self {
            line,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub added_lines: Vec<DiffLine>,
    #[serde(default)]
    pub removed_lines: Vec<DiffLine>,
}

impl ChangedFile {
    /// Effective language: explicit, else inferred from the extension.
    pub fn language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .or_else(|| language_for_path(&self.path))
    }

    /// Whether any added or removed line falls inside `[start, end]`.
    pub fn touches_span(&self, start: u32, end: u32) -> bool {
        self.added_lines
            .iter()
            .chain(self.removed_lines.iter())
            .any(|l| l.line >= start && l.line <= end)
    }

    /// Added lines inside `[start, end]`.
    pub fn added_in_span(&self, start: u32, end: u32) -> impl Iterator<Item = &DiffLine> {
        self.added_lines
            .iter()
            .filter(move |l| l.line >= start && l.line <= end)
    }

    pub fn has_added_line(&self, line: u32) -> bool {
        self.added_lines.iter().any(|l| l.line == line)
    }

    /// File name component of the path.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// All files changed by a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub files: Vec<ChangedFile>,
}

impl ChangeSet {
    pub fn new(files: Vec<ChangedFile>) -> Self {
        Self { files }
    }

    /// True when at least one file carries an added or removed line, or was removed.
    pub fn has_changes(&self) -> bool {
        self.files.iter().any(|f| {
            f.status == FileStatus::Removed
                || !f.added_lines.is_empty()
                || !f.removed_lines.is_empty()
        })
    }

    pub fn file(&self, path: &str) -> Option<&ChangedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Files still present after the change.
    pub fn live_files(&self) -> impl Iterator<Item = &ChangedFile> {
        self.files.iter().filter(|f| f.status != FileStatus::Removed)
    }
}

/// Map a file extension to the matcher's language name.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.').map(|(_, e)| e)?;
    let lang = match ext.to_ascii_lowercase().as_str() {
        "ts" | "tsx" | "mts" | "cts" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "py" | "pyi" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "swift" => "swift",
        "scala" => "scala",
        _ => return None,
    };
    Some(lang)
}
