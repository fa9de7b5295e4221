//! Shared constants for the Vigil review engine.

/// Vigil version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default maximum caller-graph depth for blast-radius traversal.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default minimum transitive caller count before the impact check reports.
pub const DEFAULT_IMPACT_THRESHOLD: u32 = 5;

/// Default cyclomatic complexity ceiling for the complexity check.
pub const DEFAULT_COMPLEXITY_THRESHOLD: u32 = 10;

/// Maximum number of callers named in a single impact finding.
pub const MAX_LISTED_CALLERS: usize = 5;

/// Default boundary kinds: entities reachable from outside the system.
pub const DEFAULT_BOUNDARY_KINDS: &[&str] = &["api_route", "webhook_handler"];

/// Default API boundary kinds inspected by the contract check.
pub const DEFAULT_API_BOUNDARY_KINDS: &[&str] = &["api_route", "webhook_handler"];

/// Maximum attempts per review workflow step.
pub const DEFAULT_REVIEW_MAX_ATTEMPTS: u32 = 3;

/// Maximum attempts per simulation workflow step.
pub const DEFAULT_SIMULATION_MAX_ATTEMPTS: u32 = 2;

/// Wall-clock limit for one workflow step, in seconds (15 minutes).
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 900;

/// Liveness limit between two heartbeats, in seconds (2 minutes).
pub const DEFAULT_HEARTBEAT_TIMEOUT_SECS: u64 = 120;

/// Base delay between retry attempts, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Maximum generation attempts when the model output fails schema validation.
pub const DEFAULT_GENERATION_MAX_ATTEMPTS: u32 = 2;

/// Directories never counted when sizing a workspace.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "vendor",
    ".venv",
    "__pycache__",
    ".next",
    "coverage",
];

/// Default page size for drift listings.
pub const DEFAULT_DRIFT_LIMIT: usize = 50;

/// Hard ceiling for drift listings.
pub const MAX_DRIFT_LIMIT: usize = 500;

/// Default page size for ledger timeline pages.
pub const DEFAULT_LEDGER_PAGE_SIZE: usize = 50;
