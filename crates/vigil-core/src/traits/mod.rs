//! Collaborator traits. The engine depends only on these; storage, matcher,
//! generator and git host implementations live elsewhere.

pub mod cancellation;
pub mod generator;
pub mod git_host;
pub mod graph_store;
pub mod pattern_matcher;
pub mod progress;
pub mod review_store;
pub mod workflow_store;

pub use cancellation::{Cancellable, CancellationToken};
pub use generator::StructuredGenerator;
pub use git_host::GitHost;
pub use graph_store::GraphStore;
pub use pattern_matcher::{MatchResult, PatternMatcher, ScanRequest};
pub use progress::{NoopProgress, ProgressReporter};
pub use review_store::ReviewStore;
pub use workflow_store::WorkflowStore;
