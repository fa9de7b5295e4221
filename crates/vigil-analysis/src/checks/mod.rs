//! The check engine and its nine checks.

pub mod complexity;
pub mod contract;
pub mod dependency;
pub mod engine;
pub mod env;
pub mod idempotency;
pub mod impact;
pub mod pattern;
pub mod test_coverage;
pub mod trust_boundary;
pub mod types;

pub use engine::{CheckEngine, CheckRun};
pub use types::{Check, CheckContext};
