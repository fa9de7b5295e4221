//! # vigil-analysis
//!
//! The review engine: blast-radius traversal over the caller graph, the check
//! engine, rule drafting and lifecycle, durable review and simulation
//! workflows, drift and ledger reads, and framework-free API handlers.

pub mod api;
pub mod checks;
pub mod graph;
pub mod insights;
pub mod review;
pub mod rules;
pub mod workflow;
