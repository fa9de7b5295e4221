//! # vigil-core
//!
//! Foundation crate for the Vigil review engine.
//! Defines domain types, collaborator traits, errors, config, events,
//! tracing setup, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::{ReviewConfig, VigilConfig};
pub use errors::{ErrorClass, VigilErrorCode};
pub use traits::{Cancellable, CancellationToken};
