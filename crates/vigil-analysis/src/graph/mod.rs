//! Caller-graph traversal: changed-entity resolution and blast radius.

pub mod blast_radius;
pub mod changed;

pub use blast_radius::{compute_blast_radius, compute_entity_blast_radius};
pub use changed::resolve_changed_entities;
