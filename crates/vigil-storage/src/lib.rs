//! # vigil-storage
//!
//! SQLite persistence for the Vigil review engine: a serialized writer plus
//! a read pool, `PRAGMA user_version` migrations, per-table query modules,
//! keyset pagination, and [`SqliteStore`], which implements the
//! `GraphStore`, `ReviewStore` and `WorkflowStore` collaborator traits.

pub mod connection;
pub mod migrations;
pub mod pagination;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use store::SqliteStore;
