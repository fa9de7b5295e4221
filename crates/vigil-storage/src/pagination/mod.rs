//! Keyset pagination.

pub mod keyset;

pub use keyset::PaginationCursor;
