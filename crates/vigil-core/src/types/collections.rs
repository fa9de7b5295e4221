//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// SmallVec sized for the callers named in one impact finding.
pub type SmallVec5<T> = SmallVec<[T; 5]>;
