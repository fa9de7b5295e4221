//! Turning findings into a verdict and a postable review.

pub mod render;
pub mod verdict;

pub use render::{
    build_submission, failure_idempotency_key, render_comments, review_idempotency_key,
};
pub use verdict::decide_verdict;
