//! Tests for cooperative cancellation.

use vigil_core::errors::WorkflowError;
use vigil_core::{Cancellable, CancellationToken};

#[test]
fn test_token_starts_active() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
    assert!(token.ensure_active().is_ok());
}

#[test]
fn test_clone_shares_flag() {
    let token = CancellationToken::new();
    let clone = token.clone();
    clone.cancel();
    assert!(token.is_cancelled());
    assert!(matches!(token.ensure_active(), Err(WorkflowError::Cancelled)));
}

#[test]
fn test_parent_cancels_children() {
    let parent = CancellationToken::new();
    let child = parent.child();
    let grandchild = child.child();
    parent.cancel();
    assert!(child.is_cancelled());
    assert!(grandchild.is_cancelled());
}

#[test]
fn test_child_does_not_cancel_parent() {
    let parent = CancellationToken::new();
    let child = parent.child();
    child.cancel();
    assert!(child.is_cancelled());
    assert!(!parent.is_cancelled());
}
