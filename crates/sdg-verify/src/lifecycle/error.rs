use thiserror::Error;

use super::LifecycleState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// `mark_ready` was called outside the `Uninitialized` state.
    #[error("cannot mark service ready from state {state:?}")]
    InvalidTransition { state: LifecycleState },
}
