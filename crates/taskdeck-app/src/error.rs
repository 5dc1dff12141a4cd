//! Error taxonomy surfaced by the task store.

use taskdeck_core::TaskId;
use taskdeck_gateway::{GatewayError, GatewayOp};
use thiserror::Error;

use crate::mode::TransitionError;

/// Input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Description is empty after trimming.
    #[error("Task description must not be empty")]
    EmptyDescription,

    /// No task with this id is in the current list.
    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),

    /// Proposed order is not a permutation of the current list.
    #[error("Order does not match the current task list")]
    OrderMismatch,
}

/// A gateway call failed.
///
/// Holds a rendered message rather than the [`GatewayError`] itself so it can
/// be cloned into snapshots and delete reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct SyncError {
    /// Operation that failed.
    pub operation: GatewayOp,
    /// Task the call targeted, if any.
    pub task: Option<TaskId>,
    /// HTTP status reported by the service, if any.
    pub status: Option<u16>,
    /// Human-readable cause.
    pub message: String,
}

impl SyncError {
    pub(crate) fn from_gateway(operation: GatewayOp, task: Option<&TaskId>, err: &GatewayError) -> Self {
        Self {
            operation,
            task: task.cloned(),
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// Umbrella error for every store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Rejected input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failed gateway call.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Intent not allowed in the current UI mode.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl StoreError {
    /// The gateway failure, if this is one.
    #[must_use]
    pub const fn as_sync(&self) -> Option<&SyncError> {
        match self {
            Self::Sync(err) => Some(err),
            _ => None,
        }
    }
}
