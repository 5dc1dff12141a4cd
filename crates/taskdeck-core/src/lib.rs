//! Domain types & ordering rules for taskdeck task lists.

/// Identifier types.
pub mod id;
/// Ordered task collection.
pub mod list;
pub mod order;
/// Task entity and partial updates.
pub mod task;

pub use id::{EmptyTaskId, TaskId};
pub use list::{OrderMismatch, TaskList, partition_incomplete_first};
pub use order::{compute_order, move_index};
pub use task::{Task, TaskPatch};
