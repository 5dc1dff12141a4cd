//! Drag-and-drop permutation logic.

use crate::id::TaskId;
use crate::task::Task;

/// Move the element at `from` so it ends up at index `to`.
///
/// Out-of-range indices leave the slice untouched.
pub fn move_index<T>(items: &mut [T], from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    if from < to {
        items[from..=to].rotate_left(1);
    } else {
        items[to..=from].rotate_right(1);
    }
}

/// Order produced by dropping `dragged` onto `target`.
///
/// The dragged task is removed from its slot and re-inserted at the target's
/// index, so dragging downwards lands after the target and dragging upwards
/// lands before it. When either id is missing the current order is returned.
#[must_use]
pub fn compute_order(current: &[Task], dragged: &TaskId, target: &TaskId) -> Vec<Task> {
    let mut order = current.to_vec();
    let from = current.iter().position(|task| &task.id == dragged);
    let to = current.iter().position(|task| &task.id == target);
    if let (Some(from), Some(to)) = (from, to) {
        move_index(&mut order, from, to);
    }
    order
}
