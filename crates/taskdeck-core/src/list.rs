use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::id::TaskId;
use crate::task::Task;

/// Raised when a proposed order is not a permutation of the current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("proposed order does not match the current task list")]
pub struct OrderMismatch;

/// Ordered task collection kept in incomplete-first display order.
///
/// Ids are unique. Every constructor re-applies the stable partition that
/// moves completed tasks behind incomplete ones while keeping the relative
/// order inside each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Build the list from a server response.
    ///
    /// Later duplicates of an id are dropped; the first occurrence wins.
    #[must_use]
    pub fn from_server(tasks: Vec<Task>) -> Self {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut tasks: Vec<Task> = tasks
            .into_iter()
            .filter(|task| seen.insert(task.id.clone()))
            .collect();
        partition_incomplete_first(&mut tasks);
        Self { tasks }
    }

    /// Rearrange the stored tasks into the id order given by `order`.
    ///
    /// Only ids are read from `order`; task contents always come from this
    /// list.
    ///
    /// # Errors
    /// Returns [`OrderMismatch`] unless `order` holds exactly the ids of
    /// this list, each once.
    pub fn reordered(&self, order: &[TaskId]) -> Result<Self, OrderMismatch> {
        if order.len() != self.tasks.len() {
            return Err(OrderMismatch);
        }
        let mut by_id: HashMap<&TaskId, &Task> =
            self.tasks.iter().map(|task| (&task.id, task)).collect();
        let mut tasks = order
            .iter()
            .map(|id| by_id.remove(id).cloned().ok_or(OrderMismatch))
            .collect::<Result<Vec<_>, _>>()?;
        partition_incomplete_first(&mut tasks);
        Ok(Self { tasks })
    }

    /// Tasks in display order.
    #[must_use]
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterate in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Ids in display order.
    pub fn ids(&self) -> impl Iterator<Item = &TaskId> + '_ {
        self.tasks.iter().map(|task| &task.id)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the list holds no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Display position of a task.
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    /// True when a task with `id` is present.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// Stable-sort tasks so incomplete ones come first.
pub fn partition_incomplete_first(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.completed);
}
