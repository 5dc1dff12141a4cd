//! Set of task ids marked for a bulk action.

use std::collections::BTreeSet;

use taskdeck_core::{TaskId, TaskList};

/// Ids chosen while in selection mode.
///
/// The store keeps this a subset of the ids in its current [`TaskList`];
/// see [`retain_present`](Self::retain_present).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<TaskId>,
}

impl SelectionSet {
    /// Add or remove `id`. Returns whether the set changed.
    pub fn set(&mut self, id: &TaskId, selected: bool) -> bool {
        if selected {
            self.ids.insert(id.clone())
        } else {
            self.ids.remove(id)
        }
    }

    /// Select every task in `tasks`.
    pub fn fill(&mut self, tasks: &TaskList) {
        self.ids = tasks.ids().cloned().collect();
    }

    /// Drop every id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids whose task is no longer listed. Returns how many were pruned.
    pub fn retain_present(&mut self, tasks: &TaskList) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| tasks.contains(id));
        before - self.ids.len()
    }

    /// True when `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate selected ids in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskId> + '_ {
        self.ids.iter()
    }

    /// Selected ids in the display order of `tasks`.
    #[must_use]
    pub fn in_display_order(&self, tasks: &TaskList) -> Vec<TaskId> {
        tasks
            .ids()
            .filter(|id| self.ids.contains(*id))
            .cloned()
            .collect()
    }
}
