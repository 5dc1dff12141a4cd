//! UI mode state machine owned by the task store.

use std::fmt;

use taskdeck_core::{TaskId, TaskList};
use thiserror::Error;

use crate::selection::SelectionSet;

/// Exactly one mode is active at a time; the store starts in `Browsing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiMode {
    /// Plain list view.
    #[default]
    Browsing,
    /// Add panel open.
    Adding,
    /// Edit panel open for a task.
    Editing(TaskId),
    /// Multi-select for bulk delete.
    Selecting(SelectionSet),
}

/// Named user intents that open a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Open the add panel.
    OpenAdd,
    /// Open the edit panel.
    OpenEdit,
    /// Enter selection mode.
    EnterSelect,
    /// Delete the current selection.
    DeleteSelected,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAdd => "open the add panel",
            Self::OpenEdit => "open the edit panel",
            Self::EnterSelect => "enter selection mode",
            Self::DeleteSelected => "delete the selection",
        })
    }
}

/// Intent not allowed from the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot {intent} while {mode}")]
pub struct TransitionError {
    /// Mode that was active.
    pub mode: &'static str,
    /// Intent that was refused.
    pub intent: Intent,
}

impl UiMode {
    /// Short description of the mode for messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::Adding => "adding",
            Self::Editing(_) => "editing",
            Self::Selecting(_) => "selecting",
        }
    }

    /// True in the default mode.
    #[must_use]
    pub const fn is_browsing(&self) -> bool {
        matches!(self, Self::Browsing)
    }

    /// Selection when in selection mode.
    #[must_use]
    pub const fn selection(&self) -> Option<&SelectionSet> {
        match self {
            Self::Selecting(selection) => Some(selection),
            _ => None,
        }
    }

    pub(crate) fn selection_mut(&mut self) -> Option<&mut SelectionSet> {
        match self {
            Self::Selecting(selection) => Some(selection),
            _ => None,
        }
    }

    /// Task being edited, if any.
    #[must_use]
    pub const fn editing(&self) -> Option<&TaskId> {
        match self {
            Self::Editing(id) => Some(id),
            _ => None,
        }
    }

    fn enter(&mut self, intent: Intent, next: Self) -> Result<(), TransitionError> {
        if !self.is_browsing() {
            return Err(TransitionError {
                mode: self.name(),
                intent,
            });
        }
        *self = next;
        Ok(())
    }

    /// Browsing → Adding.
    ///
    /// # Errors
    /// Fails unless currently browsing.
    pub fn open_add(&mut self) -> Result<(), TransitionError> {
        self.enter(Intent::OpenAdd, Self::Adding)
    }

    /// Browsing → Editing(id).
    ///
    /// # Errors
    /// Fails unless currently browsing.
    pub fn open_edit(&mut self, id: TaskId) -> Result<(), TransitionError> {
        self.enter(Intent::OpenEdit, Self::Editing(id))
    }

    /// Browsing → Selecting(∅).
    ///
    /// # Errors
    /// Fails unless currently browsing.
    pub fn enter_select(&mut self) -> Result<(), TransitionError> {
        self.enter(Intent::EnterSelect, Self::Selecting(SelectionSet::default()))
    }

    /// Any mode → Browsing. Drops any selection.
    pub fn cancel(&mut self) {
        *self = Self::Browsing;
    }

    /// Close the add panel after a submit.
    pub fn finish_add(&mut self) {
        if matches!(self, Self::Adding) {
            *self = Self::Browsing;
        }
    }

    /// Close the edit panel after a submit.
    pub fn finish_edit(&mut self) {
        if matches!(self, Self::Editing(_)) {
            *self = Self::Browsing;
        }
    }

    /// Leave selection mode after a bulk action.
    pub fn finish_selection(&mut self) {
        if matches!(self, Self::Selecting(_)) {
            *self = Self::Browsing;
        }
    }

    /// Re-establish references into `tasks` after the list changed.
    ///
    /// Selected ids that vanished are dropped; an edit panel whose task
    /// vanished is closed.
    pub fn prune(&mut self, tasks: &TaskList) -> usize {
        match self {
            Self::Selecting(selection) => selection.retain_present(tasks),
            Self::Editing(id) if !tasks.contains(id) => {
                *self = Self::Browsing;
                1
            }
            _ => 0,
        }
    }
}
