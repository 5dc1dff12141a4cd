//! Drag-and-drop lifecycle for reordering tasks locally.

use taskdeck_core::{Task, TaskId, compute_order};
use tracing::debug;

use crate::error::{StoreError, ValidationError};
use crate::store::TaskStore;

/// Where a drag currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A task is being dragged.
    Dragging {
        /// Copy of the dragged task, rendered as the drag preview.
        preview: Task,
        /// Task currently under the pointer.
        over: Option<TaskId>,
    },
}

/// Result of dropping a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The store received a new order.
    Reordered,
    /// Nothing changed: no drag, no target, or dropped onto itself.
    Unchanged,
}

/// Tracks one drag gesture and turns the drop into [`TaskStore::reorder`].
///
/// The collection is only touched on drop; hovering merely records the
/// target.
#[derive(Debug, Clone, Default)]
pub struct ReorderController {
    state: DragState,
}

impl ReorderController {
    /// Controller with no drag in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current drag state.
    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// True while a task is being dragged.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The dragged task, if any.
    #[must_use]
    pub const fn preview(&self) -> Option<&Task> {
        match &self.state {
            DragState::Dragging { preview, .. } => Some(preview),
            DragState::Idle => None,
        }
    }

    /// Task under the pointer, if any.
    #[must_use]
    pub const fn hovered(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Begin dragging `id`, capturing its current state as the preview.
    ///
    /// # Errors
    /// [`ValidationError::UnknownTask`] when `id` is not listed.
    pub async fn on_drag_start<G>(&mut self, store: &TaskStore<G>, id: &TaskId) -> Result<(), StoreError> {
        let tasks = store.tasks().await;
        let preview = tasks
            .get(id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownTask(id.clone()))?;
        debug!(task = %id, "drag started");
        self.state = DragState::Dragging { preview, over: None };
        Ok(())
    }

    /// Record the hovered target. Ignored when no drag is active.
    pub fn on_drag_over(&mut self, target: Option<TaskId>) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = target;
        }
    }

    /// Finish the drag, reordering against the list as it is now.
    ///
    /// # Errors
    /// Propagates [`TaskStore::reorder`] failures.
    pub async fn on_drag_end<G>(
        &mut self,
        store: &TaskStore<G>,
        over: Option<&TaskId>,
    ) -> Result<DropOutcome, StoreError> {
        let DragState::Dragging { preview, .. } = std::mem::take(&mut self.state) else {
            return Ok(DropOutcome::Unchanged);
        };
        let dragged = &preview.id;
        let Some(target) = over.filter(|target| *target != dragged) else {
            debug!(task = %dragged, "drag ended without a move");
            return Ok(DropOutcome::Unchanged);
        };

        let current = store.tasks().await;
        let order = compute_order(current.as_slice(), dragged, target);
        if order.as_slice() == current.as_slice() {
            return Ok(DropOutcome::Unchanged);
        }
        let ids: Vec<TaskId> = order.into_iter().map(|task| task.id).collect();
        store.reorder(&ids).await?;
        debug!(task = %dragged, over = %target, "task moved");
        Ok(DropOutcome::Reordered)
    }

    /// Abandon the drag without touching the list.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
