//! Client-side task store: the synchronized list, UI mode and sync state.

use std::collections::{BTreeMap, BTreeSet};

use taskdeck_core::{TaskId, TaskList, TaskPatch};
use taskdeck_gateway::{GatewayOp, TaskGateway};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{StoreError, SyncError, ValidationError};
use crate::mode::{Intent, TransitionError, UiMode};

/// Owns the task list and drives every mutation through a [`TaskGateway`].
///
/// State lives behind one async mutex that is released before each gateway
/// call, so other intents can be issued while a call is in flight. Every
/// list call takes a sync token; a list response is applied only when no
/// newer list call has been issued since. Mutations count towards
/// `loading` but take no token.
#[derive(Debug)]
pub struct TaskStore<G> {
    gateway: G,
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: TaskList,
    mode: UiMode,
    in_flight: usize,
    busy: BTreeMap<TaskId, usize>,
    error: Option<StoreError>,
    issued: u64,
}

impl StoreState {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.begin();
        self.issued
    }

    fn begin(&mut self) {
        self.in_flight += 1;
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn mark_busy(&mut self, id: &TaskId) {
        *self.busy.entry(id.clone()).or_default() += 1;
    }

    fn clear_busy(&mut self, id: &TaskId) {
        if let Some(count) = self.busy.get_mut(id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.busy.remove(id);
            }
        }
    }

    fn fail(&mut self, err: impl Into<StoreError>) -> StoreError {
        let err = err.into();
        self.error = Some(err.clone());
        err
    }

    fn replace_tasks(&mut self, tasks: TaskList) {
        self.tasks = tasks;
        let pruned = self.mode.prune(&self.tasks);
        if pruned > 0 {
            debug!(pruned, "dropped references to vanished tasks");
        }
    }
}

/// Result of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the collection.
    Applied {
        /// Tasks now listed.
        count: usize,
    },
    /// A newer list request was issued before this response arrived.
    Discarded {
        /// Token of the discarded request.
        token: u64,
        /// Latest token at the time of arrival.
        latest: u64,
    },
}

/// Point-in-time copy of the store state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Tasks in display order.
    pub tasks: TaskList,
    /// Active UI mode.
    pub mode: UiMode,
    /// True while any gateway call is in flight.
    pub loading: bool,
    /// Tasks with a pending toggle or delete.
    pub busy: BTreeSet<TaskId>,
    /// Most recent failure, cleared when the next user operation starts.
    pub error: Option<StoreError>,
    /// Latest list token issued.
    pub generation: u64,
}

/// What happened to one id in a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Removed on the service.
    Deleted,
    /// The service rejected the delete or could not be reached.
    Failed(SyncError),
    /// Skipped because an earlier delete failed.
    NotAttempted,
}

/// Outcome for a single id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Target task.
    pub task: TaskId,
    /// What happened.
    pub status: DeleteStatus,
}

/// Per-id results of [`TaskStore::delete_many`], in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// One entry per requested id.
    pub outcomes: Vec<DeleteOutcome>,
}

impl DeleteReport {
    /// Ids that were removed.
    pub fn deleted(&self) -> impl Iterator<Item = &TaskId> + '_ {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == DeleteStatus::Deleted)
            .map(|outcome| &outcome.task)
    }

    /// The failure that stopped the batch.
    #[must_use]
    pub fn failure(&self) -> Option<&SyncError> {
        self.outcomes.iter().find_map(|outcome| match &outcome.status {
            DeleteStatus::Failed(err) => Some(err),
            _ => None,
        })
    }

    /// True when every requested id was deleted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| outcome.status == DeleteStatus::Deleted)
    }

    fn aggregate_error(&self) -> Option<SyncError> {
        let failure = self.failure()?;
        Some(SyncError {
            operation: GatewayOp::Delete,
            task: failure.task.clone(),
            status: failure.status,
            message: format!(
                "deleted {} of {} tasks; {}",
                self.deleted().count(),
                self.outcomes.len(),
                failure.message
            ),
        })
    }
}

impl<G> TaskStore<G> {
    /// Empty store in browsing mode.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Underlying gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.lock().await;
        StoreSnapshot {
            tasks: state.tasks.clone(),
            mode: state.mode.clone(),
            loading: state.in_flight > 0,
            busy: state.busy.keys().cloned().collect(),
            error: state.error.clone(),
            generation: state.issued,
        }
    }

    /// Current tasks in display order.
    pub async fn tasks(&self) -> TaskList {
        self.state.lock().await.tasks.clone()
    }

    /// Replace the local display order.
    ///
    /// The incomplete-first partition is re-applied; the order is not sent to
    /// the service and the next refresh restores the server order.
    ///
    /// # Errors
    /// [`ValidationError::OrderMismatch`] unless `order` is a permutation of
    /// the current task ids.
    pub async fn reorder(&self, order: &[TaskId]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        match state.tasks.reordered(order) {
            Ok(tasks) => {
                state.replace_tasks(tasks);
                Ok(())
            }
            Err(_) => Err(state.fail(ValidationError::OrderMismatch)),
        }
    }

    /// Open the add panel.
    ///
    /// # Errors
    /// [`StoreError::Transition`] unless browsing.
    pub async fn open_add(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.mode.open_add().map_err(|err| state.fail(err))
    }

    /// Open the edit panel for `id`.
    ///
    /// # Errors
    /// [`ValidationError::UnknownTask`] for an id not in the list,
    /// [`StoreError::Transition`] unless browsing.
    pub async fn open_edit(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.tasks.contains(id) {
            return Err(state.fail(ValidationError::UnknownTask(id.clone())));
        }
        state.mode.open_edit(id.clone()).map_err(|err| state.fail(err))
    }

    /// Enter selection mode with nothing selected.
    ///
    /// # Errors
    /// [`StoreError::Transition`] unless browsing.
    pub async fn enter_select(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.mode.enter_select().map_err(|err| state.fail(err))
    }

    /// Return to browsing from any mode, dropping any selection.
    pub async fn cancel(&self) {
        self.state.lock().await.mode.cancel();
    }

    /// Mark or unmark `id` for deletion.
    ///
    /// Ignored outside selection mode and for ids not in the list. Returns
    /// whether the selection changed.
    pub async fn select(&self, id: &TaskId, selected: bool) -> bool {
        let mut state = self.state.lock().await;
        if selected && !state.tasks.contains(id) {
            return false;
        }
        state
            .mode
            .selection_mut()
            .is_some_and(|selection| selection.set(id, selected))
    }

    /// Select every listed task. Ignored outside selection mode.
    pub async fn select_all(&self) {
        let mut state = self.state.lock().await;
        let StoreState { tasks, mode, .. } = &mut *state;
        if let Some(selection) = mode.selection_mut() {
            selection.fill(tasks);
        }
    }

    /// Empty the selection. Ignored outside selection mode.
    pub async fn clear_selection(&self) {
        if let Some(selection) = self.state.lock().await.mode.selection_mut() {
            selection.clear();
        }
    }
}

impl<G: TaskGateway> TaskStore<G> {
    /// Reload the list from the service.
    ///
    /// On failure the collection is emptied, unless a newer list request has
    /// already been issued.
    ///
    /// # Errors
    /// [`StoreError::Sync`] when the list call fails.
    pub async fn refresh(&self) -> Result<RefreshOutcome, StoreError> {
        self.state.lock().await.error = None;
        self.resync().await
    }

    async fn resync(&self) -> Result<RefreshOutcome, StoreError> {
        let token = self.state.lock().await.issue();
        let result = self.gateway.list().await;

        let mut state = self.state.lock().await;
        state.settle();
        let latest = state.issued;
        if token != latest {
            debug!(token, latest, "discarding stale task list");
            return Ok(RefreshOutcome::Discarded { token, latest });
        }
        match result {
            Ok(tasks) => {
                let received = tasks.len();
                let tasks = TaskList::from_server(tasks);
                let count = tasks.len();
                if count < received {
                    warn!(dropped = received - count, "ignored duplicate task ids");
                }
                state.replace_tasks(tasks);
                debug!(count, token, "task list refreshed");
                Ok(RefreshOutcome::Applied { count })
            }
            Err(err) => {
                warn!(error = %err, "failed to load tasks");
                state.replace_tasks(TaskList::default());
                let err = StoreError::from(SyncError::from_gateway(GatewayOp::List, None, &err));
                if state.error.is_none() {
                    state.error = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    /// Create a task from `description` and reload the list.
    ///
    /// Returns the service's confirmation message. The add panel closes on
    /// success and stays open on failure.
    ///
    /// # Errors
    /// [`ValidationError::EmptyDescription`] for blank input (nothing is
    /// sent), [`StoreError::Sync`] when the add or the following refresh fails.
    pub async fn add_task(&self, description: &str) -> Result<String, StoreError> {
        let text = description.trim();
        {
            let mut state = self.state.lock().await;
            state.error = None;
            if text.is_empty() {
                return Err(state.fail(ValidationError::EmptyDescription));
            }
            state.begin();
        }

        let result = self.gateway.add(text).await;

        let message = {
            let mut state = self.state.lock().await;
            state.settle();
            match result {
                Ok(message) => {
                    state.mode.finish_add();
                    message
                }
                Err(err) => {
                    warn!(error = %err, "failed to add task");
                    return Err(state.fail(SyncError::from_gateway(GatewayOp::Add, None, &err)));
                }
            }
        };
        info!(description = text, "task added");
        self.resync().await?;
        Ok(message)
    }

    /// Flip the completion flag of `id` on the service, then reload.
    ///
    /// The local copy is not touched until the refresh lands.
    ///
    /// # Errors
    /// [`ValidationError::UnknownTask`] for an id not in the list,
    /// [`StoreError::Sync`] when the update or refresh fails.
    pub async fn toggle_complete(&self, id: &TaskId) -> Result<(), StoreError> {
        let patch = {
            let mut state = self.state.lock().await;
            state.error = None;
            let current = state.tasks.get(id).map(|task| task.completed);
            let Some(completed) = current else {
                return Err(state.fail(ValidationError::UnknownTask(id.clone())));
            };
            state.mark_busy(id);
            TaskPatch::completed(!completed)
        };

        let outcome = self.apply_update(id, &patch).await;
        self.state.lock().await.clear_busy(id);
        outcome
    }

    /// Replace the description of `id` and close the edit panel.
    ///
    /// The panel closes whether or not the service accepts the change; blank
    /// input is rejected before that and leaves the panel open.
    ///
    /// # Errors
    /// [`ValidationError`] for blank input or an unknown id,
    /// [`StoreError::Sync`] when the update or refresh fails.
    pub async fn update_description(&self, id: &TaskId, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        {
            let mut state = self.state.lock().await;
            state.error = None;
            if text.is_empty() {
                return Err(state.fail(ValidationError::EmptyDescription));
            }
            if !state.tasks.contains(id) {
                return Err(state.fail(ValidationError::UnknownTask(id.clone())));
            }
        }

        let outcome = self.apply_update(id, &TaskPatch::description(text)).await;
        self.state.lock().await.mode.finish_edit();
        outcome
    }

    async fn apply_update(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), StoreError> {
        self.state.lock().await.begin();
        let result = self.gateway.update(id, patch).await;
        {
            let mut state = self.state.lock().await;
            state.settle();
            if let Err(err) = result {
                warn!(task = %id, error = %err, "failed to update task");
                return Err(state.fail(SyncError::from_gateway(GatewayOp::Update, Some(id), &err)));
            }
        }
        debug!(task = %id, "task updated");
        self.resync().await.map(|_| ())
    }

    /// Delete `ids` one at a time, in order.
    ///
    /// The batch stops at the first failure. Afterwards the selection is
    /// cleared, selection mode is left and, if anything was sent, the list
    /// is reloaded once. A failure is recorded as a single aggregate error.
    pub async fn delete_many(&self, ids: &[TaskId]) -> DeleteReport {
        self.state.lock().await.error = None;

        let mut report = DeleteReport::default();
        let mut stopped = false;
        for id in ids {
            if stopped {
                report.outcomes.push(DeleteOutcome {
                    task: id.clone(),
                    status: DeleteStatus::NotAttempted,
                });
                continue;
            }
            {
                let mut state = self.state.lock().await;
                state.begin();
                state.mark_busy(id);
            }
            let result = self.gateway.delete(id).await;
            {
                let mut state = self.state.lock().await;
                state.settle();
                state.clear_busy(id);
            }
            let status = match result {
                Ok(()) => {
                    debug!(task = %id, "task deleted");
                    DeleteStatus::Deleted
                }
                Err(err) => {
                    warn!(task = %id, error = %err, "failed to delete task");
                    stopped = true;
                    DeleteStatus::Failed(SyncError::from_gateway(GatewayOp::Delete, Some(id), &err))
                }
            };
            report.outcomes.push(DeleteOutcome {
                task: id.clone(),
                status,
            });
        }

        {
            let mut state = self.state.lock().await;
            if let Some(selection) = state.mode.selection_mut() {
                selection.clear();
            }
            state.mode.finish_selection();
            if let Some(err) = report.aggregate_error() {
                state.error = Some(err.into());
            }
        }
        info!(
            requested = ids.len(),
            deleted = report.deleted().count(),
            "bulk delete finished"
        );

        if !ids.is_empty() {
            if let Err(err) = self.resync().await {
                debug!(error = %err, "refresh after delete failed");
            }
        }
        report
    }

    /// Delete the current selection in display order.
    ///
    /// # Errors
    /// [`StoreError::Transition`] outside selection mode.
    pub async fn delete_selected(&self) -> Result<DeleteReport, StoreError> {
        let ids = {
            let mut state = self.state.lock().await;
            let ids = state
                .mode
                .selection()
                .map(|selection| selection.in_display_order(&state.tasks));
            let Some(ids) = ids else {
                let err = TransitionError {
                    mode: state.mode.name(),
                    intent: Intent::DeleteSelected,
                };
                return Err(state.fail(err));
            };
            ids
        };
        Ok(self.delete_many(&ids).await)
    }
}
