//! In-process gateway with call recording and failure injection.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use taskdeck_core::{Task, TaskId, TaskPatch};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;
use uuid::Uuid;

use crate::TaskGateway;
use crate::error::{GatewayError, GatewayOp};

/// A call observed by [`MemoryGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `add(description)`
    Add(String),
    /// `list()`
    List,
    /// `update(id, patch)`
    Update(TaskId, TaskPatch),
    /// `delete(id)`
    Delete(TaskId),
}

/// Gateway backed by a `Vec` in memory.
///
/// Mirrors the task service: new tasks get a fresh id and timestamp and are
/// appended, `list` returns insertion order, unknown ids answer 404 and
/// empty writes answer 400. Any operation can be switched off with
/// [`fail`](Self::fail).
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    calls: Vec<GatewayCall>,
    failing: BTreeSet<GatewayOp>,
}

impl MemoryGateway {
    /// Empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-populated with `tasks`, in service order.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            inner: Mutex::new(MemoryState {
                tasks,
                ..MemoryState::default()
            }),
        }
    }

    /// Current server-side tasks.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state().map(|state| state.tasks.clone()).unwrap_or_default()
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().map(|state| state.calls.clone()).unwrap_or_default()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        if let Ok(mut state) = self.state() {
            state.calls.clear();
        }
    }

    /// Make every later `operation` call fail with [`GatewayError::Unavailable`].
    pub fn fail(&self, operation: GatewayOp) {
        if let Ok(mut state) = self.state() {
            state.failing.insert(operation);
        }
    }

    /// Undo [`fail`](Self::fail).
    pub fn restore(&self, operation: GatewayOp) {
        if let Ok(mut state) = self.state() {
            state.failing.remove(&operation);
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, GatewayError> {
        self.inner.lock().map_err(|_| GatewayError::LockError)
    }

    /// Lock, record `call`, and fail if `operation` is switched off.
    fn begin(
        &self,
        operation: GatewayOp,
        call: GatewayCall,
    ) -> Result<MutexGuard<'_, MemoryState>, GatewayError> {
        let mut state = self.state()?;
        state.calls.push(call);
        if state.failing.contains(&operation) {
            debug!(%operation, "memory gateway refusing call");
            return Err(GatewayError::Unavailable {
                operation,
                reason: "service unavailable".into(),
            });
        }
        Ok(state)
    }
}

fn rejected(operation: GatewayOp, status: u16, message: &str) -> GatewayError {
    GatewayError::Status {
        operation,
        status,
        message: message.to_owned(),
    }
}

fn timestamp_now() -> Result<String, GatewayError> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::now_utc()
        .format(&format)
        .map_err(|err| GatewayError::Unavailable {
            operation: GatewayOp::Add,
            reason: err.to_string(),
        })
}

impl TaskGateway for MemoryGateway {
    async fn add(&self, description: &str) -> Result<String, GatewayError> {
        let mut state = self.begin(GatewayOp::Add, GatewayCall::Add(description.to_owned()))?;
        if description.is_empty() {
            return Err(rejected(GatewayOp::Add, 400, "Invalid task description"));
        }
        let id = TaskId::new(Uuid::now_v7().to_string()).map_err(|err| GatewayError::Unavailable {
            operation: GatewayOp::Add,
            reason: err.to_string(),
        })?;
        state
            .tasks
            .push(Task::new(id, description, false, timestamp_now()?));
        drop(state);
        Ok("Task added successfully".into())
    }

    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        let state = self.begin(GatewayOp::List, GatewayCall::List)?;
        Ok(state.tasks.clone())
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>, GatewayError> {
        let mut state = self.begin(
            GatewayOp::Update,
            GatewayCall::Update(id.clone(), patch.clone()),
        )?;
        if patch.is_empty() {
            return Err(rejected(GatewayOp::Update, 400, "Invalid update fields"));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| rejected(GatewayOp::Update, 404, "Task not found"))?;
        patch.apply_to(task);
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: &TaskId) -> Result<(), GatewayError> {
        let mut state = self.begin(GatewayOp::Delete, GatewayCall::Delete(id.clone()))?;
        let before = state.tasks.len();
        state.tasks.retain(|task| &task.id != id);
        if state.tasks.len() == before {
            return Err(rejected(GatewayOp::Delete, 404, "Task not found"));
        }
        Ok(())
    }
}
