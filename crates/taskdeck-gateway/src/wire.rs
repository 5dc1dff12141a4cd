//! JSON bodies exchanged with the task service.

use serde::{Deserialize, Serialize};
use taskdeck_core::{Task, TaskId};

#[derive(Debug, Serialize)]
pub(crate) struct AddTaskBody<'a> {
    pub task: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddTaskResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListTasksResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateTaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteTaskBody<'a> {
    pub id: &'a TaskId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
