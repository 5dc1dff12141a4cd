use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use taskdeck_app::{DeleteStatus, ReorderController, TaskStore};
use taskdeck_core::{Task, TaskId, TaskList};
use taskdeck_gateway::TaskGateway;

use crate::Command;

pub async fn run<G: TaskGateway>(command: Command, store: &TaskStore<G>, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Ls { json } => handle_ls(store, json, out).await,
        Command::Add { description } => {
            let message = store.add_task(&description).await?;
            writeln!(out, "{message}")?;
            Ok(())
        }
        Command::Toggle { id } => handle_toggle(store, &parse_task_id(&id)?, out).await,
        Command::Edit { id, description } => {
            let id = parse_task_id(&id)?;
            store.refresh().await?;
            store.open_edit(&id).await?;
            store.update_description(&id, &description).await?;
            writeln!(out, "updated {id}")?;
            Ok(())
        }
        Command::Rm { ids } => handle_rm(store, &parse_task_ids(ids)?, out).await,
        Command::Move { id, over } => {
            handle_move(store, &parse_task_id(&id)?, &parse_task_id(&over)?, out).await
        }
    }
}

async fn handle_ls<G: TaskGateway>(store: &TaskStore<G>, json: bool, out: &mut impl Write) -> Result<()> {
    store.refresh().await?;
    let tasks = store.tasks().await;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(tasks.as_slice())?)?;
    } else if tasks.is_empty() {
        writeln!(out, "No tasks found")?;
    } else {
        render_task_table(&tasks, out)?;
    }
    Ok(())
}

async fn handle_toggle<G: TaskGateway>(store: &TaskStore<G>, id: &TaskId, out: &mut impl Write) -> Result<()> {
    store.refresh().await?;
    store.toggle_complete(id).await?;
    let status = store
        .tasks()
        .await
        .get(id)
        .map_or("Unknown", Task::status_label);
    writeln!(out, "{id}: {status}")?;
    Ok(())
}

async fn handle_rm<G: TaskGateway>(store: &TaskStore<G>, ids: &[TaskId], out: &mut impl Write) -> Result<()> {
    store.refresh().await?;
    store.enter_select().await?;
    for id in ids {
        if !store.select(id, true).await {
            store.cancel().await;
            bail!("Unknown task: {id}");
        }
    }

    let report = store.delete_selected().await?;
    for outcome in &report.outcomes {
        let status = match &outcome.status {
            DeleteStatus::Deleted => "deleted".to_owned(),
            DeleteStatus::Failed(err) => format!("failed ({})", err.message),
            DeleteStatus::NotAttempted => "skipped".to_owned(),
        };
        writeln!(out, "{}: {status}", outcome.task)?;
    }
    if let Some(err) = store.snapshot().await.error {
        return Err(err.into());
    }
    Ok(())
}

async fn handle_move<G: TaskGateway>(
    store: &TaskStore<G>,
    id: &TaskId,
    over: &TaskId,
    out: &mut impl Write,
) -> Result<()> {
    store.refresh().await?;
    let mut drag = ReorderController::new();
    drag.on_drag_start(store, id).await?;
    drag.on_drag_over(Some(over.clone()));
    drag.on_drag_end(store, Some(over)).await?;
    render_task_table(&store.tasks().await, out)?;
    writeln!(out, "(order is local and not saved)")?;
    Ok(())
}

fn render_task_table(tasks: &TaskList, out: &mut impl Write) -> Result<()> {
    writeln!(out, "ID | Status | Description | Created")?;
    writeln!(out, "-- | ------ | ----------- | -------")?;
    for task in tasks {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        writeln!(out, "{} | {mark} | {} | {}", task.id, task.description, task.created_at)?;
    }
    Ok(())
}

fn parse_task_ids(inputs: Vec<String>) -> Result<Vec<TaskId>> {
    inputs.into_iter().map(|raw| parse_task_id(&raw)).collect()
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::from_str(raw).with_context(|| format!("Invalid task id: {raw}"))
}
