//! End-to-end store scenarios against the in-memory gateway.

#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use taskdeck_app::{
    DeleteStatus, DropOutcome, RefreshOutcome, ReorderController, StoreError, TaskStore,
};
use taskdeck_core::{Task, TaskId, TaskList, TaskPatch};
use taskdeck_gateway::{GatewayCall, GatewayError, GatewayOp, MemoryGateway, TaskGateway};
use tokio::sync::oneshot;

fn id(raw: &str) -> TaskId {
    TaskId::new(raw).expect("valid id")
}

fn task(raw: &str, description: &str, completed: bool) -> Task {
    Task::new(id(raw), description, completed, "2025-06-01 12:00:00")
}

fn order(list: &TaskList) -> Vec<&str> {
    list.ids().map(TaskId::as_str).collect()
}

async fn store_with(tasks: Vec<Task>) -> TaskStore<MemoryGateway> {
    let store = TaskStore::new(MemoryGateway::with_tasks(tasks));
    store.refresh().await.expect("initial refresh");
    store.gateway().clear_calls();
    store
}

#[tokio::test]
async fn adding_appends_one_incomplete_task() {
    let store = store_with(vec![task("1", "buy milk", false)]).await;

    store.add_task("walk dog").await.expect("add");

    let tasks = store.tasks().await;
    assert_eq!(tasks.len(), 2);
    let descriptions: Vec<_> = tasks.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, ["buy milk", "walk dog"]);
    assert!(tasks.iter().all(|t| !t.completed));
    assert_ne!(tasks.as_slice()[0].id, tasks.as_slice()[1].id);
}

#[tokio::test]
async fn toggling_resorts_completed_behind_incomplete() {
    let store = store_with(vec![
        task("A", "a", false),
        task("B", "b", false),
        task("C", "c", true),
    ])
    .await;

    store.toggle_complete(&id("A")).await.expect("toggle");

    let tasks = store.tasks().await;
    assert_eq!(order(&tasks), ["B", "A", "C"]);
    let flags: Vec<_> = tasks.iter().map(|t| t.completed).collect();
    assert_eq!(flags, [false, true, true]);
}

#[tokio::test]
async fn toggle_flips_only_the_target() {
    let store = store_with(vec![task("A", "a", false), task("B", "b", true)]).await;
    let before = store.tasks().await;

    store.toggle_complete(&id("B")).await.expect("toggle");

    let after = store.tasks().await;
    for task in &after {
        let old = before.get(&task.id).expect("same ids");
        assert_eq!(task.completed != old.completed, task.id == id("B"));
    }
}

#[tokio::test]
async fn partial_bulk_delete_reports_one_error() {
    let store = store_with(vec![task("A", "a", false), task("B", "b", false)]).await;
    store.enter_select().await.expect("select mode");
    assert!(store.select(&id("B"), true).await);

    let report = store.delete_many(&[id("B"), id("X")]).await;

    assert_eq!(report.outcomes[0].status, DeleteStatus::Deleted);
    let failure = report.failure().expect("X fails");
    assert_eq!(failure.status, Some(404));
    assert_eq!(failure.task, Some(id("X")));

    let snapshot = store.snapshot().await;
    assert!(snapshot.mode.is_browsing());
    assert!(snapshot.mode.selection().is_none());
    assert!(matches!(snapshot.error, Some(StoreError::Sync(_))));
    assert_eq!(order(&snapshot.tasks), ["A"]);
    assert_eq!(
        store.gateway().calls(),
        [
            GatewayCall::Delete(id("B")),
            GatewayCall::Delete(id("X")),
            GatewayCall::List
        ]
    );
}

#[tokio::test]
async fn local_drag_is_dropped_by_next_refresh() {
    let store = store_with(vec![
        task("A", "a", false),
        task("B", "b", false),
        task("C", "c", false),
    ])
    .await;
    let mut drag = ReorderController::new();

    drag.on_drag_start(&store, &id("A")).await.expect("start");
    drag.on_drag_over(Some(id("C")));
    let outcome = drag.on_drag_end(&store, Some(&id("C"))).await.expect("drop");

    assert_eq!(outcome, DropOutcome::Reordered);
    assert_eq!(order(&store.tasks().await), ["B", "C", "A"]);
    assert!(store.gateway().calls().is_empty());

    store.refresh().await.expect("refresh");
    assert_eq!(order(&store.tasks().await), ["A", "B", "C"]);
}

#[tokio::test]
async fn selection_survives_external_delete_as_subset() {
    let store = store_with(vec![task("A", "a", false), task("B", "b", false)]).await;
    store.enter_select().await.expect("select mode");
    store.select_all().await;

    store.gateway().delete(&id("A")).await.expect("delete elsewhere");
    store.refresh().await.expect("refresh");

    let snapshot = store.snapshot().await;
    let selection = snapshot.mode.selection().expect("still selecting");
    assert!(selection.iter().all(|id| snapshot.tasks.contains(id)));
    assert_eq!(selection.len(), 1);
}

#[tokio::test]
async fn edit_round_trip_updates_description() {
    let store = store_with(vec![task("A", "old", false)]).await;
    store.open_edit(&id("A")).await.expect("open edit");

    store.update_description(&id("A"), "  new  ").await.expect("edit");

    assert_eq!(
        store.gateway().calls().first(),
        Some(&GatewayCall::Update(id("A"), TaskPatch::description("new")))
    );
    let snapshot = store.snapshot().await;
    assert!(snapshot.mode.is_browsing());
    assert_eq!(snapshot.tasks.get(&id("A")).map(|t| t.description.as_str()), Some("new"));
}

#[tokio::test]
async fn failing_service_surfaces_sync_error() {
    let store = store_with(vec![task("A", "a", false)]).await;
    store.gateway().fail(GatewayOp::Update);

    let err = store.toggle_complete(&id("A")).await.expect_err("update fails");
    let sync = err.as_sync().expect("sync error");
    assert_eq!(sync.operation, GatewayOp::Update);
    assert_eq!(sync.task, Some(id("A")));

    store.gateway().restore(GatewayOp::Update);
    store.toggle_complete(&id("A")).await.expect("toggle");
    assert!(store.snapshot().await.error.is_none());
}

/// Gateway that holds each `list` response until the test releases it.
struct GatedGateway {
    inner: MemoryGateway,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl GatedGateway {
    fn new(tasks: Vec<Task>, gates: Vec<oneshot::Receiver<()>>) -> Self {
        Self {
            inner: MemoryGateway::with_tasks(tasks),
            gates: Mutex::new(gates.into()),
        }
    }
}

impl TaskGateway for GatedGateway {
    async fn add(&self, description: &str) -> Result<String, GatewayError> {
        self.inner.add(description).await
    }

    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        let gate = self.gates.lock().unwrap().pop_front();
        let response = self.inner.list().await;
        if let Some(gate) = gate {
            gate.await.ok();
        }
        response
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>, GatewayError> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &TaskId) -> Result<(), GatewayError> {
        self.inner.delete(id).await
    }
}

async fn overlapping_refreshes(later_arrives_first: bool) {
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    let store = TaskStore::new(GatedGateway::new(
        vec![task("A", "a", false)],
        vec![first_rx, second_rx],
    ));

    let first = store.refresh();
    let second = async {
        store.gateway().inner.add("b").await.expect("server-side add");
        store.refresh().await
    };
    let driver = async {
        tokio::task::yield_now().await;
        if later_arrives_first {
            second_tx.send(()).ok();
            tokio::task::yield_now().await;
            first_tx.send(()).ok();
        } else {
            first_tx.send(()).ok();
            tokio::task::yield_now().await;
            second_tx.send(()).ok();
        }
    };
    let (first, second, ()) = tokio::join!(first, second, driver);

    assert!(matches!(first, Ok(RefreshOutcome::Discarded { token: 1, latest: 2 })));
    assert_eq!(second, Ok(RefreshOutcome::Applied { count: 2 }));
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.tasks.len(), 2);
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn later_refresh_wins_when_it_arrives_first() {
    overlapping_refreshes(true).await;
}

#[tokio::test]
async fn later_refresh_wins_when_it_arrives_last() {
    overlapping_refreshes(false).await;
}
