//! Integration tests for the task store running against `taskboard-server`.
//!
//! Validates the client-side collection end to end:
//! - add, fetch, update, complete and delete keep the cache in step with
//!   the server
//! - failures land in the error slot with their user-facing message
//! - loading flags are independent per operation

use std::sync::Arc;
use std::time::Duration;

use taskboard::table::{HttpTable, MemoryTable};
use taskboard::tasks::{Operation, TaskError, TaskStore};
use taskboard_proto::task::{NewTask, TaskPatch, TaskStatus};

async fn http_store() -> (TaskStore<HttpTable>, tokio::task::JoinHandle<()>) {
    let (addr, handle) = taskboard_server::api::start_server("127.0.0.1:0")
        .await
        .expect("failed to start table server");
    let table = HttpTable::new(&format!("http://{addr}"), Duration::from_secs(5))
        .expect("valid base url");
    (TaskStore::new(table), handle)
}

#[tokio::test]
async fn full_lifecycle_over_http() {
    let (store, _handle) = http_store().await;

    let a = store.add_task(&NewTask::new("a")).await.unwrap();
    let b = store.add_task(&NewTask::new("b")).await.unwrap();
    assert_eq!(store.tasks(), [b.clone(), a.clone()]);

    let fetched = store.fetch_tasks().await.unwrap();
    assert_eq!(fetched, [b.clone(), a.clone()]);

    let renamed = store
        .update_task(
            &a.id,
            &TaskPatch {
                title: Some("a, renamed".into()),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.find(&a.id), Some(renamed));

    let done = store.complete_task(&b.id).await.unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(store.tasks().len(), 2);

    store.delete_task(&a.id).await.unwrap();
    assert!(store.find(&a.id).is_none());
    assert_eq!(store.fetch_tasks().await.unwrap(), [done]);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn empty_list_is_empty_collection() {
    let (store, _handle) = http_store().await;
    assert!(store.fetch_tasks().await.unwrap().is_empty());
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn complete_of_deleted_task_sets_error() {
    let (store, _handle) = http_store().await;
    let task = store.add_task(&NewTask::new("gone soon")).await.unwrap();
    store.delete_task(&task.id).await.unwrap();

    let err = store.complete_task(&task.id).await.unwrap_err();
    assert_eq!(err, TaskError::EmptyResult(Operation::Complete));
    assert_eq!(store.error().as_deref(), Some("Failed to complete task"));
    assert!(!store.is_loading(Operation::Complete));
}

#[tokio::test]
async fn validation_failure_sets_error_before_any_call() {
    let store = TaskStore::new(MemoryTable::new());
    let err = store
        .add_task(&NewTask::new("x".repeat(201)))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));
    assert_eq!(
        store.error().as_deref(),
        Some("Title must be less than 200 characters")
    );
    assert_eq!(store.ops().table().calls(), 0);
}

#[tokio::test]
async fn loading_flags_are_independent() {
    let store = Arc::new(TaskStore::new(MemoryTable::new()));
    store.ops().table().set_latency(Duration::from_millis(100));
    let mut rx = store.subscribe();

    let fetch = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.fetch_tasks().await }
    });
    rx.wait_for(|s| s.loading.get(Operation::List)).await.unwrap();

    let add = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.add_task(&NewTask::new("concurrent")).await }
    });
    rx.wait_for(|s| s.loading.get(Operation::Create))
        .await
        .unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.loading.get(Operation::List));
    assert!(snapshot.loading.get(Operation::Create));
    assert!(!snapshot.loading.get(Operation::Delete));

    fetch.await.unwrap().unwrap();
    add.await.unwrap().unwrap();
    assert!(!store.snapshot().loading.any());
}

#[tokio::test]
async fn subscribers_see_error_then_clear() {
    let store = TaskStore::new(MemoryTable::new());
    let mut rx = store.subscribe();

    store.ops().table().fail_next("TypeError: Failed to fetch");
    store.fetch_tasks().await.unwrap_err();
    assert!(rx.has_changed().unwrap());
    assert_eq!(
        rx.borrow_and_update().error.as_deref(),
        Some("Network error. Please check your connection and try again.")
    );

    store.clear_error();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().error, None);

    store.clear_error();
    assert!(!rx.has_changed().unwrap());
}
