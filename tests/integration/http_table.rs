//! Integration tests for the HTTP table client against `taskboard-server`.
//!
//! Validates:
//! - Insert, select, update and delete round-trip through the server
//! - Store-reported failures arrive as `{ data: null, error }`
//! - Refused connections and stalled servers surface as network and
//!   timeout failures with their fixed messages

use std::time::Duration;

use taskboard::table::{HttpTable, TableError, TaskTable};
use taskboard::tasks::{ErrorKind, TaskOps};
use taskboard_proto::table::{Column, LIST_ORDER, Order};
use taskboard_proto::task::{NewTask, TaskId, TaskPatch, TaskStatus};

/// Start the table server in-process and return its base URL.
async fn start_server() -> (String, tokio::task::JoinHandle<()>) {
    let (addr, handle) = taskboard_server::api::start_server("127.0.0.1:0")
        .await
        .expect("failed to start table server");
    (format!("http://{addr}"), handle)
}

fn client(base: &str) -> HttpTable {
    HttpTable::new(base, Duration::from_secs(5)).expect("valid base url")
}

#[tokio::test]
async fn insert_then_select() {
    let (base, _handle) = start_server().await;
    let table = client(&base);

    let resp = table
        .insert(&NewTask::new("Buy milk").with_description("2 liters"))
        .await
        .unwrap();
    assert!(resp.error.is_none());
    let task = resp.data.unwrap();
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description.as_deref(), Some("2 liters"));
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.created_at.is_some());

    let rows = table.select(&LIST_ORDER).await.unwrap().data.unwrap();
    assert_eq!(rows, [task]);
}

#[tokio::test]
async fn select_honours_order() {
    let (base, _handle) = start_server().await;
    let table = client(&base);

    for title in ["one", "two", "three"] {
        table.insert(&NewTask::new(title)).await.unwrap();
    }

    let titles = |rows: Vec<taskboard_proto::task::Task>| -> Vec<String> {
        rows.into_iter().map(|t| t.title).collect()
    };

    let newest_first = table.select(&LIST_ORDER).await.unwrap().data.unwrap();
    assert_eq!(titles(newest_first), ["three", "two", "one"]);

    let oldest_first = table
        .select(&[Order::asc(Column::CreatedAt)])
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(titles(oldest_first), ["one", "two", "three"]);
}

#[tokio::test]
async fn update_and_delete_by_id() {
    let (base, _handle) = start_server().await;
    let table = client(&base);
    let task = table
        .insert(&NewTask::new("Draft"))
        .await
        .unwrap()
        .data
        .unwrap();

    let updated = table
        .update(&task.id, &TaskPatch::complete())
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.status, TaskStatus::Completed);
    assert!(updated.updated_at > task.updated_at);

    let resp = table.delete(&task.id).await.unwrap();
    assert!(resp.error.is_none());
    assert!(table.select(&LIST_ORDER).await.unwrap().data.unwrap().is_empty());
}

#[tokio::test]
async fn update_of_missing_row_returns_no_data() {
    let (base, _handle) = start_server().await;
    let table = client(&base);
    let resp = table
        .update(&TaskId::new(), &TaskPatch::complete())
        .await
        .unwrap();
    assert!(resp.data.is_none());
    assert!(resp.error.is_none());
}

#[tokio::test]
async fn check_constraint_is_reported_in_envelope() {
    let (base, _handle) = start_server().await;
    let table = client(&base);
    let resp = table.insert(&NewTask::new("")).await.unwrap();
    assert!(resp.data.is_none());
    let error = resp.error.unwrap();
    assert!(error.message.contains("tasks_title_check"));
    assert_eq!(error.code.as_deref(), Some("23514"));
}

#[tokio::test]
async fn ops_over_http_follow_list_order() {
    let (base, _handle) = start_server().await;
    let ops = TaskOps::new(client(&base));

    let first = ops.create(&NewTask::new("first")).await.unwrap();
    ops.create(&NewTask::new("second")).await.unwrap();
    ops.complete(&first.id).await.unwrap();

    let tasks = ops.list().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "second");
    assert!(tasks[1].is_completed());
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let table = client(&format!("http://{addr}"));
    let err = table.select(&LIST_ORDER).await.unwrap_err();
    assert!(matches!(err, TableError::Network(_)), "got {err:?}");

    let ops = TaskOps::new(table);
    let err = ops.list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(
        err.to_string(),
        "Network error. Please check your connection and try again."
    );
}

#[tokio::test]
async fn stalled_server_is_timeout() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _stall = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let table = HttpTable::new(&format!("http://{addr}"), Duration::from_millis(200)).unwrap();
    let err = TaskOps::new(table)
        .create(&NewTask::new("never stored"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.to_string(), "Request timed out. Please try again.");
}
