//! HTTP surface of the `tasks` table.
//!
//! | Method   | Path          | Body        | `data` on success        |
//! |----------|---------------|-------------|--------------------------|
//! | `POST`   | `/tasks`      | `NewTask`   | inserted row             |
//! | `GET`    | `/tasks`      | -           | all rows (`?order=...`)  |
//! | `PATCH`  | `/tasks/{id}` | `TaskPatch` | updated row, or `null`   |
//! | `DELETE` | `/tasks/{id}` | -           | `null`                   |
//!
//! Every response body is a [`StoreResponse`]. Failures set its `error`
//! side and use a non-2xx status.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use taskboard_proto::table::{self, LIST_ORDER, Order, StoreError, StoreResponse, TABLE_NAME};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use crate::store::TableStore;

/// Default maximum accepted request body size in bytes (64 KB).
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// SQLSTATE code for malformed literal input, such as a bad uuid.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Code reported for unparseable query parameters.
const BAD_QUERY: &str = "PGRST100";

/// Code reported for request bodies that are not a valid row.
const BAD_BODY: &str = "PGRST102";

type Reply<T> = (StatusCode, Json<StoreResponse<T>>);

/// Shared server state.
pub struct ServerState {
    /// The `tasks` table.
    pub table: TableStore,
    /// Maximum accepted request body size in bytes.
    max_body_size: usize,
    /// Sort for reads without an `order` parameter.
    default_order: Vec<Order>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates state with an empty table and the default body limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: TableStore::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            default_order: LIST_ORDER.to_vec(),
        }
    }

    /// Creates state around an existing table.
    #[must_use]
    pub fn with_table(table: TableStore) -> Self {
        Self {
            table,
            ..Self::new()
        }
    }

    /// Sets the request body limit.
    #[must_use]
    pub const fn body_limit(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Sets the sort used when a read names none.
    #[must_use]
    pub fn default_order(mut self, order: Vec<Order>) -> Self {
        self.default_order = order;
        self
    }
}

/// Builds the router for the table endpoints.
pub fn router(state: Arc<ServerState>) -> axum::Router {
    let path = format!("/{TABLE_NAME}");
    let row_path = format!("/{TABLE_NAME}/{{id}}");
    let limit = state.max_body_size;

    axum::Router::new()
        .route(&path, get(select_rows).post(insert_row))
        .route(&row_path, patch(update_row).delete(delete_row))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Starts the server on `addr` with empty state.
///
/// Returns the bound address (useful when binding port 0) and the join
/// handle of the serving task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(ServerState::new())).await
}

/// Starts the server with pre-configured [`ServerState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "table server error");
        }
    });

    Ok((bound_addr, handle))
}

#[derive(Debug, Default, serde::Deserialize)]
struct SelectParams {
    order: Option<String>,
}

async fn insert_row(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Reply<Task> {
    let Json(new) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(&rejection),
    };
    match state.table.insert(new).await {
        Ok(task) => {
            tracing::info!(id = %task.id, "task inserted");
            (StatusCode::CREATED, Json(StoreResponse::ok(task)))
        }
        Err(e) => {
            tracing::warn!(error = %e.message, "insert rejected");
            failed(StatusCode::BAD_REQUEST, e)
        }
    }
}

async fn select_rows(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SelectParams>,
) -> Reply<Vec<Task>> {
    let order = match params.order.as_deref() {
        Some(text) => match table::parse_order(text) {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, "bad order parameter");
                return failed(
                    StatusCode::BAD_REQUEST,
                    StoreError::new(e.to_string()).with_code(BAD_QUERY),
                );
            }
        },
        None => state.default_order.clone(),
    };
    let rows = state.table.select(&order).await;
    tracing::debug!(count = rows.len(), "rows selected");
    (StatusCode::OK, Json(StoreResponse::ok(rows)))
}

async fn update_row(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> Reply<Task> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(&rejection),
    };
    match state.table.update(&id, &patch).await {
        Ok(Some(task)) => {
            tracing::info!(id = %id, "task updated");
            (StatusCode::OK, Json(StoreResponse::ok(task)))
        }
        Ok(None) => (StatusCode::OK, Json(StoreResponse::empty())),
        Err(e) => {
            tracing::warn!(id = %id, error = %e.message, "update rejected");
            failed(StatusCode::BAD_REQUEST, e)
        }
    }
}

async fn delete_row(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Reply<()> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    if state.table.delete(&id).await {
        tracing::info!(id = %id, "task deleted");
    }
    (StatusCode::OK, Json(StoreResponse::empty()))
}

fn parse_id<T>(text: &str) -> Result<TaskId, Reply<T>> {
    TaskId::parse_canonical(text).ok_or_else(|| {
        failed(
            StatusCode::BAD_REQUEST,
            StoreError::new(format!("invalid input syntax for type uuid: \"{text}\""))
                .with_code(INVALID_TEXT_REPRESENTATION),
        )
    })
}

fn bad_body<T>(rejection: &JsonRejection) -> Reply<T> {
    tracing::warn!(error = %rejection.body_text(), "bad request body");
    failed(
        rejection.status(),
        StoreError::new(rejection.body_text()).with_code(BAD_BODY),
    )
}

fn failed<T>(status: StatusCode, error: StoreError) -> Reply<T> {
    (status, Json(StoreResponse::failed(error)))
}
