//! HTTP client for the hosted `tasks` table.
//!
//! Speaks the JSON surface of `taskboard-server`. Transport failures are
//! classified once here: connection problems become
//! [`TableError::Network`], expired deadlines [`TableError::Timeout`], and
//! bodies that are not a `{ data, error }` envelope [`TableError::Malformed`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use taskboard_proto::table::{self, Order, StoreResponse, TABLE_NAME};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};
use url::Url;

use super::{TableError, TaskTable};

/// Errors raised while constructing an [`HttpTable`].
#[derive(Debug, thiserror::Error)]
pub enum HttpTableError {
    /// The base URL is not a valid `http(s)` base.
    #[error("invalid data store url {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL text.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`TaskTable`] backed by `taskboard-server` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTable {
    client: Client,
    /// `<base>/tasks`, without a trailing slash.
    endpoint: String,
}

impl HttpTable {
    /// Creates a client for the table served under `base_url`.
    ///
    /// Each call is abandoned after `request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTableError::InvalidUrl`] if `base_url` does not parse
    /// or is not `http`/`https`, and [`HttpTableError::Client`] if the
    /// client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, HttpTableError> {
        let invalid = |reason: String| HttpTableError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }

        let client = Client::builder().timeout(request_timeout).build()?;
        let endpoint = format!("{}/{TABLE_NAME}", url.as_str().trim_end_matches('/'));
        Ok(Self { client, endpoint })
    }

    /// The table endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn row_url(&self, id: &TaskId) -> String {
        format!("{}/{id}", self.endpoint)
    }

    /// Sends a request and decodes the `{ data, error }` envelope.
    ///
    /// Non-2xx statuses still carry an envelope; only a body that fails to
    /// decode is treated as a failed call.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<StoreResponse<T>, TableError> {
        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;

        match serde_json::from_slice::<StoreResponse<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => {
                tracing::warn!(%status, error = %e, "undecodable table response");
                Err(TableError::Malformed)
            }
            Err(_) => Err(TableError::Failed(format!("data store returned HTTP {status}"))),
        }
    }
}

/// Maps a reqwest failure onto [`TableError`].
fn classify(error: reqwest::Error) -> TableError {
    if error.is_timeout() {
        TableError::Timeout
    } else if error.is_connect() || error.is_request() {
        TableError::Network(error.to_string())
    } else if error.is_decode() || error.is_body() {
        TableError::Malformed
    } else {
        TableError::Failed(error.to_string())
    }
}

impl TaskTable for HttpTable {
    async fn insert(&self, task: &NewTask) -> Result<StoreResponse<Task>, TableError> {
        tracing::debug!(endpoint = %self.endpoint, "insert");
        self.execute(self.client.post(&self.endpoint).json(task))
            .await
    }

    async fn select(&self, order: &[Order]) -> Result<StoreResponse<Vec<Task>>, TableError> {
        tracing::debug!(endpoint = %self.endpoint, "select");
        let order = table::format_order(order);
        self.execute(self.client.get(&self.endpoint).query(&[("order", order)]))
            .await
    }

    async fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<StoreResponse<Task>, TableError> {
        tracing::debug!(id = %id, "update");
        self.execute(self.client.patch(self.row_url(id)).json(patch))
            .await
    }

    async fn delete(&self, id: &TaskId) -> Result<StoreResponse<()>, TableError> {
        tracing::debug!(id = %id, "delete");
        self.execute(self.client.delete(self.row_url(id))).await
    }
}
