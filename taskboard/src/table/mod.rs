//! Data-store collaborator for `Taskboard`.
//!
//! Defines the [`TaskTable`] trait that every backing store must satisfy.
//! Concrete implementations include:
//! - [`memory::MemoryTable`]: in-process table for tests and offline use
//! - [`http::HttpTable`]: HTTP client for `taskboard-server`

pub mod http;
pub mod memory;

use std::sync::Arc;

use taskboard_proto::table::{Order, StoreResponse};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

pub use http::HttpTable;
pub use memory::MemoryTable;

/// An outright failure of a table call, as opposed to an error the store
/// reported inside a [`StoreResponse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The store could not be reached.
    #[error("network failure: {0}")]
    Network(String),

    /// The call did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// A recognized failure carrying its own message.
    #[error("{0}")]
    Failed(String),

    /// An unrecognized failure with no usable message.
    #[error("malformed response from data store")]
    Malformed,
}

/// Async access to the `tasks` table.
///
/// Each method performs exactly one round trip. `Ok` carries the store's
/// `{ data, error }` answer, which may itself report a failure; `Err` means
/// the call never produced an answer.
pub trait TaskTable: Send + Sync {
    /// Inserts one row and reads it back.
    fn insert(
        &self,
        task: &NewTask,
    ) -> impl std::future::Future<Output = Result<StoreResponse<Task>, TableError>> + Send;

    /// Selects every row in the given order.
    fn select(
        &self,
        order: &[Order],
    ) -> impl std::future::Future<Output = Result<StoreResponse<Vec<Task>>, TableError>> + Send;

    /// Updates the row whose id matches exactly and reads it back.
    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<StoreResponse<Task>, TableError>> + Send;

    /// Deletes the row whose id matches exactly.
    fn delete(
        &self,
        id: &TaskId,
    ) -> impl std::future::Future<Output = Result<StoreResponse<()>, TableError>> + Send;
}

impl<T: TaskTable> TaskTable for Arc<T> {
    fn insert(
        &self,
        task: &NewTask,
    ) -> impl std::future::Future<Output = Result<StoreResponse<Task>, TableError>> + Send {
        (**self).insert(task)
    }

    fn select(
        &self,
        order: &[Order],
    ) -> impl std::future::Future<Output = Result<StoreResponse<Vec<Task>>, TableError>> + Send
    {
        (**self).select(order)
    }

    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<StoreResponse<Task>, TableError>> + Send {
        (**self).update(id, patch)
    }

    fn delete(
        &self,
        id: &TaskId,
    ) -> impl std::future::Future<Output = Result<StoreResponse<()>, TableError>> + Send {
        (**self).delete(id)
    }
}
