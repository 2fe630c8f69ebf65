//! The five task operations against the `tasks` table.
//!
//! Each operation makes one call through a [`TaskTable`] and turns whatever
//! went wrong into a [`TaskError`]. Normalization happens only here; callers
//! switch on [`TaskError::kind`] rather than inspecting message text.

use taskboard_proto::table::{LIST_ORDER, StoreError, StoreResponse};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use super::validation;
use super::{Operation, TaskError};
use crate::table::{TableError, TaskTable};

/// Runs task operations against a table.
#[derive(Debug, Clone)]
pub struct TaskOps<T> {
    table: T,
}

impl<T: TaskTable> TaskOps<T> {
    /// Wraps the given table.
    pub const fn new(table: T) -> Self {
        Self { table }
    }

    /// The underlying table.
    pub const fn table(&self) -> &T {
        &self.table
    }

    /// Inserts a task and returns the stored record.
    ///
    /// # Errors
    ///
    /// [`TaskError::Validation`] before any call if the fields are invalid,
    /// [`TaskError::EmptyResult`] if the store returns no row, or a
    /// normalized store failure.
    pub async fn create(&self, task: &NewTask) -> Result<Task, TaskError> {
        validation::validate_new_task(task)?;
        tracing::debug!(title = %task.title, "creating task");
        let response = self
            .table
            .insert(task)
            .await
            .map_err(|e| normalize_table_error(e, Operation::Create))?;
        let created = expect_row(response, Operation::Create)?;
        tracing::info!(id = %created.id, "task created");
        Ok(created)
    }

    /// Returns every task, by status then newest first.
    ///
    /// An empty table yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns a normalized store failure.
    pub async fn list(&self) -> Result<Vec<Task>, TaskError> {
        let response = self
            .table
            .select(&LIST_ORDER)
            .await
            .map_err(|e| normalize_table_error(e, Operation::List))?;
        if let Some(error) = response.error {
            return Err(store_failure(&error, Operation::List));
        }
        let tasks = response.data.unwrap_or_default();
        tracing::debug!(count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    /// Applies `patch` to the task with the given id and returns the result.
    ///
    /// Any status transition is allowed.
    ///
    /// # Errors
    ///
    /// [`TaskError::Validation`] before any call if a present field is
    /// invalid, [`TaskError::EmptyResult`] if no row matched, or a normalized
    /// store failure.
    pub async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, TaskError> {
        validation::validate_patch(patch)?;
        self.write(id, patch, Operation::Update).await
    }

    /// Deletes the task with the given id.
    ///
    /// Deleting a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns a normalized store failure.
    pub async fn delete(&self, id: &TaskId) -> Result<(), TaskError> {
        let response = self
            .table
            .delete(id)
            .await
            .map_err(|e| normalize_table_error(e, Operation::Delete))?;
        if let Some(error) = response.error {
            return Err(store_failure(&error, Operation::Delete));
        }
        tracing::info!(id = %id, "task deleted");
        Ok(())
    }

    /// Marks the task with the given id completed and returns the result.
    ///
    /// # Errors
    ///
    /// [`TaskError::EmptyResult`] if no row matched, or a normalized store
    /// failure.
    pub async fn complete(&self, id: &TaskId) -> Result<Task, TaskError> {
        self.write(id, &TaskPatch::complete(), Operation::Complete)
            .await
    }

    async fn write(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
        operation: Operation,
    ) -> Result<Task, TaskError> {
        let response = self
            .table
            .update(id, patch)
            .await
            .map_err(|e| normalize_table_error(e, operation))?;
        let task = expect_row(response, operation)?;
        tracing::info!(id = %task.id, %operation, status = %task.status, "task written");
        Ok(task)
    }
}

/// Unwraps the single row an insert or update must return.
fn expect_row(response: StoreResponse<Task>, operation: Operation) -> Result<Task, TaskError> {
    if let Some(error) = response.error {
        return Err(store_failure(&error, operation));
    }
    response.data.ok_or_else(|| {
        tracing::warn!(%operation, "store returned no row");
        TaskError::EmptyResult(operation)
    })
}

fn store_failure(error: &StoreError, operation: Operation) -> TaskError {
    tracing::warn!(
        %operation,
        code = error.code.as_deref().unwrap_or(""),
        message = %error.message,
        "store reported failure"
    );
    normalize_store_error(error)
}

/// Maps an error the store reported to its user-facing form.
///
/// Messages mentioning `network` or `fetch` become [`TaskError::Network`],
/// those mentioning `timeout` become [`TaskError::Timeout`]. Matching is
/// case-sensitive. Anything else keeps its message as [`TaskError::Remote`].
#[must_use]
pub fn normalize_store_error(error: &StoreError) -> TaskError {
    let message = error.message.as_str();
    if message.contains("network") || message.contains("fetch") {
        TaskError::Network
    } else if message.contains("timeout") {
        TaskError::Timeout
    } else {
        TaskError::Remote(error.message.clone())
    }
}

/// Maps an outright call failure to its user-facing form.
///
/// Failures that carry no usable message take the operation's default.
#[must_use]
pub fn normalize_table_error(error: TableError, operation: Operation) -> TaskError {
    tracing::warn!(%operation, error = %error, "table call failed");
    match error {
        TableError::Network(_) => TaskError::Network,
        TableError::Timeout => TaskError::Timeout,
        TableError::Failed(message) if !message.is_empty() => TaskError::Unexpected(message),
        TableError::Failed(_) | TableError::Malformed => {
            TaskError::Unexpected(operation.failure_message().to_string())
        }
    }
}
