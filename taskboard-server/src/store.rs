//! Shared, lock-protected `tasks` table.
//!
//! [`TableStore`] wraps a [`RowSet`] in a [`RwLock`] so that concurrent
//! requests see a consistent table. Each call takes the lock once; there is
//! no cross-request transaction.

use taskboard_proto::rows::RowSet;
use taskboard_proto::table::{Order, StoreError};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};
use tokio::sync::RwLock;

/// The server's copy of the `tasks` table.
pub struct TableStore {
    rows: RwLock<RowSet>,
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(RowSet::new()),
        }
    }

    /// Creates a table holding `rows`, inserted in the given order.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] of the first row that fails the title
    /// check constraint.
    pub fn seeded(rows: Vec<NewTask>) -> Result<Self, StoreError> {
        let mut set = RowSet::new();
        for row in rows {
            set.insert(row)?;
        }
        Ok(Self {
            rows: RwLock::new(set),
        })
    }

    /// Inserts a row and returns it with its assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] raised by the title check constraint.
    pub async fn insert(&self, new: NewTask) -> Result<Task, StoreError> {
        let task = self.rows.write().await.insert(new)?;
        tracing::debug!(id = %task.id, "row inserted");
        Ok(task)
    }

    /// Returns all rows in the requested order.
    pub async fn select(&self, order: &[Order]) -> Vec<Task> {
        self.rows.read().await.select(order)
    }

    /// Updates the matching row, returning `Ok(None)` if none matches.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] raised by the title check constraint.
    pub async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
        let updated = self.rows.write().await.update(id, patch)?;
        if updated.is_none() {
            tracing::debug!(id = %id, "update matched no row");
        }
        Ok(updated)
    }

    /// Deletes the matching row. Returns `true` if one was removed.
    pub async fn delete(&self, id: &TaskId) -> bool {
        let removed = self.rows.write().await.delete(id);
        tracing::debug!(id = %id, removed, "delete");
        removed
    }

    /// Number of rows currently stored.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns `true` if the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}
