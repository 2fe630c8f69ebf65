//! In-memory row set with the write semantics of the `tasks` table.
//!
//! [`RowSet`] mints identifiers and timestamps, enforces the title check
//! constraint, and answers reads in the requested order. It does no locking;
//! owners wrap it in whatever lock suits their runtime.

use chrono::{DateTime, TimeDelta, Utc};

use crate::table::{Order, StoreError, sort_rows};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

/// SQLSTATE code reported when a row violates a check constraint.
pub const CHECK_VIOLATION: &str = "23514";

/// Rows of the `tasks` table in insertion order.
#[derive(Debug, Default)]
pub struct RowSet {
    rows: Vec<Task>,
    last_write: Option<DateTime<Utc>>,
}

impl RowSet {
    /// Creates an empty row set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] with code [`CHECK_VIOLATION`] if the title is
    /// empty.
    pub fn insert(&mut self, new: NewTask) -> Result<Task, StoreError> {
        check_title(&new.title)?;
        let now = self.stamp();
        let task = Task {
            id: TaskId::new(),
            title: new.title,
            description: new.description,
            status: new.status,
            deadline: new.deadline,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.rows.push(task.clone());
        Ok(task)
    }

    /// Returns every row sorted by `order`.
    #[must_use]
    pub fn select(&self, order: &[Order]) -> Vec<Task> {
        let mut rows = self.rows.clone();
        sort_rows(&mut rows, order);
        rows
    }

    /// Returns the row with the given id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.rows.iter().find(|t| t.id == *id)
    }

    /// Applies `patch` to the matching row and returns the updated row.
    ///
    /// Returns `Ok(None)` if no row matches.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] with code [`CHECK_VIOLATION`] if the patch
    /// sets an empty title.
    pub fn update(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
        if let Some(title) = &patch.title {
            check_title(title)?;
        }
        let Some(index) = self.rows.iter().position(|t| t.id == *id) else {
            return Ok(None);
        };
        let now = self.stamp();
        let task = &mut self.rows[index];
        task.apply(patch);
        task.updated_at = Some(now);
        Ok(Some(task.clone()))
    }

    /// Deletes the matching row. Returns `true` if a row was removed.
    pub fn delete(&mut self, id: &TaskId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|t| t.id != *id);
        self.rows.len() != before
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a write timestamp strictly after the previous one.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_write {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_write = Some(stamp);
        stamp
    }
}

fn check_title(title: &str) -> Result<(), StoreError> {
    if title.is_empty() {
        return Err(StoreError::new(
            "new row for relation \"tasks\" violates check constraint \"tasks_title_check\"",
        )
        .with_code(CHECK_VIOLATION));
    }
    Ok(())
}
