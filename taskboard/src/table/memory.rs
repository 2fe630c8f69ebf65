//! In-process table for tests and offline use.
//!
//! [`MemoryTable`] keeps rows in a [`RowSet`], so it mints ids and orders
//! rows exactly as the hosted table does. Faults can be queued to make the
//! next calls fail in a chosen way, and an optional latency keeps calls in
//! flight long enough to observe loading state.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use taskboard_proto::rows::RowSet;
use taskboard_proto::table::{Order, StoreError, StoreResponse};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use super::{TableError, TaskTable};

/// A queued outcome that replaces the next call's real behavior.
#[derive(Debug, Clone)]
enum Fault {
    /// Answer with `{ data: null, error }`.
    Respond(StoreError),
    /// Fail the call outright.
    Reject(TableError),
    /// Answer with `{ data: null, error: null }`.
    Empty,
}

/// In-memory [`TaskTable`].
#[derive(Default)]
pub struct MemoryTable {
    rows: Mutex<RowSet>,
    faults: Mutex<VecDeque<Fault>>,
    latency: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl MemoryTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call answer with a store-reported error.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.faults
            .lock()
            .push_back(Fault::Respond(StoreError::new(message)));
    }

    /// Makes the next call fail outright with `error`.
    pub fn reject_next(&self, error: TableError) {
        self.faults.lock().push_back(Fault::Reject(error));
    }

    /// Makes the next call answer with neither data nor error.
    pub fn empty_next(&self) {
        self.faults.lock().push_back(Fault::Empty);
    }

    /// Delays every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Number of calls received so far, faulted ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inserts a row directly, bypassing faults and the call counter.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] raised by the title check constraint.
    pub fn seed(&self, task: NewTask) -> Result<Task, StoreError> {
        self.rows.lock().insert(task)
    }

    /// Returns the stored row with the given id.
    #[must_use]
    pub fn row(&self, id: &TaskId) -> Option<Task> {
        self.rows.lock().get(id).cloned()
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// Returns `true` if no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    /// Counts the call, waits out the latency, and pops a queued fault.
    async fn enter(&self) -> Option<Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.faults.lock().pop_front()
    }
}

/// Resolves a fault into the response it stands for.
fn faulted<T>(fault: Fault) -> Result<StoreResponse<T>, TableError> {
    match fault {
        Fault::Respond(error) => Ok(StoreResponse::failed(error)),
        Fault::Reject(error) => Err(error),
        Fault::Empty => Ok(StoreResponse::empty()),
    }
}

impl TaskTable for MemoryTable {
    async fn insert(&self, task: &NewTask) -> Result<StoreResponse<Task>, TableError> {
        if let Some(fault) = self.enter().await {
            return faulted(fault);
        }
        let result = self.rows.lock().insert(task.clone());
        Ok(result.map_or_else(StoreResponse::failed, StoreResponse::ok))
    }

    async fn select(&self, order: &[Order]) -> Result<StoreResponse<Vec<Task>>, TableError> {
        if let Some(fault) = self.enter().await {
            return faulted(fault);
        }
        Ok(StoreResponse::ok(self.rows.lock().select(order)))
    }

    async fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<StoreResponse<Task>, TableError> {
        if let Some(fault) = self.enter().await {
            return faulted(fault);
        }
        let result = self.rows.lock().update(id, patch);
        Ok(match result {
            Ok(Some(task)) => StoreResponse::ok(task),
            Ok(None) => StoreResponse::empty(),
            Err(error) => StoreResponse::failed(error),
        })
    }

    async fn delete(&self, id: &TaskId) -> Result<StoreResponse<()>, TableError> {
        if let Some(fault) = self.enter().await {
            return faulted(fault);
        }
        self.rows.lock().delete(id);
        Ok(StoreResponse::empty())
    }
}
