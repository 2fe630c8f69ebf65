//! Client-side task state.
//!
//! [`TaskStore`] caches the task collection, tracks which operations are in
//! flight, and keeps the message of the last failure. State is published
//! through a [`tokio::sync::watch`] channel so views can react to changes.
//! The store is owned by whoever composes the application and shared by
//! reference or `Arc`; there is no global instance.

use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};
use tokio::sync::watch;

use super::{Operation, TaskError, TaskOps};
use crate::table::TaskTable;

/// One loading flag per [`Operation`].
///
/// Each flag counts in-flight calls of its kind, so overlapping calls of the
/// same kind keep it raised until the last one settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    in_flight: [usize; Operation::ALL.len()],
}

impl LoadingFlags {
    /// Returns `true` while an operation of this kind is in flight.
    #[must_use]
    pub const fn get(&self, operation: Operation) -> bool {
        self.in_flight[operation.index()] > 0
    }

    /// Returns `true` while any operation is in flight.
    #[must_use]
    pub fn any(&self) -> bool {
        self.in_flight.iter().any(|&n| n > 0)
    }

    fn raise(&mut self, operation: Operation) {
        self.in_flight[operation.index()] += 1;
    }

    fn lower(&mut self, operation: Operation) {
        let count = &mut self.in_flight[operation.index()];
        *count = count.saturating_sub(1);
    }
}

/// A snapshot of everything the store tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Cached tasks, in the order last received or modified locally.
    pub tasks: Vec<Task>,
    /// In-flight operations.
    pub loading: LoadingFlags,
    /// Message of the last failure, if not cleared since.
    pub error: Option<String>,
}

/// Task collection with loading and error bookkeeping around [`TaskOps`].
///
/// Every operation raises its loading flag and clears the error before the
/// remote call, then lowers the flag once the call settles. A failure is
/// recorded in the error slot and also returned to the caller.
pub struct TaskStore<T> {
    ops: TaskOps<T>,
    state: watch::Sender<StoreState>,
}

impl<T: TaskTable> TaskStore<T> {
    /// Creates an empty store over `table`.
    pub fn new(table: T) -> Self {
        Self::with_ops(TaskOps::new(table))
    }

    /// Creates an empty store over existing operations.
    #[must_use]
    pub fn with_ops(ops: TaskOps<T>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { ops, state }
    }

    /// The operations this store wraps.
    pub const fn ops(&self) -> &TaskOps<T> {
        &self.ops
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// A copy of the cached tasks.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    /// Looks up a cached task.
    #[must_use]
    pub fn find(&self, id: &TaskId) -> Option<Task> {
        self.state.borrow().tasks.iter().find(|t| t.id == *id).cloned()
    }

    /// Returns `true` while an operation of this kind is in flight.
    #[must_use]
    pub fn is_loading(&self, operation: Operation) -> bool {
        self.state.borrow().loading.get(operation)
    }

    /// Message of the last failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Clears the error slot. Subscribers are not woken if it was empty.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Creates a task and puts it at the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] from [`TaskOps::create`].
    pub async fn add_task(&self, task: &NewTask) -> Result<Task, TaskError> {
        let guard = self.begin(Operation::Create);
        let created = guard.settle(self.ops.create(task).await)?;
        self.commit(guard, |tasks| tasks.insert(0, created.clone()));
        Ok(created)
    }

    /// Replaces the collection with a fresh listing.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] from [`TaskOps::list`].
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, TaskError> {
        let guard = self.begin(Operation::List);
        let tasks = guard.settle(self.ops.list().await)?;
        self.commit(guard, |cached| cached.clone_from(&tasks));
        Ok(tasks)
    }

    /// Deletes a task and drops it from the collection.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] from [`TaskOps::delete`].
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), TaskError> {
        let guard = self.begin(Operation::Delete);
        guard.settle(self.ops.delete(id).await)?;
        self.commit(guard, |tasks| tasks.retain(|t| t.id != *id));
        Ok(())
    }

    /// Updates a task and replaces its cached entry.
    ///
    /// The collection is left as is if the task is not cached.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] from [`TaskOps::update`].
    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, TaskError> {
        let guard = self.begin(Operation::Update);
        let updated = guard.settle(self.ops.update(id, patch).await)?;
        self.commit(guard, |tasks| replace(tasks, id, &updated));
        Ok(updated)
    }

    /// Completes a task and replaces its cached entry.
    ///
    /// The collection is left as is if the task is not cached.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] from [`TaskOps::complete`].
    pub async fn complete_task(&self, id: &TaskId) -> Result<Task, TaskError> {
        let guard = self.begin(Operation::Complete);
        let completed = guard.settle(self.ops.complete(id).await)?;
        self.commit(guard, |tasks| replace(tasks, id, &completed));
        Ok(completed)
    }

    fn begin(&self, operation: Operation) -> LoadingGuard<'_> {
        self.state.send_modify(|state| {
            state.loading.raise(operation);
            state.error = None;
        });
        LoadingGuard {
            state: &self.state,
            operation,
            armed: true,
        }
    }

    /// Applies a successful result and lowers the flag in one update.
    fn commit(&self, mut guard: LoadingGuard<'_>, apply: impl FnOnce(&mut Vec<Task>)) {
        guard.armed = false;
        self.state.send_modify(|state| {
            apply(&mut state.tasks);
            state.loading.lower(guard.operation);
        });
    }
}

fn replace(tasks: &mut [Task], id: &TaskId, task: &Task) {
    if let Some(slot) = tasks.iter_mut().find(|t| t.id == *id) {
        slot.clone_from(task);
    }
}

/// Lowers a loading flag when dropped, unless the store commits first.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<StoreState>,
    operation: Operation,
    armed: bool,
}

impl LoadingGuard<'_> {
    /// Records a failure in the error slot; the flag drops with the guard.
    fn settle<R>(&self, result: Result<R, TaskError>) -> Result<R, TaskError> {
        result.inspect_err(|e| {
            let message = e.to_string();
            let message = if message.is_empty() {
                self.operation.fallback_message().to_string()
            } else {
                message
            };
            tracing::debug!(operation = %self.operation, %message, "recording failure");
            self.state.send_modify(|state| state.error = Some(message));
        })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .send_modify(|state| state.loading.lower(self.operation));
        }
    }
}
