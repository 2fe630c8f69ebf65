//! Command execution for the `taskboard` CLI.
//!
//! [`App`] runs one [`Command`] against a [`TaskStore`] and reports the
//! outcome through a [`Notifier`]. Everything it needs is passed in, so the
//! same flow runs against the HTTP table or an in-process one.

use taskboard_proto::task::{Task, TaskId};

use crate::board::{Board, DELETE_CONFIRMATION, DeletePolicy};
use crate::config::Command;
use crate::notify::{Notification, Notifier};
use crate::table::TaskTable;
use crate::tasks::validation::{CreateTaskInput, EditTaskForm, parse_task_id};
use crate::tasks::{Operation, TaskError, TaskStore};

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The rendered board.
    Board(String),
    /// A task was created or changed.
    Changed(Task),
    /// A task was deleted.
    Deleted(TaskId),
    /// The user declined to delete a pending task.
    Cancelled,
}

/// Runs commands against a task store.
pub struct App<T, N> {
    store: TaskStore<T>,
    notifier: N,
    timestamp_format: String,
}

impl<T: TaskTable, N: Notifier> App<T, N> {
    /// Creates an app over `store` that reports through `notifier`.
    pub fn new(store: TaskStore<T>, notifier: N, timestamp_format: impl Into<String>) -> Self {
        Self {
            store,
            notifier,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &TaskStore<T> {
        &self.store
    }

    /// The notifier.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs `command`.
    ///
    /// `confirm` is asked before a pending task is deleted and must return
    /// `true` to go ahead. Failures are also sent to the notifier.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] of the first step that failed.
    pub async fn execute(
        &self,
        command: Command,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<Report, TaskError> {
        let result = self.dispatch(command, confirm).await;
        if let Err(e) = &result {
            tracing::warn!(kind = ?e.kind(), error = %e, "command failed");
            self.notifier.notify(&Notification::error(e.to_string()));
        }
        result
    }

    async fn dispatch(
        &self,
        command: Command,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<Report, TaskError> {
        match command {
            Command::List => self.list().await,
            Command::Add {
                title,
                description,
                deadline,
            } => {
                let input = CreateTaskInput {
                    title: Some(title),
                    description,
                    deadline,
                };
                let task = input.validate()?;
                let created = self.store.add_task(&task).await?;
                self.notifier.notify(&Notification::task_created());
                Ok(Report::Changed(created))
            }
            Command::Edit {
                id,
                title,
                description,
                datetime,
            } => {
                let id = parse_task_id(&id)?;
                self.store.fetch_tasks().await?;
                let current = self
                    .store
                    .find(&id)
                    .ok_or(TaskError::EmptyResult(Operation::Update))?;
                let form = EditTaskForm {
                    title: title.unwrap_or(current.title),
                    description: description.or(current.description),
                    datetime: datetime.or_else(|| current.deadline.map(|d| d.fixed_offset())),
                };
                let patch = form.validate()?;
                let updated = self.store.update_task(&id, &patch).await?;
                self.notifier.notify(&Notification::task_updated());
                self.store.fetch_tasks().await?;
                Ok(Report::Changed(updated))
            }
            Command::Complete { id } => {
                let id = parse_task_id(&id)?;
                let completed = self.store.complete_task(&id).await?;
                self.notifier.notify(&Notification::task_completed());
                Ok(Report::Changed(completed))
            }
            Command::Delete { id, yes } => {
                let id = parse_task_id(&id)?;
                if !yes {
                    self.store.fetch_tasks().await?;
                    let policy = self
                        .store
                        .find(&id)
                        .map_or(DeletePolicy::Confirm, |task| DeletePolicy::for_task(&task));
                    if policy == DeletePolicy::Confirm && !confirm(DELETE_CONFIRMATION) {
                        tracing::info!(id = %id, "delete cancelled");
                        return Ok(Report::Cancelled);
                    }
                }
                self.store.delete_task(&id).await?;
                self.notifier.notify(&Notification::task_deleted());
                self.store.fetch_tasks().await?;
                Ok(Report::Deleted(id))
            }
        }
    }

    async fn list(&self) -> Result<Report, TaskError> {
        let tasks = self.store.fetch_tasks().await?;
        let board = Board::from_tasks(&tasks);
        Ok(Report::Board(board.render(&self.timestamp_format)))
    }
}
