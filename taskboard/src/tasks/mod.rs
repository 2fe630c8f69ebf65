//! Task operations for `Taskboard`.
//!
//! Three layers, leaves first: [`validation`] checks input, [`ops`] performs
//! one table round trip per operation and normalizes failures into
//! [`TaskError`], and [`store`] keeps the client-side collection, loading
//! flags and last error around those operations.

pub mod ops;
pub mod store;
pub mod validation;

pub use ops::TaskOps;
pub use store::{LoadingFlags, StoreState, TaskStore};
pub use validation::{FieldError, ValidationError};

use thiserror::Error;

/// The five remote operations on the `tasks` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Insert a task.
    Create,
    /// Select every task.
    List,
    /// Update fields of a task.
    Update,
    /// Delete a task.
    Delete,
    /// Mark a task completed.
    Complete,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::List,
        Self::Update,
        Self::Delete,
        Self::Complete,
    ];

    /// Message used when the data layer has nothing better to say.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Failed to create task",
            Self::List => "Failed to fetch tasks",
            Self::Update => "Failed to update task",
            Self::Delete => "Failed to delete task",
            Self::Complete => "Failed to complete task",
        }
    }

    /// Message the state container records for an error with no text.
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::Create => "Failed to add task",
            other => other.failure_message(),
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Stable discriminant of a [`TaskError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input failed a validation rule.
    Validation,
    /// The store reported a failure; its message is passed through.
    Remote,
    /// The store could not be reached.
    Network,
    /// The store did not answer in time.
    Timeout,
    /// The store succeeded but returned no row where one was expected.
    EmptyResult,
    /// Anything else.
    Unexpected,
}

/// Errors surfaced by task operations.
///
/// The `Display` text of every variant is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Input failed validation; no remote call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store reported a failure.
    #[error("{0}")]
    Remote(String),

    /// The store could not be reached.
    #[error("Network error. Please check your connection and try again.")]
    Network,

    /// The store did not answer in time.
    #[error("Request timed out. Please try again.")]
    Timeout,

    /// The store returned no row for the given operation.
    #[error("{}", .0.failure_message())]
    EmptyResult(Operation),

    /// An unclassified failure.
    #[error("{0}")]
    Unexpected(String),
}

impl TaskError {
    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Network => ErrorKind::Network,
            Self::Timeout => ErrorKind::Timeout,
            Self::EmptyResult(_) => ErrorKind::EmptyResult,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}
