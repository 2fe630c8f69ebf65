//! User-facing feedback after each action.
//!
//! A [`Notification`] is a title, a description and a [`Variant`]; a
//! [`Notifier`] delivers it. The CLI writes notifications to stderr so the
//! board on stdout stays clean.

use std::io::{self, Write};

use parking_lot::Mutex;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    /// Ordinary confirmation.
    #[default]
    Default,
    /// Failure.
    Destructive,
}

/// One piece of feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short headline.
    pub title: String,
    /// Longer explanation.
    pub description: String,
    /// How prominently to show it.
    pub variant: Variant,
}

impl Notification {
    /// Creates a default-variant notification.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    /// Switches to the destructive variant.
    #[must_use]
    pub const fn destructive(mut self) -> Self {
        self.variant = Variant::Destructive;
        self
    }

    /// Shown after a task is created.
    #[must_use]
    pub fn task_created() -> Self {
        Self::new("Task created", "Your task has been successfully created.")
    }

    /// Shown after a task is edited.
    #[must_use]
    pub fn task_updated() -> Self {
        Self::new("Task updated", "Your task has been successfully updated.")
    }

    /// Shown after a task is completed.
    #[must_use]
    pub fn task_completed() -> Self {
        Self::new("Task completed", "Your task has been marked as completed.")
    }

    /// Shown after a task is deleted.
    #[must_use]
    pub fn task_deleted() -> Self {
        Self::new("Task deleted", "Your task has been deleted.")
    }

    /// Shown when an action fails.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message).destructive()
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variant {
            Variant::Default => write!(f, "{}: {}", self.title, self.description),
            Variant::Destructive => write!(f, "! {}: {}", self.title, self.description),
        }
    }
}

/// Delivers notifications.
pub trait Notifier: Send + Sync {
    /// Shows `notification` to the user.
    fn notify(&self, notification: &Notification);
}

/// Writes one line per notification to an [`io::Write`] sink.
pub struct WriterNotifier<W> {
    out: Mutex<W>,
}

/// Notifier that writes to stderr.
pub type ConsoleNotifier = WriterNotifier<io::Stderr>;

impl ConsoleNotifier {
    /// Creates a notifier writing to stderr.
    #[must_use]
    pub fn console() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> WriterNotifier<W> {
    /// Wraps `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the wrapped sink.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Notifier for WriterNotifier<W> {
    fn notify(&self, notification: &Notification) {
        tracing::debug!(
            title = %notification.title,
            variant = ?notification.variant,
            "notification"
        );
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{notification}") {
            tracing::warn!(error = %e, "failed to write notification");
        }
    }
}
