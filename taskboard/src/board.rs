//! Board view of the task collection.
//!
//! Groups tasks into pending and completed columns and renders them as plain
//! text cards for the terminal.

use std::fmt::{Display, Write as _};

use chrono::{DateTime, Local, TimeZone, Utc};
use taskboard_proto::task::Task;

/// Default chrono format for card timestamps, e.g. `March 4, 2026 at 9:05 AM`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%B %-d, %Y at %-I:%M %p";

/// Heading of the pending column.
pub const PENDING_HEADING: &str = "Pending Tasks";

/// Heading of the completed column.
pub const COMPLETED_HEADING: &str = "Completed Tasks";

/// Shown when there are no tasks at all.
pub const EMPTY_BOARD: &str = "No tasks yet. Create your first task above!";

/// Asked before deleting a task that is still pending.
pub const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this task? It is still pending.";

const DIVIDER: &str = "----------------------------------------";

/// Tasks split by status, each column in collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    /// Tasks still pending.
    pub pending: Vec<Task>,
    /// Tasks already completed.
    pub completed: Vec<Task>,
}

impl Board {
    /// Splits `tasks` into columns.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let (pending, completed): (Vec<Task>, Vec<Task>) =
            tasks.iter().cloned().partition(Task::is_pending);
        Self { pending, completed }
    }

    /// Returns `true` if both columns are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }

    /// Total number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    /// Renders the board with timestamps in local time.
    #[must_use]
    pub fn render(&self, format: &str) -> String {
        self.render_in(&Local, format)
    }

    /// Renders the board with timestamps shown in `tz`.
    ///
    /// Empty columns are omitted; a divider separates two non-empty ones.
    #[must_use]
    pub fn render_in<Tz>(&self, tz: &Tz, format: &str) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if self.is_empty() {
            return format!("{EMPTY_BOARD}\n");
        }

        let mut out = String::new();
        render_column(&mut out, PENDING_HEADING, &self.pending, tz, format);
        if !self.pending.is_empty() && !self.completed.is_empty() {
            out.push_str(DIVIDER);
            out.push_str("\n\n");
        }
        render_column(&mut out, COMPLETED_HEADING, &self.completed, tz, format);
        out
    }
}

fn render_column<Tz>(out: &mut String, heading: &str, tasks: &[Task], tz: &Tz, format: &str)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if tasks.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading} ({})\n", tasks.len());
    for task in tasks {
        out.push_str(&render_card(task, tz, format));
        out.push('\n');
    }
}

/// Renders one task card.
///
/// The first line carries the status badge and title, followed by the id,
/// the description if any, and the creation and deadline timestamps if set.
#[must_use]
pub fn render_card<Tz>(task: &Task, tz: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut card = String::new();
    let _ = writeln!(card, "[{}] {}", task.status, task.title);
    let _ = writeln!(card, "    id: {}", task.id);
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        for line in description.lines() {
            let _ = writeln!(card, "    {line}");
        }
    }
    if let Some(created_at) = task.created_at {
        let _ = writeln!(card, "    Created at: {}", stamp(created_at, tz, format));
    }
    if let Some(deadline) = task.deadline {
        let _ = writeln!(card, "    Deadline: {}", stamp(deadline, tz, format));
    }
    card
}

fn stamp<Tz>(at: DateTime<Utc>, tz: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format(format).to_string()
}

/// How a delete request must be handled for a given task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Ask [`DELETE_CONFIRMATION`] first.
    Confirm,
    /// Delete straight away.
    Immediate,
}

impl DeletePolicy {
    /// Pending tasks need confirmation; completed ones do not.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        if task.is_pending() {
            Self::Confirm
        } else {
            Self::Immediate
        }
    }
}

#[cfg(test)]
mod tests {
    use taskboard_proto::task::{TaskId, TaskStatus};

    use super::*;

    fn task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(),
            title: title.to_string(),
            description: None,
            status,
            deadline: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn splits_by_status_preserving_order() {
        let tasks = [
            task("a", TaskStatus::Pending),
            task("b", TaskStatus::Completed),
            task("c", TaskStatus::Pending),
        ];
        let board = Board::from_tasks(&tasks);
        let pending: Vec<&str> = board.pending.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(pending, ["a", "c"]);
        assert_eq!(board.completed.len(), 1);
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn empty_board_message() {
        let board = Board::from_tasks(&[]);
        assert!(board.is_empty());
        assert_eq!(
            board.render_in(&Utc, DEFAULT_TIMESTAMP_FORMAT),
            "No tasks yet. Create your first task above!\n"
        );
    }

    #[test]
    fn card_formats_timestamps() {
        let mut t = task("Dentist", TaskStatus::Pending);
        t.description = Some("Bring insurance card".into());
        t.created_at = Utc.with_ymd_and_hms(2026, 3, 4, 9, 5, 0).single();
        t.deadline = Utc.with_ymd_and_hms(2026, 3, 10, 15, 30, 0).single();

        let card = render_card(&t, &Utc, DEFAULT_TIMESTAMP_FORMAT);
        let lines: Vec<&str> = card.lines().collect();
        assert_eq!(lines[0], "[pending] Dentist");
        assert_eq!(lines[2], "    Bring insurance card");
        assert_eq!(lines[3], "    Created at: March 4, 2026 at 9:05 AM");
        assert_eq!(lines[4], "    Deadline: March 10, 2026 at 3:30 PM");
    }

    #[test]
    fn card_omits_absent_fields() {
        let card = render_card(&task("bare", TaskStatus::Completed), &Utc, "%F");
        assert_eq!(card.lines().count(), 2);
        assert!(card.starts_with("[completed] bare\n"));
    }

    #[test]
    fn divider_only_between_non_empty_columns() {
        let only_pending = Board::from_tasks(&[task("a", TaskStatus::Pending)]);
        let text = only_pending.render_in(&Utc, "%F");
        assert!(text.starts_with("Pending Tasks (1)"));
        assert!(!text.contains(DIVIDER));
        assert!(!text.contains(COMPLETED_HEADING));

        let both = Board::from_tasks(&[
            task("a", TaskStatus::Pending),
            task("b", TaskStatus::Completed),
        ]);
        let text = both.render_in(&Utc, "%F");
        assert!(text.contains(DIVIDER));
        assert!(text.find(PENDING_HEADING) < text.find(COMPLETED_HEADING));
    }

    #[test]
    fn delete_policy_follows_status() {
        assert_eq!(
            DeletePolicy::for_task(&task("p", TaskStatus::Pending)),
            DeletePolicy::Confirm
        );
        assert_eq!(
            DeletePolicy::for_task(&task("c", TaskStatus::Completed)),
            DeletePolicy::Immediate
        );
    }
}
