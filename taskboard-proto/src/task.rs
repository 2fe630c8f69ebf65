//! Task model shared by the client and the hosted task table.
//!
//! A [`Task`] is the single persisted entity. The data store assigns its
//! [`TaskId`] and timestamps; callers create tasks from a [`NewTask`] and
//! mutate them with a [`TaskPatch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed task description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Length of the canonical hyphenated UUID text form (8-4-4-4-12).
const CANONICAL_UUID_LENGTH: usize = 36;

/// Unique identifier for a task, assigned by the data store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    ///
    /// Only the data store mints identifiers; clients never set one on create.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses the canonical 8-4-4-4-12 hex form, ignoring case.
    ///
    /// Braced, URN and un-hyphenated forms are rejected even though they
    /// denote valid UUIDs.
    #[must_use]
    pub fn parse_canonical(text: &str) -> Option<Self> {
        if text.len() != CANONICAL_UUID_LENGTH {
            return None;
        }
        Uuid::parse_str(text).ok().map(Self)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is open. Every task starts here.
    #[default]
    Pending,
    /// Task has been marked done.
    Completed,
}

impl TaskStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 2] = [Self::Pending, Self::Completed];

    /// Returns the wire text for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string names no known [`TaskStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A task row as stored in the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier. Immutable once assigned.
    pub id: TaskId,
    /// Non-empty title, at most [`MAX_TITLE_LENGTH`] characters.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Current status; rows without one read as pending.
    #[serde(default)]
    pub status: TaskStatus,
    /// Optional due date.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Set by the store on insert.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the store on every write.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Returns `true` if the task carries a non-empty description.
    #[must_use]
    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Returns `true` if the task has a deadline.
    #[must_use]
    pub const fn has_deadline(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` if the task is still pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Returns `true` if the task has been completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Applies the fields present in `patch`, leaving the others untouched.
    ///
    /// Used by table implementations; `updated_at` is the caller's concern.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
    }
}

/// The fields a caller supplies when creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status, pending unless stated.
    #[serde(default)]
    pub status: TaskStatus,
    /// Optional due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Creates a pending task with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            deadline: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// A partial update. Absent fields are left unchanged by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement status. Any transition is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Replacement deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// The status-only patch that marks a task completed.
    #[must_use]
    pub const fn complete() -> Self {
        Self {
            title: None,
            description: None,
            status: Some(TaskStatus::Completed),
            deadline: None,
        }
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.deadline.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task() -> Task {
        Task {
            id: TaskId::new(),
            title: "Water the plants".to_string(),
            description: None,
            status: TaskStatus::Pending,
            deadline: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn task_id_display_is_canonical() {
        let id = TaskId::new();
        let display = id.to_string();
        assert_eq!(display.len(), 36);
        assert_eq!(TaskId::parse_canonical(&display), Some(id));
    }

    #[test]
    fn parse_canonical_accepts_uppercase() {
        let parsed = TaskId::parse_canonical("123E4567-E89B-12D3-A456-426614174000");
        assert!(parsed.is_some());
    }

    #[test]
    fn parse_canonical_rejects_other_uuid_forms() {
        assert!(TaskId::parse_canonical("123e4567e89b12d3a456426614174000").is_none());
        assert!(TaskId::parse_canonical("{123e4567-e89b-12d3-a456-426614174000}").is_none());
        assert!(
            TaskId::parse_canonical("urn:uuid:123e4567-e89b-12d3-a456-426614174000").is_none()
        );
        assert!(TaskId::parse_canonical("invalid-uuid").is_none());
        assert!(TaskId::parse_canonical("").is_none());
    }

    #[test]
    fn status_text_forms() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!("completed".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert_eq!(
            "Completed".parse::<TaskStatus>(),
            Err(UnknownStatus("Completed".to_string()))
        );
    }

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(NewTask::new("x").status, TaskStatus::Pending);
    }

    #[test]
    fn row_without_status_reads_as_pending() {
        let json = r#"{"id":"123e4567-e89b-12d3-a456-426614174000","title":"Task 1"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.is_pending());
        assert!(!task.has_description());
        assert!(!task.has_deadline());
    }

    #[test]
    fn empty_description_is_not_present() {
        let mut task = make_task();
        task.description = Some(String::new());
        assert!(!task.has_description());
        task.description = Some("details".to_string());
        assert!(task.has_description());
    }

    #[test]
    fn apply_patch_touches_only_present_fields() {
        let mut task = make_task();
        task.description = Some("keep me".to_string());
        task.apply(&TaskPatch {
            title: Some("Renamed".to_string()),
            ..TaskPatch::default()
        });
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.description.as_deref(), Some("keep me"));
        assert!(task.is_pending());
    }

    #[test]
    fn apply_allows_reopening() {
        let mut task = make_task();
        task.apply(&TaskPatch::complete());
        assert!(task.is_completed());
        task.apply(&TaskPatch {
            status: Some(TaskStatus::Pending),
            ..TaskPatch::default()
        });
        assert!(task.is_pending());
    }

    #[test]
    fn patch_omits_absent_fields_on_the_wire() {
        let json = serde_json::to_string(&TaskPatch::complete()).unwrap();
        assert_eq!(json, r#"{"status":"completed"}"#);
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::complete().is_empty());
    }
}
