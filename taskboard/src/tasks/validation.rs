//! Input validation for task creation and update.
//!
//! Every check here is pure. A failed check yields a [`ValidationError`]
//! listing one [`FieldError`] per violated rule, so a form can show all of
//! them at once.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use taskboard_proto::task::{
    MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, NewTask, TaskId, TaskPatch, TaskStatus,
};

/// A validated task field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Task identifier.
    Id,
    /// Task title.
    Title,
    /// Task description.
    Description,
    /// Task status.
    Status,
    /// Task deadline.
    Deadline,
}

impl Field {
    /// Human-readable field label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "Task ID",
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Status => "Status",
            Self::Deadline => "Deadline",
        }
    }
}

/// The rule a field broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The field is missing or empty.
    Required,
    /// The field is longer than `max` characters.
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// The identifier is not a canonical UUID.
    InvalidIdentifier,
    /// The status names no known [`TaskStatus`].
    UnknownStatus(String),
    /// The timestamp is not RFC 3339.
    InvalidTimestamp(String),
}

/// One violated rule on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field.
    pub field: Field,
    /// The rule it broke.
    pub violation: Violation,
}

impl FieldError {
    const fn new(field: Field, violation: Violation) -> Self {
        Self { field, violation }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.field, &self.violation) {
            (Field::Id, _) | (_, Violation::InvalidIdentifier) => f.write_str("Invalid task ID"),
            (field, Violation::Required) => write!(f, "{} is required", field.label()),
            (field, Violation::TooLong { max }) => {
                write!(f, "{} must be less than {max} characters", field.label())
            }
            (_, Violation::UnknownStatus(_)) => f.write_str("Invalid status"),
            (_, Violation::InvalidTimestamp(_)) => f.write_str("Invalid deadline"),
        }
    }
}

/// Input failed one or more validation rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationError {
    /// One entry per violated rule, in field order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Returns `true` if some rule on `field` was violated.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// The user-facing message for each violation.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects field errors and turns them into a result.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn push(&mut self, field: Field, violation: Violation) {
        self.errors.push(FieldError::new(field, violation));
    }

    fn title(&mut self, title: &str) {
        if title.is_empty() {
            self.push(Field::Title, Violation::Required);
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            self.push(Field::Title, Violation::TooLong { max: MAX_TITLE_LENGTH });
        }
    }

    fn description(&mut self, description: Option<&str>) {
        if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
            self.push(
                Field::Description,
                Violation::TooLong {
                    max: MAX_DESCRIPTION_LENGTH,
                },
            );
        }
    }

    /// Parses an optional RFC 3339 deadline; an empty string means none.
    fn deadline(&mut self, deadline: Option<&str>) -> Option<DateTime<Utc>> {
        let text = deadline.filter(|d| !d.is_empty())?;
        match DateTime::parse_from_rfc3339(text) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(_) => {
                self.push(Field::Deadline, Violation::InvalidTimestamp(text.to_string()));
                None
            }
        }
    }

    fn status(&mut self, status: Option<&str>) -> Option<TaskStatus> {
        let text = status?;
        match text.parse() {
            Ok(status) => Some(status),
            Err(_) => {
                self.push(Field::Status, Violation::UnknownStatus(text.to_string()));
                None
            }
        }
    }

    fn id(&mut self, id: Option<&str>) -> Option<TaskId> {
        let parsed = id.and_then(TaskId::parse_canonical);
        if parsed.is_none() {
            self.push(Field::Id, Violation::InvalidIdentifier);
        }
        parsed
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Checks the fields of a task about to be created.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the title is empty or too long, or the
/// description is too long.
pub fn validate_new_task(task: &NewTask) -> Result<(), ValidationError> {
    let mut check = Checker::default();
    check.title(&task.title);
    check.description(task.description.as_deref());
    check.finish()
}

/// Checks the fields present in a partial update.
///
/// # Errors
///
/// Returns a [`ValidationError`] if a present title is empty or too long, or
/// a present description is too long.
pub fn validate_patch(patch: &TaskPatch) -> Result<(), ValidationError> {
    let mut check = Checker::default();
    if let Some(title) = &patch.title {
        check.title(title);
    }
    check.description(patch.description.as_deref());
    check.finish()
}

/// Parses a task identifier in canonical 8-4-4-4-12 form.
///
/// # Errors
///
/// Returns a [`ValidationError`] with [`Violation::InvalidIdentifier`].
pub fn parse_task_id(text: &str) -> Result<TaskId, ValidationError> {
    TaskId::parse_canonical(text).ok_or_else(|| ValidationError {
        errors: vec![FieldError::new(Field::Id, Violation::InvalidIdentifier)],
    })
}

/// Raw task-creation input, as a form or request body would supply it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateTaskInput {
    /// Required title.
    pub title: Option<String>,
    /// Optional description; empty means none.
    pub description: Option<String>,
    /// Optional RFC 3339 deadline; empty means none.
    pub deadline: Option<String>,
}

impl CreateTaskInput {
    /// Validates the input and produces the task to insert.
    ///
    /// # Errors
    ///
    /// Returns every violated rule at once.
    pub fn validate(&self) -> Result<NewTask, ValidationError> {
        let mut check = Checker::default();
        let title = self.title.clone().unwrap_or_default();
        check.title(&title);
        let description = self.description.clone().filter(|d| !d.is_empty());
        check.description(description.as_deref());
        let deadline = check.deadline(self.deadline.as_deref());
        check.finish()?;

        Ok(NewTask {
            title,
            description,
            status: TaskStatus::Pending,
            deadline,
        })
    }
}

/// Raw task-update input. The title is required on this path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateTaskInput {
    /// Identifier of the task to update.
    pub id: Option<String>,
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement RFC 3339 deadline; empty leaves it unchanged.
    pub deadline: Option<String>,
    /// Replacement status, `pending` or `completed`.
    pub status: Option<String>,
}

impl UpdateTaskInput {
    /// Validates the input and produces the target id and patch.
    ///
    /// # Errors
    ///
    /// Returns every violated rule at once.
    pub fn validate(&self) -> Result<(TaskId, TaskPatch), ValidationError> {
        let mut check = Checker::default();
        let id = check.id(self.id.as_deref());
        let title = self.title.clone().unwrap_or_default();
        check.title(&title);
        check.description(self.description.as_deref());
        let deadline = check.deadline(self.deadline.as_deref());
        let status = check.status(self.status.as_deref());
        check.finish()?;

        let patch = TaskPatch {
            title: Some(title),
            description: self.description.clone(),
            status,
            deadline,
        };
        match id {
            Some(id) => Ok((id, patch)),
            None => Err(ValidationError {
                errors: vec![FieldError::new(Field::Id, Violation::InvalidIdentifier)],
            }),
        }
    }
}

/// The edit form: a date/time value stands in for the deadline string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTaskForm {
    /// Replacement title.
    pub title: String,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement deadline in the user's offset.
    pub datetime: Option<DateTime<FixedOffset>>,
}

impl EditTaskForm {
    /// Starts an edit form with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            datetime: None,
        }
    }

    /// Validates the form and produces the patch to send.
    ///
    /// # Errors
    ///
    /// Returns every violated rule at once.
    pub fn validate(&self) -> Result<TaskPatch, ValidationError> {
        let mut check = Checker::default();
        check.title(&self.title);
        check.description(self.description.as_deref());
        check.finish()?;

        Ok(TaskPatch {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            status: None,
            deadline: self.datetime.map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
