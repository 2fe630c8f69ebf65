//! Wire contract of the hosted `tasks` table.
//!
//! Every table call answers with a [`StoreResponse`]: a `{ data, error }`
//! pair where at most one side is set. A response with neither side set is a
//! success that returned no row. Row ordering is expressed PostgREST style
//! (`status.desc,created_at.desc`) and applied with [`sort_rows`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Name of the single table this system reads and writes.
pub const TABLE_NAME: &str = "tasks";

/// Ordering used when listing tasks: pending before completed, newest first.
pub const LIST_ORDER: [Order; 2] = [Order::desc(Column::Status), Order::desc(Column::CreatedAt)];

/// A failure reported by the data store inside a [`StoreResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreError {
    /// Human-readable failure text.
    pub message: String,
    /// Optional machine-readable code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl StoreError {
    /// Creates an error with a message and no code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// The `{ data, error }` envelope returned by every table call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    /// Returned row(s), if any.
    pub data: Option<T>,
    /// Reported failure, if any.
    pub error: Option<StoreError>,
}

impl<T> StoreResponse<T> {
    /// A successful response carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// A successful response with no data.
    pub const fn empty() -> Self {
        Self {
            data: None,
            error: None,
        }
    }

    /// A failed response.
    pub const fn failed(error: StoreError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }
}

/// Sortable columns of the `tasks` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// `id`
    Id,
    /// `title`
    Title,
    /// `status`
    Status,
    /// `deadline`
    Deadline,
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
}

impl Column {
    const ALL: [Self; 6] = [
        Self::Id,
        Self::Title,
        Self::Status,
        Self::Deadline,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    /// Column name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Status => "status",
            Self::Deadline => "deadline",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Id => a.id.as_uuid().cmp(b.id.as_uuid()),
            Self::Title => a.title.cmp(&b.title),
            // Text comparison, as the store compares the column.
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::Deadline => a.deadline.cmp(&b.deadline),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    /// Column to sort by.
    pub column: Column,
    /// `true` for ascending, `false` for descending.
    pub ascending: bool,
}

impl Order {
    /// Ascending order on `column`.
    #[must_use]
    pub const fn asc(column: Column) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    /// Descending order on `column`.
    #[must_use]
    pub const fn desc(column: Column) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let direction = if self.ascending { "asc" } else { "desc" };
        write!(f, "{}.{direction}", self.column.as_str())
    }
}

/// Errors from [`parse_order`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderParseError {
    /// The column is not part of the `tasks` table.
    #[error("unknown order column: {0}")]
    UnknownColumn(String),
    /// The direction is neither `asc` nor `desc`.
    #[error("unknown order direction: {0}")]
    UnknownDirection(String),
}

/// Formats sort keys as a comma-separated `column.direction` list.
#[must_use]
pub fn format_order(order: &[Order]) -> String {
    order
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a `column.direction` list. A missing direction means ascending.
///
/// # Errors
///
/// Returns [`OrderParseError`] on an unknown column or direction.
pub fn parse_order(text: &str) -> Result<Vec<Order>, OrderParseError> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (name, direction) = part.split_once('.').unwrap_or((part, "asc"));
            let column = Column::ALL
                .into_iter()
                .find(|c| c.as_str() == name)
                .ok_or_else(|| OrderParseError::UnknownColumn(name.to_string()))?;
            let ascending = match direction {
                "asc" => true,
                "desc" => false,
                other => return Err(OrderParseError::UnknownDirection(other.to_string())),
            };
            Ok(Order { column, ascending })
        })
        .collect()
}

/// Sorts rows by the given keys, earlier keys taking precedence.
///
/// The sort is stable. Absent timestamps compare as smaller than present ones.
pub fn sort_rows(rows: &mut [Task], order: &[Order]) {
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|key| {
                let ord = key.column.compare(a, b);
                if key.ascending { ord } else { ord.reverse() }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}
