use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors raised when parsing user-facing names of task attributes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown priority '{0}', expected high, medium or low")]
    UnknownPriority(String),
    #[error("Unknown sort option '{0}'")]
    UnknownSortOption(String),
}

/// Most recent value handed out by [`TaskId::generate`].
static LAST_GENERATED_ID: AtomicI64 = AtomicI64::new(0);

/// Opaque identifier of a task. Assigned at creation and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a time-derived identifier (milliseconds since the Unix epoch).
    ///
    /// Identifiers are strictly increasing within a process, so tasks created
    /// within the same millisecond still receive distinct ids.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    fn generate_at(now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis();
        let (Ok(previous) | Err(previous)) = LAST_GENERATED_ID.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |last| Some(millis.max(last + 1)),
        );
        Self(millis.max(previous + 1).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Importance of a task. Declaration order is the display order, high first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParseError::UnknownPriority(s.to_string())),
        }
    }
}

/// Completion state of a task.
///
/// A completed task always carries the moment it was completed, so there is no
/// way to hold a completion time on an active task or lose it on a done one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[default]
    Active,
    Completed { at: DateTime<Utc> },
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
    pub status: Status,
}

impl Task {
    /// Creates an active task.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
        priority: Priority,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            due_date,
            created_at,
            priority,
            status: Status::Active,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, Status::Completed { .. })
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            Status::Active => None,
            Status::Completed { at } => Some(at),
        }
    }

    /// Flips the completion state, stamping `now` when the task becomes completed.
    pub fn toggle_completion(&mut self, now: DateTime<Utc>) {
        self.status = match self.status {
            Status::Active => Status::Completed { at: now },
            Status::Completed { .. } => Status::Active,
        };
    }
}
