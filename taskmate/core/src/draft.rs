//! User input for creating or editing a task.
//!
//! Drafts are where title rules are enforced; the store accepts whatever
//! fully-formed [`Task`] it is given.

use crate::task::{Priority, Task, TaskId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Maximum number of characters allowed in a task title.
pub const MAX_TITLE_LEN: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Title is {0} characters long, the limit is {MAX_TITLE_LEN}")]
    TitleTooLong(usize),
}

/// The editable fields of a task, as captured by a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: Utc::now(),
            priority: Priority::default(),
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            priority: task.priority,
        }
    }
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        let len = self.title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(DraftError::TitleTooLong(len));
        }
        Ok(())
    }

    /// Builds a new, active task from this draft.
    pub fn into_task(self, id: TaskId, created_at: DateTime<Utc>) -> Result<Task, DraftError> {
        self.validate()?;
        Ok(Task::new(
            id,
            self.title,
            self.description,
            self.due_date,
            created_at,
            self.priority,
        ))
    }

    /// Returns `task` with the draft's fields applied.
    ///
    /// Identity, creation time and completion state are carried over untouched.
    pub fn apply_to(self, task: &Task) -> Result<Task, DraftError> {
        self.validate()?;
        Ok(Task {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            ..task.clone()
        })
    }
}
