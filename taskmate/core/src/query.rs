//! Search, filter and sort of a task list for display.
//!
//! Everything here is a pure function of its inputs: calling it twice with the
//! same tasks and parameters yields the same ordering.

use crate::task::{ParseError, Priority, Task};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Visibility of active and completed tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFilters {
    pub active: bool,
    pub completed: bool,
}

impl Default for StatusFilters {
    fn default() -> Self {
        Self {
            active: true,
            completed: true,
        }
    }
}

impl StatusFilters {
    pub fn allows(&self, task: &Task) -> bool {
        if task.is_completed() {
            self.completed
        } else {
            self.active
        }
    }
}

/// Visibility of each priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFilters {
    pub high: bool,
    pub medium: bool,
    pub low: bool,
}

impl Default for PriorityFilters {
    fn default() -> Self {
        Self {
            high: true,
            medium: true,
            low: true,
        }
    }
}

impl PriorityFilters {
    /// Filters that let through only the given priorities.
    pub fn only(priorities: &[Priority]) -> Self {
        Self {
            high: priorities.contains(&Priority::High),
            medium: priorities.contains(&Priority::Medium),
            low: priorities.contains(&Priority::Low),
        }
    }

    pub fn allows(&self, priority: Priority) -> bool {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

/// Ordering applied within the active and the completed group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    /// Earliest due date first.
    #[default]
    Deadline,
    /// High, then medium, then low.
    Priority,
    /// Newest first.
    DateCreated,
    /// By title, ignoring case except to break ties.
    Alphabetical,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Deadline,
        SortOption::Priority,
        SortOption::DateCreated,
        SortOption::Alphabetical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::Deadline => "Deadline",
            SortOption::Priority => "Priority",
            SortOption::DateCreated => "Date Created",
            SortOption::Alphabetical => "Alphabetical",
        }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortOption::Deadline => a.due_date.cmp(&b.due_date),
            SortOption::Priority => a.priority.cmp(&b.priority),
            SortOption::DateCreated => b.created_at.cmp(&a.created_at),
            SortOption::Alphabetical => compare_titles(&a.title, &b.title),
        }
    }
}

impl Display for SortOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for SortOption {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortOption::ALL
            .into_iter()
            .find(|option| option.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseError::UnknownSortOption(s.to_string()))
    }
}

/// Lower case sorts before upper case when titles differ only in case.
///
/// Letters compare by code point after lowercasing, with no locale collation,
/// so accented letters sort after the whole ASCII alphabet.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Case-insensitive substring match over title and description.
pub fn matches_search(task: &Task, search_query: &str) -> bool {
    if search_query.is_empty() {
        return true;
    }
    let needle = search_query.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task.description.to_lowercase().contains(&needle)
}

/// Produces the ordered list of tasks to display.
///
/// Tasks are filtered by search, status and priority, in that order, and then
/// stably sorted with active tasks ahead of completed ones and `sort_option`
/// deciding the order within each group.
pub fn filter_and_sort<'a>(
    tasks: &'a [Task],
    search_query: &str,
    status_filters: StatusFilters,
    priority_filters: PriorityFilters,
    sort_option: SortOption,
) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| matches_search(task, search_query))
        .filter(|task| status_filters.allows(task))
        .filter(|task| priority_filters.allows(task.priority))
        .collect();

    visible.sort_by(|a, b| {
        a.is_completed()
            .cmp(&b.is_completed())
            .then_with(|| sort_option.compare(a, b))
    });
    visible
}

/// The full set of list parameters chosen by the user.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub search: String,
    pub status: StatusFilters,
    pub priority: PriorityFilters,
    pub sort: SortOption,
}

impl TaskQuery {
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        filter_and_sort(tasks, &self.search, self.status, self.priority, self.sort)
    }
}

/// Why a rendered list came out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyList {
    /// There are no tasks at all.
    NoTasks,
    /// Tasks exist but the search or filters hide all of them.
    NoMatches,
}

impl EmptyList {
    /// Classifies an empty result; `None` when something is visible.
    pub fn classify(total: usize, visible: usize) -> Option<Self> {
        match (total, visible) {
            (_, v) if v > 0 => None,
            (0, _) => Some(EmptyList::NoTasks),
            _ => Some(EmptyList::NoMatches),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EmptyList::NoTasks => "No tasks yet",
            EmptyList::NoMatches => "No tasks found",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            EmptyList::NoTasks => "Add a task to get started",
            EmptyList::NoMatches => "Try adjusting your search or filters",
        }
    }
}
