//! Core domain model and list query logic for Taskmate.
pub mod draft;
pub mod query;
pub mod task;

pub use draft::{DraftError, MAX_TITLE_LEN, TaskDraft};
pub use query::{
    EmptyList, PriorityFilters, SortOption, StatusFilters, TaskQuery, filter_and_sort,
    matches_search,
};
pub use task::{ParseError, Priority, Status, Task, TaskId};
