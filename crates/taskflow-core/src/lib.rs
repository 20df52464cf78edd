//! Domain records and pure view logic for taskflow.
//!
//! Everything in this crate is synchronous and free of I/O: the storage
//! adapter and services live in `taskflow-store` and `taskflow-app`.

/// Day arithmetic and due-date buckets.
pub mod calendar;
/// Task filter criteria.
pub mod filter;
/// Identifier types.
pub mod id;
/// Persisted records.
pub mod model;
/// Free-text search.
pub mod text_matcher;
pub mod view;

pub use calendar::{Calendar, DateBucket, DueStatus};
pub use filter::{DueFilter, ParseDueFilterError, TaskFilter};
pub use id::{ListId, TaskId};
pub use model::{
    DEFAULT_LIST_COLOR, List, ParsePriorityError, Priority, Settings, Task, UNKNOWN_LIST_NAME,
    default_lists,
};
pub use text_matcher::TextMatcher;
pub use view::{
    Progress, TaskCounts, TaskGroups, group_by_date, list_name, sort_for_list, today_tasks,
};
