use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::calendar::{Calendar, DateBucket, WEEK_HORIZON_DAYS};
use crate::id::ListId;
use crate::model::{Priority, Task};
use crate::text_matcher::TextMatcher;

/// Due-date constraint selectable in the task filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueFilter {
    /// Open tasks whose due day passed.
    Overdue,
    /// Due today.
    Today,
    /// Due tomorrow.
    Tomorrow,
    /// Due today or within the following week horizon.
    Week,
}

impl DueFilter {
    /// Whether the task satisfies this constraint.
    #[must_use]
    pub fn matches(self, task: &Task, calendar: &Calendar) -> bool {
        match self {
            Self::Overdue => calendar.bucket(task) == DateBucket::Overdue,
            Self::Today => calendar.bucket(task) == DateBucket::Today,
            Self::Tomorrow => calendar.bucket(task) == DateBucket::Tomorrow,
            Self::Week => task.due_date.is_some_and(|due| {
                let delta = (calendar.day_of(due) - calendar.today()).whole_days();
                (0..WEEK_HORIZON_DAYS).contains(&delta)
            }),
        }
    }

    /// User-facing token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Week => "week",
        }
    }
}

impl fmt::Display for DueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a due filter token is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid due filter: {0} (expected overdue, today, tomorrow or week)")]
pub struct ParseDueFilterError(pub String);

impl FromStr for DueFilter {
    type Err = ParseDueFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overdue" => Ok(Self::Overdue),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "week" | "this-week" | "thisweek" => Ok(Self::Week),
            _ => Err(ParseDueFilterError(s.to_owned())),
        }
    }
}

/// Criteria applied to task collections. `None` fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Free-text query over title and description.
    pub text: Option<String>,
    /// Keep completed tasks when true.
    pub show_completed: bool,
    /// Exact priority match.
    pub priority: Option<Priority>,
    /// Exact list match.
    pub list: Option<ListId>,
    /// Due-date constraint.
    pub due: Option<DueFilter>,
}

impl TaskFilter {
    /// Returns true when the filter keeps every task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.show_completed
            && self.text.as_deref().is_none_or(|t| t.trim().is_empty())
            && self.priority.is_none()
            && self.list.is_none()
            && self.due.is_none()
    }

    /// Check whether a task satisfies every configured criterion.
    #[must_use]
    pub fn matches(&self, task: &Task, calendar: &Calendar) -> bool {
        let matcher = self.text.as_deref().and_then(TextMatcher::new);
        self.matches_with(matcher.as_ref(), task, calendar)
    }

    fn matches_with(&self, matcher: Option<&TextMatcher>, task: &Task, calendar: &Calendar) -> bool {
        if !self.show_completed && task.completed {
            return false;
        }
        if matcher.is_some_and(|m| !m.matches(task)) {
            return false;
        }
        if self.priority.is_some_and(|p| task.priority != p) {
            return false;
        }
        if self.list.is_some_and(|l| task.list_id != l) {
            return false;
        }
        self.due.is_none_or(|due| due.matches(task, calendar))
    }

    /// Tasks that satisfy the filter, preserving input order.
    #[must_use]
    pub fn apply(&self, tasks: &[Task], calendar: &Calendar) -> Vec<Task> {
        let matcher = self.text.as_deref().and_then(TextMatcher::new);
        tasks
            .iter()
            .filter(|task| self.matches_with(matcher.as_ref(), task, calendar))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use time::macros::{date, datetime, offset};
    use time::OffsetDateTime;

    fn task(id: u64, title: &str) -> Task {
        Task {
            id: TaskId(id),
            title: title.into(),
            description: String::new(),
            priority: Priority::Unset,
            due_date: None,
            completed: false,
            completed_at: None,
            list_id: ListId(1),
            order: 1,
            created_at: datetime!(2024-01-01 00:00 UTC),
        }
    }

    fn due(mut task: Task, at: OffsetDateTime) -> Task {
        task.due_date = Some(at);
        task
    }

    fn calendar() -> Calendar {
        Calendar::new(date!(2024 - 06 - 10), offset!(UTC))
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn default_filter_hides_completed_tasks() {
        let mut done = task(2, "done");
        done.complete(datetime!(2024-06-01 00:00 UTC));
        let tasks = vec![task(1, "open"), done];

        let filter = TaskFilter::default();
        assert!(!filter.is_empty());
        assert_eq!(ids(&filter.apply(&tasks, &calendar())), vec![1]);

        let show_all = TaskFilter {
            show_completed: true,
            ..TaskFilter::default()
        };
        assert!(show_all.is_empty());
        assert_eq!(ids(&show_all.apply(&tasks, &calendar())), vec![1, 2]);
    }

    #[test]
    fn search_matches_title_or_description() {
        let mut bob = task(2, "Call Bob");
        bob.description = "buy flowers".into();
        let tasks = vec![task(1, "Buy milk"), bob, task(3, "Gym")];

        let filter = TaskFilter {
            text: Some("buy".into()),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter.apply(&tasks, &calendar())), vec![1, 2]);
    }

    #[test]
    fn priority_and_list_filters_are_exact() {
        let mut high = task(1, "a");
        high.priority = Priority::High;
        let mut other_list = task(2, "b");
        other_list.priority = Priority::High;
        other_list.list_id = ListId(2);
        let tasks = vec![high, other_list, task(3, "c")];

        let filter = TaskFilter {
            priority: Some(Priority::High),
            list: Some(ListId(1)),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter.apply(&tasks, &calendar())), vec![1]);
    }

    #[test]
    fn due_filters_follow_buckets() {
        let cal = calendar();
        let tasks = vec![
            due(task(1, "past"), datetime!(2024-06-08 10:00 UTC)),
            due(task(2, "today"), datetime!(2024-06-10 10:00 UTC)),
            due(task(3, "tomorrow"), datetime!(2024-06-11 10:00 UTC)),
            due(task(4, "friday"), datetime!(2024-06-14 10:00 UTC)),
            due(task(5, "far"), datetime!(2024-06-30 10:00 UTC)),
            task(6, "undated"),
        ];

        let by = |due: DueFilter| {
            let filter = TaskFilter {
                due: Some(due),
                ..TaskFilter::default()
            };
            ids(&filter.apply(&tasks, &cal))
        };
        assert_eq!(by(DueFilter::Overdue), vec![1]);
        assert_eq!(by(DueFilter::Today), vec![2]);
        assert_eq!(by(DueFilter::Tomorrow), vec![3]);
        assert_eq!(by(DueFilter::Week), vec![2, 3, 4]);
    }

    #[test]
    fn due_filter_tokens_parse() {
        assert_eq!("Week".parse::<DueFilter>().ok(), Some(DueFilter::Week));
        assert_eq!("overdue".parse::<DueFilter>().ok(), Some(DueFilter::Overdue));
        assert!("someday".parse::<DueFilter>().is_err());
    }
}
