//! Read-only views derived from task and list collections.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::calendar::{Calendar, DateBucket};
use crate::id::ListId;
use crate::model::{List, Task, UNKNOWN_LIST_NAME};

/// Tasks partitioned into the five due-date buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroups {
    /// Open tasks due before today.
    pub overdue: Vec<Task>,
    /// Tasks due today.
    pub today: Vec<Task>,
    /// Tasks due tomorrow.
    pub tomorrow: Vec<Task>,
    /// Tasks due later this week.
    pub this_week: Vec<Task>,
    /// Everything else.
    pub later: Vec<Task>,
}

impl TaskGroups {
    /// Tasks in the given bucket.
    #[must_use]
    pub fn get(&self, bucket: DateBucket) -> &[Task] {
        match bucket {
            DateBucket::Overdue => &self.overdue,
            DateBucket::Today => &self.today,
            DateBucket::Tomorrow => &self.tomorrow,
            DateBucket::ThisWeek => &self.this_week,
            DateBucket::Later => &self.later,
        }
    }

    const fn get_mut(&mut self, bucket: DateBucket) -> &mut Vec<Task> {
        match bucket {
            DateBucket::Overdue => &mut self.overdue,
            DateBucket::Today => &mut self.today,
            DateBucket::Tomorrow => &mut self.tomorrow,
            DateBucket::ThisWeek => &mut self.this_week,
            DateBucket::Later => &mut self.later,
        }
    }

    /// Buckets in display order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (DateBucket, &[Task])> + '_ {
        DateBucket::ALL.into_iter().map(|bucket| (bucket, self.get(bucket)))
    }

    /// Total number of grouped tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().map(|(_, tasks)| tasks.len()).sum()
    }

    /// Returns true when every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition tasks by due-date bucket, keeping their relative order.
#[must_use]
pub fn group_by_date<I>(tasks: I, calendar: &Calendar) -> TaskGroups
where
    I: IntoIterator<Item = Task>,
{
    let mut groups = TaskGroups::default();
    for task in tasks {
        groups.get_mut(calendar.bucket(&task)).push(task);
    }
    groups
}

fn compare_for_list(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Order for the per-list view: open first, higher priority first, newest first.
pub fn sort_for_list(tasks: &mut [Task]) {
    tasks.sort_by(compare_for_list);
}

/// Working set for the "Today" view: due today, or open and past due.
///
/// Overdue tasks come first, then higher priority.
#[must_use]
pub fn today_tasks<I>(tasks: I, calendar: &Calendar) -> Vec<Task>
where
    I: IntoIterator<Item = Task>,
{
    let mut selected: Vec<Task> = tasks
        .into_iter()
        .filter(|task| {
            task.due_date
                .is_some_and(|due| calendar.is_today(due) || (calendar.is_past_day(due) && !task.completed))
        })
        .collect();
    selected.sort_by_key(|task| (Reverse(calendar.is_overdue(task)), Reverse(task.priority.rank())));
    selected
}

/// Display name of a task's list, or `"Unknown"` when the list is gone.
#[must_use]
pub fn list_name(lists: &[List], list_id: ListId) -> &str {
    lists
        .iter()
        .find(|list| list.id == list_id)
        .map_or(UNKNOWN_LIST_NAME, |list| list.name.as_str())
}

/// Badge counts of open tasks shown next to navigation entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    /// Every open task.
    pub all: usize,
    /// Open tasks due today.
    pub today: usize,
    /// Open tasks due after `now`.
    pub upcoming: usize,
    /// Open tasks per known list.
    pub per_list: BTreeMap<ListId, usize>,
}

impl TaskCounts {
    /// Count open tasks relative to `now`.
    #[must_use]
    pub fn compute(tasks: &[Task], lists: &[List], now: OffsetDateTime) -> Self {
        let calendar = Calendar::at(now);
        let open: Vec<&Task> = tasks.iter().filter(|task| !task.completed).collect();

        let today = open
            .iter()
            .filter(|task| task.due_date.is_some_and(|due| calendar.is_today(due)))
            .count();
        let upcoming = open
            .iter()
            .filter(|task| task.due_date.is_some_and(|due| due > now))
            .count();
        let per_list = lists
            .iter()
            .map(|list| {
                let count = open.iter().filter(|task| task.list_id == list.id).count();
                (list.id, count)
            })
            .collect();

        Self {
            all: open.len(),
            today,
            upcoming,
            per_list,
        }
    }

    /// Open-task count for a list (`0` for unknown lists).
    #[must_use]
    pub fn for_list(&self, list: ListId) -> usize {
        self.per_list.get(&list).copied().unwrap_or(0)
    }
}

/// Completion progress over a set of tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Number of tasks considered.
    pub total: usize,
    /// Number of those that are completed.
    pub completed: usize,
}

impl Progress {
    /// Tally completion over `tasks`.
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks.iter().filter(|task| task.completed).count(),
        }
    }

    /// Rounded completion percentage (`0` when there are no tasks).
    #[must_use]
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let scaled = (self.completed * 200 + self.total) / (self.total * 2);
        u8::try_from(scaled.min(100)).unwrap_or(100)
    }
}
