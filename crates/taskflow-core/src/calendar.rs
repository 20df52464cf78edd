//! Day arithmetic relative to "today" and the due-date buckets built on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::model::Task;

const SHORT_DATE: &[BorrowedFormatItem<'static>] = format_description!("[month repr:short] [day padding:none]");

/// Number of days, counted from today, covered by the "this week" horizon.
pub const WEEK_HORIZON_DAYS: i64 = 7;

/// Mutually exclusive due-date groups used by the upcoming view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateBucket {
    /// Due before today and still open.
    Overdue,
    /// Due today.
    Today,
    /// Due tomorrow.
    Tomorrow,
    /// Due after tomorrow but within the week horizon.
    ThisWeek,
    /// No due date, due beyond the horizon, or completed in the past.
    Later,
}

impl DateBucket {
    /// Every bucket in display order.
    pub const ALL: [Self; 5] = [
        Self::Overdue,
        Self::Today,
        Self::Tomorrow,
        Self::ThisWeek,
        Self::Later,
    ];

    /// Stable key used in serialized views.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "thisWeek",
            Self::Later => "later",
        }
    }

    /// Heading shown above the bucket.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::ThisWeek => "This Week",
            Self::Later => "Later",
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse due-date status used to tint due badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    /// No due date.
    None,
    /// Due day already passed (regardless of completion).
    Overdue,
    /// Due today.
    Today,
    /// Due tomorrow.
    Tomorrow,
    /// Due later than tomorrow.
    Upcoming,
}

/// Reference point for day-based comparisons: today's date in a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    today: Date,
    offset: UtcOffset,
}

impl Calendar {
    /// Calendar whose "today" is the start of the day containing `now`, in `now`'s offset.
    #[must_use]
    pub const fn at(now: OffsetDateTime) -> Self {
        Self {
            today: now.date(),
            offset: now.offset(),
        }
    }

    /// Calendar for an explicit date and offset.
    #[must_use]
    pub const fn new(today: Date, offset: UtcOffset) -> Self {
        Self { today, offset }
    }

    /// Today's date.
    #[must_use]
    pub const fn today(&self) -> Date {
        self.today
    }

    /// Offset used to resolve timestamps into days.
    #[must_use]
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Start-of-day date for a timestamp, in the calendar's offset.
    #[must_use]
    pub const fn day_of(&self, ts: OffsetDateTime) -> Date {
        ts.to_offset(self.offset).date()
    }

    fn days_from_today(&self, day: Date) -> i64 {
        (day - self.today).whole_days()
    }

    /// Whether `ts` falls on today's date.
    #[must_use]
    pub fn is_today(&self, ts: OffsetDateTime) -> bool {
        self.day_of(ts) == self.today
    }

    /// Whether `ts` falls on a day strictly before today.
    #[must_use]
    pub fn is_past_day(&self, ts: OffsetDateTime) -> bool {
        self.day_of(ts) < self.today
    }

    /// Whether the task is open and its due day already passed.
    #[must_use]
    pub fn is_overdue(&self, task: &Task) -> bool {
        !task.completed && task.due_date.is_some_and(|due| self.is_past_day(due))
    }

    /// Classify a task into exactly one [`DateBucket`].
    #[must_use]
    pub fn bucket(&self, task: &Task) -> DateBucket {
        let Some(due) = task.due_date else {
            return DateBucket::Later;
        };
        match self.days_from_today(self.day_of(due)) {
            delta if delta < 0 => {
                if task.completed {
                    DateBucket::Later
                } else {
                    DateBucket::Overdue
                }
            }
            0 => DateBucket::Today,
            1 => DateBucket::Tomorrow,
            delta if delta < WEEK_HORIZON_DAYS => DateBucket::ThisWeek,
            _ => DateBucket::Later,
        }
    }

    /// Status of a bare due date.
    #[must_use]
    pub fn due_status(&self, due: Option<OffsetDateTime>) -> DueStatus {
        let Some(due) = due else {
            return DueStatus::None;
        };
        match self.days_from_today(self.day_of(due)) {
            delta if delta < 0 => DueStatus::Overdue,
            0 => DueStatus::Today,
            1 => DueStatus::Tomorrow,
            _ => DueStatus::Upcoming,
        }
    }

    /// Short human label: "Today", "Tomorrow", a weekday inside the week horizon, else "Jun 9".
    #[must_use]
    pub fn due_label(&self, due: Option<OffsetDateTime>) -> String {
        let Some(due) = due else {
            return String::new();
        };
        let day = self.day_of(due);
        match self.days_from_today(day) {
            0 => "Today".into(),
            1 => "Tomorrow".into(),
            delta if (2..WEEK_HORIZON_DAYS).contains(&delta) => day.weekday().to_string(),
            _ => day.format(SHORT_DATE).unwrap_or_else(|_| day.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ListId, TaskId};
    use crate::model::Priority;
    use time::macros::{date, datetime, offset};

    fn task_due(due: Option<OffsetDateTime>, completed: bool) -> Task {
        Task {
            id: TaskId(1),
            title: "task".into(),
            description: String::new(),
            priority: Priority::Unset,
            due_date: due,
            completed,
            completed_at: completed.then(|| datetime!(2024-06-01 00:00 UTC)),
            list_id: ListId(1),
            order: 1,
            created_at: datetime!(2024-06-01 00:00 UTC),
        }
    }

    fn june_tenth() -> Calendar {
        Calendar::new(date!(2024 - 06 - 10), offset!(UTC))
    }

    #[test]
    fn past_open_task_is_overdue_but_completed_one_is_later() {
        let cal = june_tenth();
        let open = task_due(Some(datetime!(2024-06-09 18:00 UTC)), false);
        let done = task_due(Some(datetime!(2024-06-09 18:00 UTC)), true);
        assert_eq!(cal.bucket(&open), DateBucket::Overdue);
        assert!(cal.is_overdue(&open));
        assert_eq!(cal.bucket(&done), DateBucket::Later);
        assert!(!cal.is_overdue(&done));
    }

    #[test]
    fn buckets_follow_day_boundaries() {
        let cal = june_tenth();
        let cases = [
            (datetime!(2024-06-10 00:00 UTC), DateBucket::Today),
            (datetime!(2024-06-10 23:59 UTC), DateBucket::Today),
            (datetime!(2024-06-11 00:00 UTC), DateBucket::Tomorrow),
            (datetime!(2024-06-12 08:00 UTC), DateBucket::ThisWeek),
            (datetime!(2024-06-16 23:00 UTC), DateBucket::ThisWeek),
            (datetime!(2024-06-17 00:00 UTC), DateBucket::Later),
        ];
        for (due, expected) in cases {
            assert_eq!(cal.bucket(&task_due(Some(due), false)), expected, "due {due}");
        }
        assert_eq!(cal.bucket(&task_due(None, false)), DateBucket::Later);
    }

    #[test]
    fn due_day_is_resolved_in_calendar_offset() {
        let cal = Calendar::new(date!(2024 - 06 - 10), offset!(+9));
        // 2024-06-09T20:00Z is already the 10th in UTC+9.
        let task = task_due(Some(datetime!(2024-06-09 20:00 UTC)), false);
        assert_eq!(cal.bucket(&task), DateBucket::Today);
    }

    #[test]
    fn calendar_at_uses_now_offset() {
        let cal = Calendar::at(datetime!(2024-06-10 01:30 +9));
        assert_eq!(cal.today(), date!(2024 - 06 - 10));
        assert_eq!(cal.offset(), offset!(+9));
    }

    #[test]
    fn due_status_ignores_completion() {
        let cal = june_tenth();
        assert_eq!(cal.due_status(None), DueStatus::None);
        assert_eq!(cal.due_status(Some(datetime!(2024-06-01 00:00 UTC))), DueStatus::Overdue);
        assert_eq!(cal.due_status(Some(datetime!(2024-06-10 10:00 UTC))), DueStatus::Today);
        assert_eq!(cal.due_status(Some(datetime!(2024-06-11 10:00 UTC))), DueStatus::Tomorrow);
        assert_eq!(cal.due_status(Some(datetime!(2024-07-01 10:00 UTC))), DueStatus::Upcoming);
    }

    #[test]
    fn due_label_formats_relative_days() {
        let cal = june_tenth();
        assert_eq!(cal.due_label(None), "");
        assert_eq!(cal.due_label(Some(datetime!(2024-06-10 10:00 UTC))), "Today");
        assert_eq!(cal.due_label(Some(datetime!(2024-06-11 10:00 UTC))), "Tomorrow");
        assert_eq!(cal.due_label(Some(datetime!(2024-06-13 10:00 UTC))), "Thursday");
        assert_eq!(cal.due_label(Some(datetime!(2024-07-04 10:00 UTC))), "Jul 4");
        assert_eq!(cal.due_label(Some(datetime!(2024-06-03 10:00 UTC))), "Jun 3");
    }

    #[test]
    fn bucket_keys_match_view_names() {
        let keys: Vec<&str> = DateBucket::ALL.iter().map(|b| b.as_str()).collect();
        assert_eq!(keys, ["overdue", "today", "tomorrow", "thisWeek", "later"]);
    }
}
