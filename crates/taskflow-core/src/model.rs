use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use time::OffsetDateTime;

use crate::id::{ListId, TaskId};

/// Color assigned to lists created without an explicit color.
pub const DEFAULT_LIST_COLOR: &str = "#6366f1";

/// Display name used when a task references a list that no longer exists.
pub const UNKNOWN_LIST_NAME: &str = "Unknown";

/// Named, colored, ordered container for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// Identifier, immutable after creation.
    #[serde(rename = "Id", alias = "id")]
    pub id: ListId,
    /// Display name.
    pub name: String,
    /// Display color token.
    #[serde(default = "default_color")]
    pub color: String,
    /// 1-based display position.
    pub order: u32,
    /// Creation time, immutable.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn default_color() -> String {
    DEFAULT_LIST_COLOR.to_owned()
}

/// Single unit of work belonging to a list by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, immutable after creation.
    #[serde(rename = "Id", alias = "id")]
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Free-form description (empty when unset).
    #[serde(default)]
    pub description: String,
    /// Priority (unset by default).
    #[serde(default)]
    pub priority: Priority,
    /// Optional due timestamp.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Completion time; present exactly when `completed` is true.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Owning list. Not validated, orphans are tolerated.
    pub list_id: ListId,
    /// 1-based position assigned at creation.
    pub order: u32,
    /// Creation time, immutable.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Task {
    /// Mark the task completed at `now` unless it already is.
    pub fn complete(&mut self, now: OffsetDateTime) {
        if !self.completed || self.completed_at.is_none() {
            self.completed = true;
            self.completed_at = Some(now);
        }
    }

    /// Clear the completion flag and timestamp.
    pub const fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Restore the `completed` / `completed_at` pairing after a field-level merge.
    pub fn normalize_completion(&mut self, now: OffsetDateTime) {
        if self.completed {
            self.complete(now);
        } else {
            self.reopen();
        }
    }
}

/// Task priority. The empty string on the wire means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// No priority chosen.
    #[default]
    #[serde(rename = "")]
    Unset,
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Sort weight: `high=3, medium=2, low=1, unset=0`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Returns true when no priority is set.
    #[must_use]
    pub const fn is_unset(self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a priority token is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid priority: {0} (expected low, medium, high or empty)")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::Unset),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(s.to_owned())),
        }
    }
}

/// User preferences persisted next to the collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Theme name.
    pub theme: String,
    /// List preselected for new tasks.
    #[serde(alias = "defaultList")]
    pub default_list_id: ListId,
    /// Whether completed tasks are shown by default.
    pub show_completed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "light".into(),
            default_list_id: ListId(1),
            show_completed: false,
        }
    }
}

/// Lists seeded on first run.
#[must_use]
pub fn default_lists(now: OffsetDateTime) -> Vec<List> {
    vec![
        List {
            id: ListId(1),
            name: "Personal".into(),
            color: DEFAULT_LIST_COLOR.into(),
            order: 1,
            created_at: now,
        },
        List {
            id: ListId(2),
            name: "Work".into(),
            color: "#8b5cf6".into(),
            order: 2,
            created_at: now,
        },
    ]
}
