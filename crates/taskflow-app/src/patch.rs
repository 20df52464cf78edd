//! Create inputs and partial updates accepted by the services.
//!
//! Every type deserializes from the camelCase JSON used by the persisted
//! records. Keys that are not fields (`Id`, `createdAt`, ...) are ignored, so
//! an update can never rewrite identity or creation time.

use serde::{Deserialize, Deserializer};
use taskflow_core::{DEFAULT_LIST_COLOR, List, ListId, Priority, Task, TaskId};
use time::OffsetDateTime;

/// Fields supplied when creating a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    /// Display name.
    pub name: String,
    /// Display color; the default color is used when absent or empty.
    #[serde(default)]
    pub color: Option<String>,
}

impl NewList {
    /// Input with a name and the default color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    /// Set the color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub(crate) fn into_list(self, id: ListId, order: u32, created_at: OffsetDateTime) -> List {
        let color = self
            .color
            .filter(|color| !color.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LIST_COLOR.to_owned());
        List {
            id,
            name: self.name,
            color,
            order,
            created_at,
        }
    }
}

/// Partial update for a list. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New color.
    #[serde(default)]
    pub color: Option<String>,
    /// New display position.
    #[serde(default)]
    pub order: Option<u32>,
}

impl ListPatch {
    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.order.is_none()
    }

    /// Merge the patch over `list`.
    pub fn apply_to(self, list: &mut List) {
        if let Some(name) = self.name {
            list.name = name;
        }
        if let Some(color) = self.color {
            list.color = color;
        }
        if let Some(order) = self.order {
            list.order = order;
        }
    }
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Title; callers ensure it is not empty.
    pub title: String,
    /// Description (empty when absent).
    #[serde(default)]
    pub description: String,
    /// Priority (unset when absent).
    #[serde(default)]
    pub priority: Priority,
    /// Optional due timestamp.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Owning list, stored verbatim.
    pub list_id: ListId,
}

impl NewTask {
    /// Input with a title and list; everything else defaulted.
    pub fn new(title: impl Into<String>, list_id: ListId) -> Self {
        Self {
            title: title.into(),
            list_id,
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the due timestamp.
    #[must_use]
    pub const fn with_due_date(mut self, due: OffsetDateTime) -> Self {
        self.due_date = Some(due);
        self
    }

    pub(crate) fn into_task(self, id: TaskId, order: u32, created_at: OffsetDateTime) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            completed: false,
            completed_at: None,
            list_id: self.list_id,
            order,
            created_at,
        }
    }
}

/// Partial update for a task.
///
/// `None` leaves a field unchanged. For `due_date` and `completed_at`,
/// `Some(None)` clears the value (`null` in JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Set or clear the due timestamp.
    #[serde(default, deserialize_with = "nullable_timestamp")]
    pub due_date: Option<Option<OffsetDateTime>>,
    /// New completion flag.
    #[serde(default)]
    pub completed: Option<bool>,
    /// Set or clear the completion timestamp.
    #[serde(default, deserialize_with = "nullable_timestamp")]
    pub completed_at: Option<Option<OffsetDateTime>>,
    /// Move to another list.
    #[serde(default)]
    pub list_id: Option<ListId>,
    /// New position.
    #[serde(default)]
    pub order: Option<u32>,
}

impl TaskPatch {
    /// Patch marking the task completed at `now`.
    #[must_use]
    pub fn completion(now: OffsetDateTime) -> Self {
        Self {
            completed: Some(true),
            completed_at: Some(Some(now)),
            ..Self::default()
        }
    }

    /// Patch clearing completion.
    #[must_use]
    pub fn reopening() -> Self {
        Self {
            completed: Some(false),
            completed_at: Some(None),
            ..Self::default()
        }
    }

    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
            && self.completed_at.is_none()
            && self.list_id.is_none()
            && self.order.is_none()
    }

    /// Merge the patch over `task`, then restore the completion pairing.
    pub fn apply_to(self, task: &mut Task, now: OffsetDateTime) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = completed_at;
        }
        if let Some(list_id) = self.list_id {
            task.list_id = list_id;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
        task.normalize_completion(now);
    }
}

// Present-but-null becomes `Some(None)`; a missing key stays `None` via `default`.
fn nullable_timestamp<'de, D>(deserializer: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn task() -> Task {
        NewTask::new("Buy milk", ListId(1)).into_task(TaskId(4), 4, datetime!(2024-06-01 08:00 UTC))
    }

    #[test]
    fn task_patch_ignores_identity_keys() -> Result<(), serde_json::Error> {
        let patch: TaskPatch = serde_json::from_str(
            r#"{"Id": 99, "createdAt": "2020-01-01T00:00:00Z", "title": "Buy oat milk"}"#,
        )?;
        let mut task = task();
        patch.apply_to(&mut task, datetime!(2024-06-10 12:00 UTC));
        assert_eq!(task.id, TaskId(4));
        assert_eq!(task.created_at, datetime!(2024-06-01 08:00 UTC));
        assert_eq!(task.title, "Buy oat milk");
        Ok(())
    }

    #[test]
    fn null_clears_and_absence_keeps_due_date() -> Result<(), serde_json::Error> {
        let mut task = task();
        task.due_date = Some(datetime!(2024-06-11 09:00 UTC));

        let keep: TaskPatch = serde_json::from_str(r#"{"priority": "high"}"#)?;
        assert_eq!(keep.due_date, None);
        keep.apply_to(&mut task, datetime!(2024-06-10 12:00 UTC));
        assert_eq!(task.due_date, Some(datetime!(2024-06-11 09:00 UTC)));
        assert_eq!(task.priority, Priority::High);

        let clear: TaskPatch = serde_json::from_str(r#"{"dueDate": null}"#)?;
        assert_eq!(clear.due_date, Some(None));
        clear.apply_to(&mut task, datetime!(2024-06-10 12:00 UTC));
        assert_eq!(task.due_date, None);
        Ok(())
    }

    #[test]
    fn apply_restores_completion_pairing() {
        let now = datetime!(2024-06-10 12:00 UTC);
        let mut task = task();

        TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        }
        .apply_to(&mut task, now);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));

        TaskPatch {
            completed: Some(false),
            ..TaskPatch::default()
        }
        .apply_to(&mut task, now);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn new_list_falls_back_to_default_color() {
        let created = datetime!(2024-06-10 12:00 UTC);
        let plain = NewList::new("Errands").into_list(ListId(3), 3, created);
        assert_eq!(plain.color, DEFAULT_LIST_COLOR);
        let blank = NewList::new("Errands").with_color(" ").into_list(ListId(3), 3, created);
        assert_eq!(blank.color, DEFAULT_LIST_COLOR);
        let colored = NewList::new("Errands").with_color("#10b981").into_list(ListId(3), 3, created);
        assert_eq!(colored.color, "#10b981");
    }

    #[test]
    fn list_patch_merges_present_fields_only() -> Result<(), serde_json::Error> {
        let mut list = NewList::new("Work").into_list(ListId(2), 2, datetime!(2024-06-10 12:00 UTC));
        let patch: ListPatch = serde_json::from_str(r#"{"Id": 7, "name": "Office"}"#)?;
        assert!(!patch.is_empty());
        patch.apply_to(&mut list);
        assert_eq!(list.id, ListId(2));
        assert_eq!(list.name, "Office");
        assert_eq!(list.order, 2);
        Ok(())
    }

    #[test]
    fn new_task_decodes_camel_case() -> Result<(), serde_json::Error> {
        let input: NewTask = serde_json::from_str(
            r#"{"title": "Report", "listId": 2, "priority": "", "dueDate": "2024-06-12T17:00:00Z"}"#,
        )?;
        assert_eq!(input.list_id, ListId(2));
        assert_eq!(input.priority, Priority::Unset);
        assert_eq!(input.due_date, Some(datetime!(2024-06-12 17:00 UTC)));
        assert!(input.description.is_empty());
        Ok(())
    }
}
