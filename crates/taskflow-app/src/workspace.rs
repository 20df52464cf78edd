//! Composition root wiring storage, services and the derived views.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use taskflow_core::{
    Calendar, DateBucket, List, ListId, Progress, Settings, Task, TaskCounts, TaskFilter,
    group_by_date, list_name, sort_for_list, today_tasks,
};
use taskflow_store::{FileStore, KeyValueStore, MemoryStore, Seeded, Storage, StorageKey};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, BackendKind};
use crate::error::ServiceResult;
use crate::latency::Latency;
use crate::list_service::ListService;
use crate::task_service::TaskService;

/// Task paired with the display name of its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    /// The task record.
    #[serde(flatten)]
    pub task: Task,
    /// Name of the owning list, `"Unknown"` for orphans.
    pub list_name: String,
}

/// Tasks for the "Today" page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodayView {
    /// Open tasks whose due day already passed.
    pub overdue: Vec<TaskRow>,
    /// Tasks due today.
    pub today: Vec<TaskRow>,
    /// Completion over both sections.
    pub progress: Progress,
}

/// One non-empty date bucket of the "Upcoming" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRows {
    /// Bucket the rows fall into.
    pub bucket: DateBucket,
    /// Rows in input order.
    pub rows: Vec<TaskRow>,
}

/// Tasks of a single list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    /// The list itself.
    pub list: List,
    /// Filtered tasks, open first, then by priority and recency.
    pub tasks: Vec<Task>,
    /// Completion over the filtered tasks.
    pub progress: Progress,
}

/// Storage and both services sharing one backend and clock.
pub struct Workspace<B> {
    storage: Arc<Storage<B>>,
    lists: ListService<B>,
    tasks: TaskService<B>,
    clock: Arc<dyn Clock>,
    seeded: Seeded,
    show_completed: Option<bool>,
}

impl Workspace<Box<dyn KeyValueStore>> {
    /// Open the backend selected by `config`, rooted at `data_dir` for file storage.
    #[must_use]
    pub fn open(data_dir: &Path, config: &AppConfig) -> Self {
        let backend: Box<dyn KeyValueStore> = match config.storage.backend {
            BackendKind::File => Box::new(FileStore::new(data_dir)),
            BackendKind::Memory => Box::new(
                config
                    .storage
                    .quota_bytes
                    .map_or_else(MemoryStore::new, MemoryStore::with_quota),
            ),
        };
        debug!(backend = ?config.storage.backend, dir = %data_dir.display(), "Opening workspace");
        Self::with_backend(backend, Arc::new(SystemClock), config.latency())
            .with_show_completed(config.view.show_completed)
    }
}

impl<B: KeyValueStore> Workspace<B> {
    /// Seed missing records, then load both services from `backend`.
    pub fn with_backend(backend: B, clock: Arc<dyn Clock>, latency: Latency) -> Self {
        let storage = Arc::new(Storage::new(backend));
        let seeded = storage.initialize_defaults(clock.now());
        let lists = ListService::new(Arc::clone(&storage), Arc::clone(&clock), latency);
        let tasks = TaskService::new(Arc::clone(&storage), Arc::clone(&clock), latency);
        Self {
            storage,
            lists,
            tasks,
            clock,
            seeded,
            show_completed: None,
        }
    }

    /// Override the stored `showCompleted` preference.
    #[must_use]
    pub const fn with_show_completed(mut self, show: Option<bool>) -> Self {
        self.show_completed = show;
        self
    }

    /// List service.
    pub const fn lists(&self) -> &ListService<B> {
        &self.lists
    }

    /// Task service.
    pub const fn tasks(&self) -> &TaskService<B> {
        &self.tasks
    }

    /// Underlying storage adapter.
    pub fn storage(&self) -> &Storage<B> {
        &self.storage
    }

    /// Records written while opening.
    pub const fn seeded(&self) -> Seeded {
        self.seeded
    }

    /// Calendar for the current instant.
    pub fn calendar(&self) -> Calendar {
        Calendar::at(self.clock.now())
    }

    /// Stored user settings.
    pub fn settings(&self) -> Settings {
        self.storage.load(StorageKey::Settings, Settings::default())
    }

    /// Replace the stored user settings.
    pub fn save_settings(&self, settings: &Settings) {
        self.storage.save(StorageKey::Settings, settings);
    }

    /// Whether views include completed tasks unless told otherwise.
    pub fn shows_completed(&self) -> bool {
        self.show_completed
            .unwrap_or_else(|| self.settings().show_completed)
    }

    /// Every task passing `filter`, with list names.
    pub async fn all_view(&self, filter: &TaskFilter) -> Vec<TaskRow> {
        let lists = self.lists.get_all().await;
        let tasks = filter.apply(&self.tasks.get_all().await, &self.calendar());
        rows(tasks, &lists)
    }

    /// Tasks due today plus open overdue ones passing `filter`, split into sections.
    pub async fn today_view(&self, filter: &TaskFilter) -> TodayView {
        let calendar = self.calendar();
        let lists = self.lists.get_all().await;
        let selected = today_tasks(self.tasks.get_all().await, &calendar);
        let visible = filter.apply(&selected, &calendar);
        let progress = Progress::of(&visible);

        let (today, overdue): (Vec<Task>, Vec<Task>) = visible
            .into_iter()
            .partition(|task| task.due_date.is_some_and(|due| calendar.is_today(due)));
        TodayView {
            overdue: rows(overdue, &lists),
            today: rows(today, &lists),
            progress,
        }
    }

    /// Tasks passing `filter` grouped by due-date bucket; empty buckets are omitted.
    pub async fn upcoming_view(&self, filter: &TaskFilter) -> Vec<BucketRows> {
        let calendar = self.calendar();
        let lists = self.lists.get_all().await;
        let visible = filter.apply(&self.tasks.get_all().await, &calendar);
        let groups = group_by_date(visible, &calendar);
        groups
            .iter()
            .filter(|(_, tasks)| !tasks.is_empty())
            .map(|(bucket, tasks)| BucketRows {
                bucket,
                rows: rows(tasks.to_vec(), &lists),
            })
            .collect()
    }

    /// Tasks of one list passing `filter`, sorted for display.
    ///
    /// A `filter.list` naming another list leaves the view empty.
    ///
    /// # Errors
    /// Returns [`crate::ServiceError::NotFound`] when the list does not exist.
    pub async fn list_view(&self, list_id: ListId, filter: &TaskFilter) -> ServiceResult<ListView> {
        let list = self.lists.get_by_id(list_id).await?;
        let owned = self.tasks.get_by_list_id(list_id).await;
        let mut tasks = filter.apply(&owned, &self.calendar());
        sort_for_list(&mut tasks);
        let progress = Progress::of(&tasks);
        Ok(ListView {
            list,
            tasks,
            progress,
        })
    }

    /// Sidebar badge counts.
    pub async fn counts(&self) -> TaskCounts {
        let lists = self.lists.get_all().await;
        let tasks = self.tasks.get_all().await;
        TaskCounts::compute(&tasks, &lists, self.clock.now())
    }
}

fn rows(tasks: Vec<Task>, lists: &[List]) -> Vec<TaskRow> {
    tasks
        .into_iter()
        .map(|task| {
            let list_name = list_name(lists, task.list_id).to_owned();
            TaskRow { task, list_name }
        })
        .collect()
}
