use std::sync::Arc;

use taskflow_core::{ListId, Task, TaskId};
use taskflow_store::{KeyValueStore, Storage, StorageKey};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult};
use crate::latency::{self, Latency};
use crate::patch::{NewTask, TaskPatch};

/// Owns the task collection and persists it after every mutation.
pub struct TaskService<B> {
    storage: Arc<Storage<B>>,
    tasks: Mutex<Vec<Task>>,
    clock: Arc<dyn Clock>,
    latency: Latency,
}

impl<B: KeyValueStore> TaskService<B> {
    /// Load the persisted tasks (empty when absent or unreadable).
    pub fn new(storage: Arc<Storage<B>>, clock: Arc<dyn Clock>, latency: Latency) -> Self {
        let tasks = storage.load(StorageKey::Tasks, Vec::new());
        Self {
            storage,
            tasks: Mutex::new(tasks),
            clock,
            latency,
        }
    }

    /// Every task in storage order.
    pub async fn get_all(&self) -> Vec<Task> {
        self.latency.pause(latency::tasks::GET_ALL).await;
        let tasks = self.tasks.lock().await.clone();
        debug!(count = tasks.len(), "Loaded tasks");
        tasks
    }

    /// The task with `id`.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no task has `id`.
    pub async fn get_by_id(&self, id: TaskId) -> ServiceResult<Task> {
        self.latency.pause(latency::tasks::GET_BY_ID).await;
        self.tasks
            .lock()
            .await
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::task_not_found(id))
    }

    /// Append an open task. The list id is stored without validation.
    pub async fn create(&self, input: NewTask) -> Task {
        self.latency.pause(latency::tasks::CREATE).await;
        let mut tasks = self.tasks.lock().await;
        let id = TaskId::next_after(tasks.iter().map(|task| task.id));
        let order = u32::try_from(tasks.len()).map_or(u32::MAX, |len| len.saturating_add(1));
        let task = input.into_task(id, order, self.clock.now());
        tasks.push(task.clone());
        self.storage.save(StorageKey::Tasks, &*tasks);
        drop(tasks);
        info!(task = %task.id, list = %task.list_id, "Created task");
        task
    }

    /// Merge `patch` over the task with `id`, keeping `completed_at` paired with `completed`.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no task has `id`.
    pub async fn update(&self, id: TaskId, patch: TaskPatch) -> ServiceResult<Task> {
        self.latency.pause(latency::tasks::UPDATE).await;
        let now = self.clock.now();
        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| ServiceError::task_not_found(id))?;
        patch.apply_to(task, now);
        let updated = task.clone();
        self.storage.save(StorageKey::Tasks, &*tasks);
        drop(tasks);
        info!(task = %id, completed = updated.completed, "Updated task");
        Ok(updated)
    }

    /// Remove and return the task with `id`.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no task has `id`.
    pub async fn delete(&self, id: TaskId) -> ServiceResult<Task> {
        self.latency.pause(latency::tasks::DELETE).await;
        let mut tasks = self.tasks.lock().await;
        let index = tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| ServiceError::task_not_found(id))?;
        let removed = tasks.remove(index);
        self.storage.save(StorageKey::Tasks, &*tasks);
        drop(tasks);
        info!(task = %id, "Deleted task");
        Ok(removed)
    }

    /// Tasks belonging to `list_id`.
    pub async fn get_by_list_id(&self, list_id: ListId) -> Vec<Task> {
        self.latency.pause(latency::tasks::BY_LIST).await;
        self.select(|task| task.list_id == list_id).await
    }

    /// Tasks whose completion flag equals `completed`.
    pub async fn get_by_status(&self, completed: bool) -> Vec<Task> {
        self.latency.pause(latency::tasks::BY_STATUS).await;
        self.select(|task| task.completed == completed).await
    }

    /// Mark the task completed now.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no task has `id`.
    pub async fn mark_complete(&self, id: TaskId) -> ServiceResult<Task> {
        self.update(id, TaskPatch::completion(self.clock.now())).await
    }

    /// Reopen the task.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no task has `id`.
    pub async fn mark_incomplete(&self, id: TaskId) -> ServiceResult<Task> {
        self.update(id, TaskPatch::reopening()).await
    }

    /// Flip the completion state.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no task has `id`.
    pub async fn toggle_complete(&self, id: TaskId) -> ServiceResult<Task> {
        if self.get_by_id(id).await?.completed {
            self.mark_incomplete(id).await
        } else {
            self.mark_complete(id).await
        }
    }

    async fn select(&self, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        self.tasks
            .lock()
            .await
            .iter()
            .filter(|task| keep(task))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use taskflow_core::Priority;
    use taskflow_store::MemoryStore;
    use time::macros::datetime;

    fn service() -> TaskService<MemoryStore> {
        let storage = Arc::new(Storage::new(MemoryStore::new()));
        let clock = Arc::new(FixedClock::new(datetime!(2024-06-10 12:00 UTC)));
        TaskService::new(storage, clock, Latency::Immediate)
    }

    #[tokio::test]
    async fn create_fills_defaults() {
        let service = service();
        let task = service.create(NewTask::new("Buy milk", ListId(1))).await;
        assert_eq!(task.id, TaskId(1));
        assert_eq!(task.order, 1);
        assert!(task.description.is_empty());
        assert_eq!(task.priority, Priority::Unset);
        assert!(task.due_date.is_none());
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[tokio::test]
    async fn create_keeps_unknown_list_ids() {
        let service = service();
        let task = service.create(NewTask::new("Orphan", ListId(42))).await;
        assert_eq!(task.list_id, ListId(42));
    }

    #[tokio::test]
    async fn filters_by_list_and_status() -> ServiceResult<()> {
        let service = service();
        service.create(NewTask::new("a", ListId(1))).await;
        service.create(NewTask::new("b", ListId(2))).await;
        service.create(NewTask::new("c", ListId(1))).await;
        service.mark_complete(TaskId(3)).await?;

        let in_first: Vec<TaskId> = service.get_by_list_id(ListId(1)).await.iter().map(|t| t.id).collect();
        assert_eq!(in_first, [TaskId(1), TaskId(3)]);
        let done: Vec<TaskId> = service.get_by_status(true).await.iter().map(|t| t.id).collect();
        assert_eq!(done, [TaskId(3)]);
        let open: Vec<TaskId> = service.get_by_status(false).await.iter().map(|t| t.id).collect();
        assert_eq!(open, [TaskId(1), TaskId(2)]);
        Ok(())
    }

    #[tokio::test]
    async fn toggle_flips_completion() -> ServiceResult<()> {
        let service = service();
        service.create(NewTask::new("a", ListId(1))).await;

        let done = service.toggle_complete(TaskId(1)).await?;
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(datetime!(2024-06-10 12:00 UTC)));

        let reopened = service.toggle_complete(TaskId(1)).await?;
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn missing_task_reports_not_found() {
        let service = service();
        let expected = Err(ServiceError::task_not_found(TaskId(8)));
        assert_eq!(service.mark_complete(TaskId(8)).await, expected);
        assert_eq!(service.toggle_complete(TaskId(8)).await, expected);
        assert_eq!(service.delete(TaskId(8)).await, expected);
    }

    #[tokio::test]
    async fn failed_persist_keeps_task_in_memory() -> ServiceResult<()> {
        let storage = Arc::new(Storage::new(MemoryStore::with_quota(8)));
        let clock = Arc::new(FixedClock::new(datetime!(2024-06-10 12:00 UTC)));
        let service = TaskService::new(storage, clock, Latency::Immediate);

        let created = service.create(NewTask::new("Buy milk", ListId(1))).await;
        let done = service.mark_complete(created.id).await?;
        assert!(done.completed);

        assert_eq!(service.get_by_id(created.id).await?, done);
        assert_eq!(service.get_all().await, [done]);
        assert!(!service.storage.contains(StorageKey::Tasks));
        assert!(service.storage.backend().is_empty());
        Ok(())
    }
}
