use std::sync::Arc;

use taskflow_core::{List, ListId};
use taskflow_store::{KeyValueStore, Storage, StorageKey};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult};
use crate::latency::{self, Latency};
use crate::patch::{ListPatch, NewList};

/// Owns the list collection and persists it after every mutation.
pub struct ListService<B> {
    storage: Arc<Storage<B>>,
    lists: Mutex<Vec<List>>,
    clock: Arc<dyn Clock>,
    latency: Latency,
}

impl<B: KeyValueStore> ListService<B> {
    /// Load the persisted lists (empty when absent or unreadable).
    pub fn new(storage: Arc<Storage<B>>, clock: Arc<dyn Clock>, latency: Latency) -> Self {
        let lists = storage.load(StorageKey::Lists, Vec::new());
        Self {
            storage,
            lists: Mutex::new(lists),
            clock,
            latency,
        }
    }

    /// Every list ordered by `order`.
    pub async fn get_all(&self) -> Vec<List> {
        self.latency.pause(latency::lists::GET_ALL).await;
        let mut lists = self.lists.lock().await.clone();
        lists.sort_by_key(|list| list.order);
        debug!(count = lists.len(), "Loaded lists");
        lists
    }

    /// The list with `id`.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no list has `id`.
    pub async fn get_by_id(&self, id: ListId) -> ServiceResult<List> {
        self.latency.pause(latency::lists::GET_BY_ID).await;
        self.lists
            .lock()
            .await
            .iter()
            .find(|list| list.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::list_not_found(id))
    }

    /// Append a new list after the existing ones.
    pub async fn create(&self, input: NewList) -> List {
        self.latency.pause(latency::lists::CREATE).await;
        let mut lists = self.lists.lock().await;
        let id = ListId::next_after(lists.iter().map(|list| list.id));
        let order = position_after(lists.len());
        let list = input.into_list(id, order, self.clock.now());
        lists.push(list.clone());
        self.storage.save(StorageKey::Lists, &*lists);
        drop(lists);
        info!(list = %list.id, name = %list.name, "Created list");
        list
    }

    /// Merge `patch` over the list with `id`.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no list has `id`.
    pub async fn update(&self, id: ListId, patch: ListPatch) -> ServiceResult<List> {
        self.latency.pause(latency::lists::UPDATE).await;
        let mut lists = self.lists.lock().await;
        let list = lists
            .iter_mut()
            .find(|list| list.id == id)
            .ok_or_else(|| ServiceError::list_not_found(id))?;
        patch.apply_to(list);
        let updated = list.clone();
        self.storage.save(StorageKey::Lists, &*lists);
        drop(lists);
        info!(list = %id, "Updated list");
        Ok(updated)
    }

    /// Remove and return the list with `id`. Tasks referencing it are kept.
    ///
    /// # Errors
    /// Returns [`ServiceError::NotFound`] when no list has `id`.
    pub async fn delete(&self, id: ListId) -> ServiceResult<List> {
        self.latency.pause(latency::lists::DELETE).await;
        let mut lists = self.lists.lock().await;
        let index = lists
            .iter()
            .position(|list| list.id == id)
            .ok_or_else(|| ServiceError::list_not_found(id))?;
        let removed = lists.remove(index);
        self.storage.save(StorageKey::Lists, &*lists);
        drop(lists);
        info!(list = %id, "Deleted list");
        Ok(removed)
    }

    /// Give each named list `order = position + 1`, then return every list.
    ///
    /// Unknown ids are skipped. Lists missing from `ids` keep their order.
    pub async fn reorder(&self, ids: &[ListId]) -> Vec<List> {
        self.latency.pause(latency::lists::REORDER).await;
        let mut lists = self.lists.lock().await;
        for (index, id) in ids.iter().enumerate() {
            if let Some(list) = lists.iter_mut().find(|list| list.id == *id) {
                list.order = position_after(index);
            }
        }
        self.storage.save(StorageKey::Lists, &*lists);
        drop(lists);
        info!(count = ids.len(), "Reordered lists");
        self.get_all().await
    }
}

fn position_after(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use taskflow_store::MemoryStore;
    use time::macros::datetime;

    fn service() -> ListService<MemoryStore> {
        let storage = Arc::new(Storage::new(MemoryStore::new()));
        let clock = Arc::new(FixedClock::new(datetime!(2024-06-10 12:00 UTC)));
        ListService::new(storage, clock, Latency::Immediate)
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_orders() {
        let service = service();
        let first = service.create(NewList::new("Personal")).await;
        let second = service.create(NewList::new("Work").with_color("#8b5cf6")).await;
        assert_eq!((first.id, first.order), (ListId(1), 1));
        assert_eq!((second.id, second.order), (ListId(2), 2));
        assert_eq!(second.color, "#8b5cf6");
        assert_eq!(first.created_at, datetime!(2024-06-10 12:00 UTC));
    }

    #[tokio::test]
    async fn get_all_sorts_by_order() -> ServiceResult<()> {
        let service = service();
        for name in ["a", "b", "c"] {
            service.create(NewList::new(name)).await;
        }
        service
            .update(
                ListId(1),
                ListPatch {
                    order: Some(9),
                    ..ListPatch::default()
                },
            )
            .await?;
        let names: Vec<String> = service.get_all().await.into_iter().map(|l| l.name).collect();
        assert_eq!(names, ["b", "c", "a"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let service = service();
        let expected = ServiceError::list_not_found(ListId(5));
        assert_eq!(service.get_by_id(ListId(5)).await, Err(expected.clone()));
        assert_eq!(
            service.update(ListId(5), ListPatch::default()).await,
            Err(expected.clone())
        );
        assert_eq!(service.delete(ListId(5)).await, Err(expected));
    }

    #[tokio::test]
    async fn mutations_are_persisted() -> ServiceResult<()> {
        let service = service();
        service.create(NewList::new("Personal")).await;
        service.create(NewList::new("Work")).await;
        service.delete(ListId(1)).await?;

        let stored: Vec<List> = service.storage.load(StorageKey::Lists, Vec::new());
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Work");
        Ok(())
    }

    #[tokio::test]
    async fn failed_persist_keeps_list_in_memory() -> ServiceResult<()> {
        let storage = Arc::new(Storage::new(MemoryStore::with_quota(8)));
        let clock = Arc::new(FixedClock::new(datetime!(2024-06-10 12:00 UTC)));
        let service = ListService::new(storage, clock, Latency::Immediate);

        let created = service.create(NewList::new("Errands")).await;
        assert_eq!(service.get_by_id(created.id).await?, created);
        assert_eq!(service.get_all().await, [created]);
        assert!(!service.storage.contains(StorageKey::Lists));
        assert!(service.storage.backend().is_empty());
        Ok(())
    }
}
