use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::item::{Item, ItemId, ItemKind};

use super::error::StoreError;
use super::store::ItemStore;

/// In-memory [`ItemStore`]. Write-failure injection is available with the `mock` feature.
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<HashMap<ItemId, Item>>,
    failing_ids: RwLock<HashSet<ItemId>>,
    fail_all_saves: AtomicBool,
    saves: AtomicUsize,
}

impl std::fmt::Debug for MemoryItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryItemStore")
            .field("items", &self.items.read().len())
            .finish()
    }
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    /// Inserts directly, bypassing failure injection and the save counter.
    pub fn insert(&self, item: Item) {
        self.items.write().insert(item.id(), item);
    }

    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.items.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Makes every later `save` of `id` fail.
    #[cfg(any(test, feature = "mock"))]
    pub fn fail_saves_for(&self, id: ItemId) {
        self.failing_ids.write().insert(id);
    }

    #[cfg(any(test, feature = "mock"))]
    pub fn fail_all_saves(&self, fail: bool) {
        self.fail_all_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ItemStore for MemoryItemStore {
    async fn find_active(&self, kind: ItemKind, exclude_owner: &str) -> Result<Vec<Item>, StoreError> {
        let mut items: Vec<Item> = self
            .items
            .read()
            .values()
            .filter(|item| {
                item.kind() == kind && item.is_active() && item.owner_id() != exclude_owner
            })
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.event_time(), item.id()));
        Ok(items)
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Item, StoreError> {
        self.get(id).ok_or(StoreError::NotFound { id })
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Item>, StoreError> {
        let mut items: Vec<Item> = self
            .items
            .read()
            .values()
            .filter(|item| item.owner_id() == owner_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.event_time(), item.id()));
        Ok(items)
    }

    async fn save(&self, item: &Item) -> Result<(), StoreError> {
        let id = item.id();
        if self.fail_all_saves.load(Ordering::SeqCst) || self.failing_ids.read().contains(&id) {
            return Err(StoreError::WriteFailed {
                id,
                reason: "injected write failure".to_string(),
            });
        }
        self.items.write().insert(id, item.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
