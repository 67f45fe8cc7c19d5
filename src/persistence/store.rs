use std::future::Future;

use crate::item::{Item, ItemId, ItemKind};

use super::error::StoreError;

/// Item collection the engine reads candidates from and writes match records to.
pub trait ItemStore: Send + Sync {
    /// Active items of `kind`, excluding those reported by `exclude_owner`.
    fn find_active(
        &self,
        kind: ItemKind,
        exclude_owner: &str,
    ) -> impl Future<Output = Result<Vec<Item>, StoreError>> + Send;

    fn get_by_id(&self, id: ItemId) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Every item reported by `owner_id`, any status.
    fn find_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<Item>, StoreError>> + Send;

    /// Inserts or replaces the item with the same id.
    fn save(&self, item: &Item) -> impl Future<Output = Result<(), StoreError>> + Send;
}
