use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::item::{Item, ItemId, MatchRef};

use super::error::StoreError;
use super::store::ItemStore;

/// An item with its stored matches, filtered for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMatches {
    pub item: Item,
    pub matches: Vec<MatchRef>,
}

/// Read side of match records. Only the stored `similarity_percent` is used;
/// nothing is rescored.
pub struct MatchReader<S> {
    store: Arc<S>,
}

impl<S> std::fmt::Debug for MatchReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchReader").finish_non_exhaustive()
    }
}

impl<S: ItemStore> MatchReader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stored matches of one item with `similarity_percent > min_percent`, best first.
    pub async fn matches_for(
        &self,
        item_id: ItemId,
        min_percent: u8,
    ) -> Result<Vec<MatchRef>, StoreError> {
        let item = self.store.get_by_id(item_id).await?;
        Ok(displayable(&item, min_percent))
    }

    /// Every item of `owner_id` with its displayable matches.
    pub async fn items_for_owner(
        &self,
        owner_id: &str,
        min_percent: u8,
    ) -> Result<Vec<ItemMatches>, StoreError> {
        let items = self.store.find_by_owner(owner_id).await?;
        debug!(owner_id, items = items.len(), min_percent, "Listing owner items");
        Ok(items
            .into_iter()
            .map(|item| {
                let matches = displayable(&item, min_percent);
                ItemMatches { item, matches }
            })
            .collect())
    }
}

fn displayable(item: &Item, min_percent: u8) -> Vec<MatchRef> {
    let mut matches: Vec<MatchRef> = item
        .matches()
        .iter()
        .filter(|m| m.similarity_percent() > min_percent)
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.similarity_percent().cmp(&a.similarity_percent()));
    matches
}
