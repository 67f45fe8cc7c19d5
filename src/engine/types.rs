use serde::Serialize;

use crate::item::{Item, ItemId, ItemKind, MatchMethod};
use crate::matching::FoundMatch;
use crate::persistence::PersistReport;

/// A recorded match, addressed to both reporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub lost_item_id: ItemId,
    pub found_item_id: ItemId,
    pub lost_owner_id: String,
    pub found_owner_id: String,
    pub similarity_percent: u8,
    pub method: MatchMethod,
}

impl MatchEvent {
    pub(crate) fn between(item: &Item, found: &FoundMatch, counterpart_owner: &str) -> Self {
        let (lost_item_id, lost_owner_id, found_item_id, found_owner_id) = match item.kind() {
            ItemKind::Lost => (
                item.id(),
                item.owner_id().to_string(),
                found.item_id,
                counterpart_owner.to_string(),
            ),
            ItemKind::Found => (
                found.item_id,
                counterpart_owner.to_string(),
                item.id(),
                item.owner_id().to_string(),
            ),
        };
        Self {
            lost_item_id,
            found_item_id,
            lost_owner_id,
            found_owner_id,
            similarity_percent: found.similarity_percent,
            method: found.method,
        }
    }
}

/// Result of matching one new item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    /// The item with its match records attached.
    pub item: Item,
    /// Every match found, best first, including ones dropped at persistence time.
    pub matches: Vec<FoundMatch>,
    /// One event per match actually recorded.
    pub events: Vec<MatchEvent>,
    /// `None` when matching stopped before anything was written.
    pub persistence: Option<PersistReport>,
}

impl MatchOutcome {
    pub(crate) fn unmatched(item: Item) -> Self {
        Self {
            item,
            matches: Vec::new(),
            events: Vec::new(),
            persistence: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        !self.events.is_empty()
    }
}
