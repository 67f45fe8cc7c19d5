use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::to_percent;
use crate::item::{ItemId, MatchMethod, MatchRef};

/// A candidate that passed similarity, location and time checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundMatch {
    pub item_id: ItemId,
    pub similarity: f32,
    pub similarity_percent: u8,
    pub method: MatchMethod,
    pub location_match: bool,
    pub time_valid: bool,
}

impl FoundMatch {
    pub(crate) fn new(item_id: ItemId, similarity: f32, method: MatchMethod) -> Self {
        Self {
            item_id,
            similarity,
            similarity_percent: to_percent(similarity),
            method,
            location_match: true,
            time_valid: true,
        }
    }

    /// Record to store on the new item, pointing at this candidate.
    pub fn to_match_ref(&self, matched_at: DateTime<Utc>) -> MatchRef {
        MatchRef::new(
            self.item_id,
            self.similarity,
            self.method,
            self.location_match,
            self.time_valid,
            matched_at,
        )
    }
}
