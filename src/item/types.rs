use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::to_percent;
use crate::error::EngineError;

/// Identifier shared by lost and found items.
pub type ItemId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which side of the lost/found pair an item is on.
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    /// Returns the kind that candidates must have.
    pub fn opposite(self) -> Self {
        match self {
            ItemKind::Lost => ItemKind::Found,
            ItemKind::Found => ItemKind::Lost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Lost => "lost",
            ItemKind::Found => "found",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Item lifecycle. `Claimed` and `Archived` items never enter a candidate pool.
pub enum ItemStatus {
    #[default]
    Active,
    Claimed,
    Archived,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Claimed => "claimed",
            ItemStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Which signals produced a score.
pub enum MatchMethod {
    #[serde(rename = "text-only")]
    TextOnly,
    #[serde(rename = "text+image")]
    TextImage,
}

impl MatchMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMethod::TextOnly => "text-only",
            MatchMethod::TextImage => "text+image",
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted record of a match, stored on both items of the pair.
///
/// The serialized field names are read by the listing layer and must not change.
/// `similarity_percent` is always `round(similarity * 100)`; the fields are private
/// so the pair can only be set together through [`MatchRef::new`]. Stored records
/// that break the pairing are rejected on deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredMatchRef")]
pub struct MatchRef {
    target_id: ItemId,
    similarity: f32,
    similarity_percent: u8,
    method: MatchMethod,
    location_match: bool,
    time_valid: bool,
    matched_at: DateTime<Utc>,
}

/// Wire shape of [`MatchRef`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMatchRef {
    target_id: ItemId,
    similarity: f32,
    similarity_percent: u8,
    method: MatchMethod,
    location_match: bool,
    time_valid: bool,
    matched_at: DateTime<Utc>,
}

impl TryFrom<StoredMatchRef> for MatchRef {
    type Error = EngineError;

    fn try_from(stored: StoredMatchRef) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&stored.similarity) {
            return Err(EngineError::input(format!(
                "match {} similarity {} outside [0, 1]",
                stored.target_id, stored.similarity
            )));
        }
        let expected = to_percent(stored.similarity);
        if stored.similarity_percent != expected {
            return Err(EngineError::input(format!(
                "match {} similarityPercent {} does not match similarity {} ({})",
                stored.target_id, stored.similarity_percent, stored.similarity, expected
            )));
        }
        Ok(Self {
            target_id: stored.target_id,
            similarity: stored.similarity,
            similarity_percent: stored.similarity_percent,
            method: stored.method,
            location_match: stored.location_match,
            time_valid: stored.time_valid,
            matched_at: stored.matched_at,
        })
    }
}

impl MatchRef {
    /// Creates a record, clamping `similarity` to `[0, 1]` and deriving the percentage.
    pub fn new(
        target_id: ItemId,
        similarity: f32,
        method: MatchMethod,
        location_match: bool,
        time_valid: bool,
        matched_at: DateTime<Utc>,
    ) -> Self {
        let similarity = if similarity.is_finite() {
            similarity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            target_id,
            similarity,
            similarity_percent: to_percent(similarity),
            method,
            location_match,
            time_valid,
            matched_at,
        }
    }

    pub fn target_id(&self) -> ItemId {
        self.target_id
    }

    pub fn similarity(&self) -> f32 {
        self.similarity
    }

    pub fn similarity_percent(&self) -> u8 {
        self.similarity_percent
    }

    pub fn method(&self) -> MatchMethod {
        self.method
    }

    pub fn location_match(&self) -> bool {
        self.location_match
    }

    pub fn time_valid(&self) -> bool {
        self.time_valid
    }

    pub fn matched_at(&self) -> DateTime<Utc> {
        self.matched_at
    }

    /// Returns the same record pointing the other way.
    pub fn reciprocal(&self, source_id: ItemId) -> Self {
        Self {
            target_id: source_id,
            ..self.clone()
        }
    }
}
