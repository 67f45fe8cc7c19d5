//! Lost/found item model.
//!
//! Items are a tagged enum resolved once at the boundary: the variant decides which
//! timestamp field applies, and only [`FoundItem`] carries a verification question.

pub mod types;


pub use types::{ItemId, ItemKind, ItemStatus, MatchMethod, MatchRef};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Fields shared by both item variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub id: ItemId,
    /// Reporter identity.
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
    /// Where the item was lost or found.
    pub location: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub matches: Vec<MatchRef>,
}

impl ItemDetails {
    fn new(owner_id: &str, name: &str, description: &str, location: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: String::new(),
            color: None,
            brand: None,
            status: ItemStatus::Active,
            location: location.to_string(),
            image_url: None,
            matches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItem {
    #[serde(flatten)]
    pub details: ItemDetails,
    pub lost_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundItem {
    #[serde(flatten)]
    pub details: ItemDetails,
    pub found_at: DateTime<Utc>,
    #[serde(default)]
    pub verification_question: Option<String>,
    #[serde(default)]
    pub verification_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Lost(LostItem),
    Found(FoundItem),
}

impl Item {
    /// Creates an active lost item with a fresh id.
    pub fn lost(
        owner_id: &str,
        name: &str,
        description: &str,
        location: &str,
        lost_at: DateTime<Utc>,
    ) -> Self {
        Item::Lost(LostItem {
            details: ItemDetails::new(owner_id, name, description, location),
            lost_at,
        })
    }

    /// Creates an active found item with a fresh id and no verification question.
    pub fn found(
        owner_id: &str,
        name: &str,
        description: &str,
        location: &str,
        found_at: DateTime<Utc>,
    ) -> Self {
        Item::Found(FoundItem {
            details: ItemDetails::new(owner_id, name, description, location),
            found_at,
            verification_question: None,
            verification_answer: None,
        })
    }

    pub fn with_image(mut self, url: &str) -> Self {
        self.details_mut().image_url = Some(url.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.details_mut().category = category.to_string();
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.details_mut().color = Some(color.to_string());
        self
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.details_mut().brand = Some(brand.to_string());
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.details_mut().status = status;
        self
    }

    /// Attaches a verification question; ignored on lost items.
    pub fn with_verification(mut self, question: &str, answer: &str) -> Self {
        if let Item::Found(found) = &mut self {
            found.verification_question = Some(question.to_string());
            found.verification_answer = Some(answer.to_string());
        }
        self
    }

    pub fn details(&self) -> &ItemDetails {
        match self {
            Item::Lost(item) => &item.details,
            Item::Found(item) => &item.details,
        }
    }

    pub fn details_mut(&mut self) -> &mut ItemDetails {
        match self {
            Item::Lost(item) => &mut item.details,
            Item::Found(item) => &mut item.details,
        }
    }

    pub fn id(&self) -> ItemId {
        self.details().id
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Lost(_) => ItemKind::Lost,
            Item::Found(_) => ItemKind::Found,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.details().owner_id
    }

    pub fn status(&self) -> ItemStatus {
        self.details().status
    }

    pub fn is_active(&self) -> bool {
        self.status() == ItemStatus::Active
    }

    pub fn location(&self) -> &str {
        &self.details().location
    }

    /// Lost-at or found-at, depending on the variant.
    pub fn event_time(&self) -> DateTime<Utc> {
        match self {
            Item::Lost(item) => item.lost_at,
            Item::Found(item) => item.found_at,
        }
    }

    /// Name and description joined; the only text used for item-pair scoring.
    pub fn match_text(&self) -> String {
        let details = self.details();
        let name = details.name.trim();
        let description = details.description.trim();
        if description.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", name, description)
        }
    }

    /// Returns the image URL if present and non-blank.
    pub fn image_url(&self) -> Option<&str> {
        self.details()
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Returns the stored answer of a found item's verification question.
    pub fn verification_answer(&self) -> Option<&str> {
        match self {
            Item::Found(item) => item
                .verification_answer
                .as_deref()
                .filter(|a| !a.trim().is_empty()),
            Item::Lost(_) => None,
        }
    }

    pub fn matches(&self) -> &[MatchRef] {
        &self.details().matches
    }

    /// Checks the fields the engine reads.
    pub fn validate(&self) -> EngineResult<()> {
        let details = self.details();
        if details.name.trim().is_empty() {
            return Err(EngineError::input(format!("item {} has an empty name", details.id)));
        }
        if details.owner_id.trim().is_empty() {
            return Err(EngineError::input(format!("item {} has no owner", details.id)));
        }
        if details.location.trim().is_empty() {
            return Err(EngineError::input(format!(
                "item {} has no location",
                details.id
            )));
        }
        Ok(())
    }

    /// Moves an active item to `Claimed`. Allowed at most once.
    pub fn mark_claimed(&mut self) -> EngineResult<()> {
        let id = self.id();
        let details = self.details_mut();
        match details.status {
            ItemStatus::Active => {
                details.status = ItemStatus::Claimed;
                Ok(())
            }
            from => Err(EngineError::InvalidTransition {
                item_id: id,
                from: from.as_str(),
                to: ItemStatus::Claimed.as_str(),
            }),
        }
    }

    /// Archives the item. Existing match records are kept for audit.
    pub fn archive(&mut self) {
        self.details_mut().status = ItemStatus::Archived;
    }

    /// Appends a match record unless one for the same target already exists.
    ///
    /// Returns `false` when the record was a duplicate.
    pub fn push_match(&mut self, match_ref: MatchRef) -> bool {
        let matches = &mut self.details_mut().matches;
        if matches
            .iter()
            .any(|existing| existing.target_id() == match_ref.target_id())
        {
            return false;
        }
        matches.push(match_ref);
        true
    }
}
