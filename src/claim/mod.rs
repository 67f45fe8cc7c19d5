//! Claims linking a lost item to a found item.
//!
//! Status machine: `pending -> approved | rejected`, `approved -> completed`.
//! Settling an approved claim moves both items to `claimed`. The two writes are
//! sequential and not transactional; a failure between them leaves the pair
//! inconsistent and is logged.

mod error;


pub use error::ClaimError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::item::{Item, ItemId, ItemKind};
use crate::persistence::ItemStore;
use crate::verify::Verification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Completed => "completed",
        }
    }

    fn can_move_to(self, next: ClaimStatus) -> bool {
        matches!(
            (self, next),
            (ClaimStatus::Pending, ClaimStatus::Approved)
                | (ClaimStatus::Pending, ClaimStatus::Rejected)
                | (ClaimStatus::Approved, ClaimStatus::Completed)
        )
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: Uuid,
    pub lost_id: ItemId,
    pub found_id: ItemId,
    /// Reporter of the lost item.
    pub claimant_id: String,
    /// Reporter of the found item.
    pub finder_id: String,
    pub status: ClaimStatus,
    /// Answer given to the found item's verification question.
    pub answer: Option<String>,
    /// Combined verification score of `answer`.
    pub score: Option<f32>,
    pub created_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a pending claim. The first item must be lost, the second found.
    pub fn open(lost: &Item, found: &Item) -> Result<Self, ClaimError> {
        if lost.kind() != ItemKind::Lost || found.kind() != ItemKind::Found {
            return Err(ClaimError::KindMismatch);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            lost_id: lost.id(),
            found_id: found.id(),
            claimant_id: lost.owner_id().to_string(),
            finder_id: found.owner_id().to_string(),
            status: ClaimStatus::Pending,
            answer: None,
            score: None,
            created_at: Utc::now(),
        })
    }

    /// Stores the answer and its verdict: approved when verified, rejected otherwise.
    pub fn record_verification(
        &mut self,
        answer: &str,
        verification: &Verification,
    ) -> Result<(), ClaimError> {
        let next = if verification.is_verified {
            ClaimStatus::Approved
        } else {
            ClaimStatus::Rejected
        };
        self.transition(next)?;
        self.answer = Some(answer.to_string());
        self.score = Some(verification.similarity);
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), ClaimError> {
        self.transition(ClaimStatus::Completed)
    }

    fn transition(&mut self, next: ClaimStatus) -> Result<(), ClaimError> {
        if !self.status.can_move_to(next) {
            return Err(ClaimError::InvalidTransition {
                claim_id: self.id,
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Marks both items of an approved claim as claimed.
///
/// Both transitions are checked before anything is written. The lost item is
/// saved first; if the found item's write then fails, the pair is left
/// inconsistent and the error is returned.
#[instrument(skip_all, fields(claim_id = %claim.id))]
pub async fn settle_verified_claim<S: ItemStore>(
    store: &S,
    claim: &Claim,
) -> Result<(Item, Item), ClaimError> {
    if claim.status != ClaimStatus::Approved {
        return Err(ClaimError::InvalidTransition {
            claim_id: claim.id,
            from: claim.status.as_str(),
            to: "settled",
        });
    }

    let (lost, found) = tokio::join!(
        store.get_by_id(claim.lost_id),
        store.get_by_id(claim.found_id)
    );
    let (mut lost, mut found) = (lost?, found?);

    lost.mark_claimed()?;
    found.mark_claimed()?;

    store.save(&lost).await?;
    if let Err(e) = store.save(&found).await {
        error!(
            lost_id = %lost.id(),
            found_id = %found.id(),
            error = %e,
            "Lost item marked claimed but found item write failed; pair is inconsistent"
        );
        return Err(e.into());
    }

    info!(lost_id = %lost.id(), found_id = %found.id(), "Claim settled");
    Ok((lost, found))
}
