//! Match finder.
//!
//! A candidate becomes a match iff `similarity >= min_similarity`, its place is
//! near the new item's place and the found time does not precede the lost time.
//! Candidates are scored concurrently; one failing candidate is logged and
//! skipped, never failing the batch.

mod types;


pub use types::FoundMatch;

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, EngineResult};
use crate::gate::{LocationGraph, time_valid};
use crate::item::Item;
use crate::scoring::{Combiner, ItemComparison};

/// Scores an item pair in `0..=100`.
pub trait PairScorer: Send + Sync {
    fn score_pair(
        &self,
        new_item: &Item,
        candidate: &Item,
    ) -> impl Future<Output = EngineResult<ItemComparison>> + Send;
}

impl PairScorer for Combiner {
    async fn score_pair(&self, new_item: &Item, candidate: &Item) -> EngineResult<ItemComparison> {
        self.compare_items(new_item, candidate).await
    }
}

pub struct MatchFinder<P: PairScorer = Combiner> {
    scorer: Arc<P>,
    locations: Arc<LocationGraph>,
}

impl<P: PairScorer> std::fmt::Debug for MatchFinder<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchFinder")
            .field("locations", &self.locations.len())
            .finish()
    }
}

impl<P: PairScorer> MatchFinder<P> {
    pub fn new(scorer: Arc<P>, locations: Arc<LocationGraph>) -> Self {
        Self { scorer, locations }
    }

    pub fn locations(&self) -> &LocationGraph {
        &self.locations
    }

    /// Returns matches sorted by similarity, highest first.
    ///
    /// `candidates` should already hold active items of the opposite kind from
    /// other reporters; anything else is skipped as a candidate error.
    #[instrument(skip_all, fields(item_id = %new_item.id(), kind = %new_item.kind(), candidates = candidates.len()))]
    pub async fn find_matches(
        &self,
        new_item: &Item,
        candidates: &[Item],
        min_similarity: f32,
    ) -> EngineResult<Vec<FoundMatch>> {
        new_item.validate()?;

        let scored = join_all(
            candidates
                .iter()
                .map(|candidate| self.evaluate(new_item, candidate, min_similarity)),
        )
        .await;

        let mut matches = Vec::new();
        let mut skipped = 0usize;
        for result in scored {
            match result {
                Ok(Some(found)) => matches.push(found),
                Ok(None) => {}
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, "Skipping candidate");
                }
            }
        }

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });

        info!(
            matched = matches.len(),
            skipped,
            min_similarity,
            "Match search finished"
        );
        Ok(matches)
    }

    async fn evaluate(
        &self,
        new_item: &Item,
        candidate: &Item,
        min_similarity: f32,
    ) -> EngineResult<Option<FoundMatch>> {
        let candidate_id = candidate.id();
        let reject = |reason: String| EngineError::Candidate {
            item_id: candidate_id,
            reason,
        };

        if candidate.kind() != new_item.kind().opposite() {
            return Err(reject(format!("candidate is a {} item", candidate.kind())));
        }
        if !candidate.is_active() {
            return Err(reject(format!("candidate is {}", candidate.status())));
        }
        if candidate.owner_id() == new_item.owner_id() {
            return Err(reject("candidate has the same reporter".to_string()));
        }
        candidate.validate().map_err(|e| reject(e.to_string()))?;

        let location_match = self
            .locations
            .is_nearby(new_item.location(), candidate.location());
        let (lost_at, found_at) = lost_and_found_times(new_item, candidate)
            .ok_or_else(|| reject("items are not a lost/found pair".to_string()))?;
        let time_ok = time_valid(lost_at, found_at);

        if !location_match || !time_ok {
            debug!(%candidate_id, location_match, time_valid = time_ok, "Gate rejected candidate");
            return Ok(None);
        }

        let comparison = self
            .scorer
            .score_pair(new_item, candidate)
            .await
            .map_err(|e| reject(e.to_string()))?;
        let similarity = comparison.similarity();

        debug!(
            %candidate_id,
            score = comparison.score,
            method = %comparison.method,
            "Scored candidate"
        );

        if similarity >= min_similarity {
            Ok(Some(FoundMatch::new(
                candidate_id,
                similarity,
                comparison.method,
            )))
        } else {
            Ok(None)
        }
    }
}

/// `(lost_at, found_at)` for a lost/found pair in either order.
fn lost_and_found_times(a: &Item, b: &Item) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    match (a, b) {
        (Item::Lost(lost), Item::Found(found)) | (Item::Found(found), Item::Lost(lost)) => {
            Some((lost.lost_at, found.found_at))
        }
        _ => None,
    }
}
