//! Engine facade.
//!
//! [`MatchEngine`] wires the providers, the finder, persistence and the verifier
//! from one [`EngineConfig`]. Matching never fails a validated item: store and
//! provider failures shrink the outcome instead. Each recorded match yields a
//! [`MatchEvent`] for whatever component sends notifications.

mod types;

#[cfg(test)]
mod tests;

pub use types::{MatchEvent, MatchOutcome};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::claim::{Claim, ClaimError, ClaimStatus, settle_verified_claim};
use crate::config::EngineConfig;
use crate::embedding::{EmbeddingCache, EmbeddingProvider};
use crate::error::{EngineError, EngineResult};
use crate::gate::LocationGraph;
use crate::image::ImageSimilarity;
use crate::item::{Item, ItemId, MatchRef};
use crate::lexical::LexicalScorer;
use crate::matching::MatchFinder;
use crate::persistence::{ItemMatches, ItemStore, MatchReader, MatchRecorder, StoreError};
use crate::scoring::Combiner;
use crate::verify::{AnswerVerifier, Verification};

pub struct MatchEngine<S> {
    config: EngineConfig,
    store: Arc<S>,
    combiner: Arc<Combiner>,
    finder: MatchFinder,
    recorder: MatchRecorder<S>,
    reader: MatchReader<S>,
    verifier: AnswerVerifier,
}

impl<S> std::fmt::Debug for MatchEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("config", &self.config)
            .field("combiner", &self.combiner)
            .finish_non_exhaustive()
    }
}

impl<S: ItemStore> MatchEngine<S> {
    /// Builds every provider from `config` with the default campus location graph.
    pub fn from_config(config: EngineConfig, store: Arc<S>) -> Self {
        let cache = Arc::new(EmbeddingCache::new(
            config.embedding_cache_capacity,
            config.embedding_cache_ttl,
        ));
        let embeddings = Arc::new(EmbeddingProvider::from_config(&config, cache));
        let lexical = Arc::new(LexicalScorer::from_config(&config));
        let images = if config.use_image_signal {
            let images = ImageSimilarity::from_config(&config).map(Arc::new);
            if images.is_none() {
                warn!("Image signal enabled without RECLAIM_IMAGE_ENDPOINT, scoring text only");
            }
            images
        } else {
            None
        };

        let combiner = Arc::new(Combiner::from_config(&config, embeddings, lexical, images));
        Self::new(
            config,
            store,
            combiner,
            Arc::new(LocationGraph::campus_default()),
        )
    }

    pub fn new(
        config: EngineConfig,
        store: Arc<S>,
        combiner: Arc<Combiner>,
        locations: Arc<LocationGraph>,
    ) -> Self {
        Self {
            finder: MatchFinder::new(combiner.clone(), locations),
            recorder: MatchRecorder::new(store.clone()),
            reader: MatchReader::new(store.clone()),
            verifier: AnswerVerifier::new(combiner.clone()),
            config,
            store,
            combiner,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn combiner(&self) -> &Combiner {
        &self.combiner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Matches a newly created item against the active opposite-kind pool and
    /// records the results on both sides.
    ///
    /// Only an invalid item is an error. The item is saved again with its match
    /// records; callers are expected to have saved it before.
    #[instrument(skip_all, fields(item_id = %item.id(), kind = %item.kind()))]
    pub async fn on_item_created(&self, mut item: Item) -> EngineResult<MatchOutcome> {
        item.validate()?;

        let candidates = match self
            .store
            .find_active(item.kind().opposite(), item.owner_id())
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Candidate lookup failed, no matches recorded");
                return Ok(MatchOutcome::unmatched(item));
            }
        };

        let matches = match self
            .finder
            .find_matches(&item, &candidates, self.config.match_threshold)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Match search failed, no matches recorded");
                return Ok(MatchOutcome::unmatched(item));
            }
        };

        let report = self.recorder.record(&mut item, &matches, Utc::now()).await;

        let owners: HashMap<ItemId, &str> = candidates
            .iter()
            .map(|candidate| (candidate.id(), candidate.owner_id()))
            .collect();
        let events: Vec<MatchEvent> = matches
            .iter()
            .filter(|found| report.recorded.contains(&found.item_id))
            .filter_map(|found| {
                owners
                    .get(&found.item_id)
                    .map(|owner| MatchEvent::between(&item, found, owner))
            })
            .collect();

        info!(
            candidates = candidates.len(),
            matches = matches.len(),
            events = events.len(),
            "Item matched"
        );

        Ok(MatchOutcome {
            item,
            matches,
            events,
            persistence: Some(report),
        })
    }

    /// Checks `answer` against the stored answer of found item `found_id`.
    pub async fn verify_claim_answer(
        &self,
        found_id: ItemId,
        answer: &str,
    ) -> EngineResult<Verification> {
        let found = self.store.get_by_id(found_id).await?;
        let correct = found.verification_answer().ok_or_else(|| {
            EngineError::input(format!("item {} has no verification answer", found_id))
        })?;
        self.verifier
            .verify(answer, correct, self.config.verify_threshold)
            .await
    }

    /// Verifies the claimant's answer, records the verdict on the claim and, when
    /// approved, marks both items claimed.
    #[instrument(skip_all, fields(claim_id = %claim.id))]
    pub async fn process_claim(
        &self,
        claim: &mut Claim,
        answer: &str,
    ) -> Result<Verification, ClaimError> {
        let verification = self.verify_claim_answer(claim.found_id, answer).await?;
        claim.record_verification(answer, &verification)?;

        if claim.status == ClaimStatus::Approved {
            settle_verified_claim(self.store.as_ref(), claim).await?;
        }
        Ok(verification)
    }

    /// Stored matches of an item above the display threshold.
    pub async fn matches_for(&self, item_id: ItemId) -> Result<Vec<MatchRef>, StoreError> {
        self.reader
            .matches_for(item_id, self.config.display_threshold_percent)
            .await
    }

    /// An owner's items with their displayable matches.
    pub async fn items_for_owner(&self, owner_id: &str) -> Result<Vec<ItemMatches>, StoreError> {
        self.reader
            .items_for_owner(owner_id, self.config.display_threshold_percent)
            .await
    }
}
