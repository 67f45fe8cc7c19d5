use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::item::{Item, ItemId, MatchRef};
use crate::matching::FoundMatch;

use super::store::ItemStore;

/// A counterpart that received no reciprocal record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartIssue {
    pub item_id: ItemId,
    pub reason: String,
}

/// What one `record` call managed to write.
///
/// Writes are independent: the primary item and each counterpart succeed or fail
/// on their own and nothing is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistReport {
    /// Counterparts recorded on the new item.
    pub recorded: Vec<ItemId>,
    /// Whether the new item's own write succeeded.
    pub primary_saved: bool,
    pub primary_error: Option<String>,
    /// Counterparts that now carry a reciprocal record.
    pub reciprocated: Vec<ItemId>,
    /// Counterparts dropped before writing (missing, inactive or same kind).
    pub skipped: Vec<CounterpartIssue>,
    /// Counterparts whose reciprocal write failed.
    pub failed: Vec<CounterpartIssue>,
}

impl PersistReport {
    /// `true` when every write went through and no counterpart was dropped.
    pub fn is_complete(&self) -> bool {
        self.primary_saved && self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Writes match records onto the new item and its counterparts.
pub struct MatchRecorder<S> {
    store: Arc<S>,
}

impl<S> std::fmt::Debug for MatchRecorder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRecorder").finish_non_exhaustive()
    }
}

impl<S: ItemStore> MatchRecorder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Attaches one record per match to `item`, saves it, then pushes the
    /// reciprocal record onto each counterpart.
    ///
    /// Counterparts are re-read first and must still be active and of the
    /// opposite kind. Failures are logged and reported, never returned.
    /// Calls must not overlap on the same counterpart; concurrent calls can drop
    /// a reciprocal record.
    #[instrument(skip_all, fields(item_id = %item.id(), matches = matches.len()))]
    pub async fn record(
        &self,
        item: &mut Item,
        matches: &[FoundMatch],
        matched_at: DateTime<Utc>,
    ) -> PersistReport {
        let mut report = PersistReport::default();
        let item_id = item.id();
        let expected_kind = item.kind().opposite();

        let lookups = join_all(matches.iter().map(|found| async move {
            (found, self.store.get_by_id(found.item_id).await)
        }))
        .await;

        let mut counterparts: Vec<(Item, MatchRef)> = Vec::with_capacity(matches.len());
        for (found, lookup) in lookups {
            let reason = match lookup {
                Ok(counterpart) if counterpart.kind() != expected_kind => {
                    format!("counterpart is a {} item", counterpart.kind())
                }
                Ok(counterpart) if !counterpart.is_active() => {
                    format!("counterpart is {}", counterpart.status())
                }
                Ok(counterpart) => {
                    let record = found.to_match_ref(matched_at);
                    if item.push_match(record.clone()) {
                        report.recorded.push(found.item_id);
                    }
                    counterparts.push((counterpart, record.reciprocal(item_id)));
                    continue;
                }
                Err(e) => e.to_string(),
            };
            warn!(counterpart = %found.item_id, %reason, "Dropping match at persistence time");
            report.skipped.push(CounterpartIssue {
                item_id: found.item_id,
                reason,
            });
        }

        match self.store.save(item).await {
            Ok(()) => report.primary_saved = true,
            Err(e) => {
                warn!(error = %e, "Failed to save match records on new item");
                report.primary_error = Some(e.to_string());
            }
        }

        // Read-modify-write without a version check: two new items matching the
        // same counterpart at once can each save a copy missing the other's
        // reciprocal record. The last save wins and the loss is not detected.
        let writes = join_all(counterparts.into_iter().map(|(mut counterpart, reciprocal)| {
            async move {
                let id = counterpart.id();
                counterpart.push_match(reciprocal);
                (id, self.store.save(&counterpart).await)
            }
        }))
        .await;

        for (id, result) in writes {
            match result {
                Ok(()) => report.reciprocated.push(id),
                Err(e) => {
                    warn!(counterpart = %id, error = %e, "Failed to write reciprocal match record");
                    report.failed.push(CounterpartIssue {
                        item_id: id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if report.is_complete() {
            info!(
                recorded = report.recorded.len(),
                reciprocated = report.reciprocated.len(),
                "Match records persisted"
            );
        } else {
            warn!(
                recorded = report.recorded.len(),
                reciprocated = report.reciprocated.len(),
                skipped = report.skipped.len(),
                failed = report.failed.len(),
                primary_saved = report.primary_saved,
                "Match records partially persisted"
            );
        }
        report
    }
}
