//! Replays item reports from a JSON file through the matching engine.
//!
//! Usage: `reclaim <items.json>`. The file holds an array of items tagged with
//! `"kind": "lost" | "found"`. Items are created in file order and each match
//! outcome is printed as one JSON line.

use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;

use reclaim::config::EngineConfig;
use reclaim::engine::MatchEngine;
use reclaim::item::Item;
use reclaim::persistence::{ItemStore, MemoryItemStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: reclaim <items.json>")?;

    let config = EngineConfig::from_env()?;
    config.validate()?;

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let items: Vec<Item> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path))?;

    tracing::info!(
        path = %path,
        items = items.len(),
        match_threshold = config.match_threshold,
        image_signal = config.use_image_signal,
        "Replaying item reports"
    );

    let store = Arc::new(MemoryItemStore::new());
    let engine = MatchEngine::from_config(config, store.clone());

    let mut matched = 0usize;
    for item in items {
        let id = item.id();
        store.save(&item).await?;

        match engine.on_item_created(item).await {
            Ok(outcome) => {
                matched += outcome.events.len();
                println!("{}", serde_json::to_string(&outcome)?);
            }
            Err(e) => tracing::warn!(item_id = %id, error = %e, "Rejected item report"),
        }
    }

    tracing::info!(stored = store.len(), matched, "Replay complete");
    Ok(())
}
