//! Listing registry refresh.

use std::time::Instant;

use tracing::info;
use twstock_data::{ListingProvider, StockRepository};

use crate::stats::CollectionStats;
use crate::Result;

/// Pull the current exchange registries and upsert them into `stocks`.
///
/// Run this before the first price collection and again whenever the
/// universe should pick up new listings; price runs only see what the
/// registry table holds.
pub async fn sync_listings(
    provider: &dyn ListingProvider,
    repo: &StockRepository,
) -> Result<CollectionStats> {
    let started = Instant::now();
    let mut stats = CollectionStats::new();

    let listings = provider.fetch_all().await?;
    info!(listings = listings.len(), "registry fetched");

    stats.chunks_attempted = 1;
    if listings.is_empty() {
        stats.empty_chunks = 1;
    } else {
        stats.rows_written = repo.upsert_listings(&listings).await?;
    }

    stats.elapsed = started.elapsed();
    Ok(stats)
}
