mod areas;
mod config;
mod dedup;
mod error;
mod geo;
mod hashing;
mod models;
mod notify;
mod scrapers;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use areas::Area;
use config::Config;
use dedup::{DedupStore, JsonFileDedupStore};
use geo::GoogleGeocoder;
use models::Listing;
use notify::{Notifier, OutboxNotifier};
use scrapers::{HttpFetcher, KijijiScraper, ScraperTrait};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Listings falling inside at least one area, each reported once
fn matching_listings<'a>(listings: &'a [Listing], areas: &[Area]) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| {
            let point = listing.coordinates();
            match areas.iter().find(|area| area.contains(&point)) {
                Some(area) => {
                    debug!(id = %listing.id(), area = %area.name, "Listing inside area");
                    true
                }
                None => false,
            }
        })
        .collect()
}

/// Mark every acquired listing as seen: ids, text fingerprints and image fingerprints
async fn register(store: &dyn DedupStore, listings: &[Listing]) {
    let ids: Vec<String> = listings.iter().map(|l| l.id().to_string()).collect();
    let hashes: Vec<String> = listings
        .iter()
        .flat_map(|l| [l.content_hash().to_string(), l.image_hash().to_string()])
        .collect();

    store.add_ids(&ids).await;
    store.add_content_hashes(&hashes).await;
}

/// Report matched listings and dump the run, then mark everything acquired as seen.
///
/// The store is persisted even when reporting fails, so ids registered during
/// acquisition (content duplicates) survive. The returned listings themselves
/// are only registered once handled, so a failed run re-surfaces them.
async fn finish_run(
    listings: &[Listing],
    areas: &[Area],
    notifier: &dyn Notifier,
    store: &JsonFileDedupStore,
    dump_path: &Path,
) -> Result<()> {
    let handled = report(listings, areas, notifier, dump_path).await;
    if handled.is_ok() {
        register(store, listings).await;
    }

    store.persist().await?;
    handled
}

async fn report(
    listings: &[Listing],
    areas: &[Area],
    notifier: &dyn Notifier,
    dump_path: &Path,
) -> Result<()> {
    let matched: Vec<Listing> = matching_listings(listings, areas)
        .into_iter()
        .cloned()
        .collect();
    info!("{} listings inside the search areas", matched.len());

    if !matched.is_empty() {
        notifier.send(&matched).await?;
    }

    if !listings.is_empty() {
        let json = serde_json::to_string_pretty(listings)?;
        tokio::fs::write(dump_path, json)
            .await
            .with_context(|| format!("Failed to write {}", dump_path.display()))?;
        info!("💾 Saved all listings to {}", dump_path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        let program = args.first().map(String::as_str).unwrap_or("rental-scout");
        eprintln!("Usage: {} KML_FILENAME", program);
        std::process::exit(1);
    }

    let config = Config::from_env()?;
    config.validate()?;

    let areas = areas::load_areas(&args[1]).await?;

    let api_key = config
        .geocoding_api_key
        .clone()
        .context("GOOGLE_GEO_API_KEY must be set")?;
    let fetcher = Arc::new(HttpFetcher::new()?);
    let geocoder = Arc::new(GoogleGeocoder::new(api_key)?);
    let store = Arc::new(JsonFileDedupStore::open(&config.dedup_store_path).await?);

    let scraper = KijijiScraper::new(config.search_params(), fetcher, geocoder, store.clone());

    info!("🏠 Rental Scout - {} scraper", scraper.source_name());
    let listings = scraper.scrape().await?;
    info!("✅ Scraped {} new listings", listings.len());

    let notifier = OutboxNotifier::new(
        &config.outbox_dir,
        config.from_address.clone(),
        config.to_addresses.clone(),
    );
    finish_run(
        &listings,
        &areas,
        &notifier,
        &store,
        Path::new("scraped_listings.json"),
    )
    .await
}
