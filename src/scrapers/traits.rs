use crate::error::FetchError;
use crate::models::Listing;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all listing scrapers
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Scrape listings not seen in a previous run
    async fn scrape(&self) -> Result<Vec<Listing>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}

/// Retrieves the raw body of a URL. No retries; errors are passed through as-is.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
