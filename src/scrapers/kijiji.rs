use crate::dedup::DedupStore;
use crate::geo::Geocoder;
use crate::models::Listing;
use crate::scrapers::catalog::{build_page_requests, PageRequest};
use crate::scrapers::detail::{ListingResolver, ParseOutcome};
use crate::scrapers::listing_page::{extract_listing_urls, listing_id_from_url};
use crate::scrapers::traits::{PageFetcher, ScraperTrait};
use crate::scrapers::types::SearchParams;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A detail page found on a result page
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    category: String,
    id: String,
    url: String,
}

/// Kijiji rental scraper.
///
/// Crawls every (category, page) result page, skips listing ids the dedup
/// store already knows, and resolves the rest into listings. Failures are
/// confined to the page or listing they occur in.
pub struct KijijiScraper {
    params: SearchParams,
    fetcher: Arc<dyn PageFetcher>,
    dedup: Arc<dyn DedupStore>,
    resolver: ListingResolver,
}

impl KijijiScraper {
    pub fn new(
        params: SearchParams,
        fetcher: Arc<dyn PageFetcher>,
        geocoder: Arc<dyn Geocoder>,
        dedup: Arc<dyn DedupStore>,
    ) -> Self {
        let resolver =
            ListingResolver::new(fetcher.clone(), geocoder, dedup.clone(), params.reference);
        Self {
            params,
            fetcher,
            dedup,
            resolver,
        }
    }

    /// Run one acquisition pass and return the listings not seen before.
    ///
    /// Nothing is registered with the dedup store here except ids of content
    /// duplicates; registering the returned listings is up to the caller.
    pub async fn run_acquisition(&self) -> Vec<Listing> {
        info!("Starting listing fetch");

        let requests = build_page_requests(&self.params);
        let page_limit = self.params.concurrency_for(requests.len());
        debug!(pages = requests.len(), concurrency = page_limit, "Fetching result pages");

        let pages: Vec<Vec<Candidate>> = stream::iter(requests)
            .map(|request| self.collect_page(request))
            .buffer_unordered(page_limit)
            .collect()
            .await;

        let candidates = self.filter_unseen(pages.into_iter().flatten()).await;
        let detail_limit = self.params.concurrency_for(candidates.len());
        debug!(listings = candidates.len(), concurrency = detail_limit, "Fetching detail pages");

        let listings: Vec<Listing> = stream::iter(candidates)
            .map(|candidate| self.resolve(candidate))
            .buffer_unordered(detail_limit)
            .filter_map(|listing| async move { listing })
            .collect()
            .await;

        info!("Listing fetch complete: {} new listings", listings.len());
        listings
    }

    async fn collect_page(&self, request: PageRequest) -> Vec<Candidate> {
        info!("Getting listings from {}", request.url);

        let html = match self.fetcher.fetch(&request.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(category = %request.category, error = %e, "Failed to fetch result page");
                return Vec::new();
            }
        };

        extract_listing_urls(&html)
            .into_iter()
            .filter_map(|url| {
                let Some(id) = listing_id_from_url(&url).map(str::to_string) else {
                    warn!(url = %url, "Listing URL has no id, skipping");
                    return None;
                };
                Some(Candidate {
                    category: request.category.clone(),
                    id,
                    url,
                })
            })
            .collect()
    }

    /// Drop ids repeated within this run and ids already in the dedup store
    async fn filter_unseen(&self, candidates: impl Iterator<Item = Candidate>) -> Vec<Candidate> {
        let mut queued = HashSet::new();
        let mut unseen = Vec::new();

        for candidate in candidates {
            if !queued.insert(candidate.id.clone()) {
                continue;
            }
            if self.dedup.contains_id(&candidate.id).await {
                info!("Listing {} already saved", candidate.id);
                continue;
            }
            unseen.push(candidate);
        }

        unseen
    }

    async fn resolve(&self, candidate: Candidate) -> Option<Listing> {
        match self
            .resolver
            .fetch_listing(&candidate.id, &candidate.url, &candidate.category)
            .await
        {
            Ok(ParseOutcome::Fresh(listing)) => Some(listing),
            Ok(ParseOutcome::Duplicate { id, kind }) => {
                debug!(id = %id, kind = ?kind, "Dropped content duplicate");
                None
            }
            Err(e) => {
                warn!(id = %candidate.id, url = %candidate.url, error = %e, "Skipping listing");
                None
            }
        }
    }
}

#[async_trait]
impl ScraperTrait for KijijiScraper {
    async fn scrape(&self) -> Result<Vec<Listing>> {
        Ok(self.run_acquisition().await)
    }

    fn source_name(&self) -> &'static str {
        "Kijiji"
    }
}
