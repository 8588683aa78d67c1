//! Detail page parsing and per-listing resolution.
//!
//! Field extraction is synchronous and all-or-nothing. Resolution then
//! fetches the primary image and geocodes the address concurrently, and
//! checks both fingerprints against the dedup store before a [`Listing`]
//! is built.

use crate::dedup::DedupStore;
use crate::error::ListingError;
use crate::geo::{haversine_km, Coordinates, Geocoder};
use crate::hashing::{content_fingerprint, fingerprint};
use crate::models::{Listing, ListingParts};
use crate::scrapers::traits::PageFetcher;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::info;

const TITLE_CLASS_PREFIX: &str = "title";
const PRICE_CLASS_PREFIX: &str = "currentPrice";
/// Matched anywhere in a class name, unlike the title and price prefixes
const IMAGE_CLASS_MARKER: &str = "heroImageForPrint";

/// Text fields read straight from a detail page
#[derive(Debug, Clone, PartialEq)]
pub struct DetailFields {
    pub title: String,
    pub address: String,
    pub price: String,
    pub image_url: String,
}

/// Which fingerprint matched an earlier listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    Image,
    Text,
}

#[derive(Debug)]
pub enum ParseOutcome {
    Fresh(Listing),
    /// Same unit re-posted under a new id. The id has already been marked seen.
    Duplicate { id: String, kind: DuplicateKind },
}

fn first_with_class<'a>(
    document: &'a Html,
    tag: &str,
    matches: impl Fn(&str) -> bool,
) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(tag).ok()?;
    document
        .select(&selector)
        .find(|el| el.value().classes().any(&matches))
}

/// Pull the required fields out of a detail page.
///
/// Title, address and image URL are required; price is optional and kept
/// verbatim. Text is not trimmed.
pub fn extract_fields(id: &str, html: &[u8]) -> Result<DetailFields, ListingError> {
    let document = Html::parse_document(&String::from_utf8_lossy(html));
    let missing = |field| ListingError::IncompleteListing {
        id: id.to_string(),
        field,
    };

    let title = first_with_class(&document, "h1", |c| c.starts_with(TITLE_CLASS_PREFIX))
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| missing("title"))?;

    let address = Selector::parse(r#"span[itemprop="address"]"#)
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| missing("address"))?;

    let image_url = first_with_class(&document, "img", |c| c.contains(IMAGE_CLASS_MARKER))
        .and_then(|el| el.value().attr("src"))
        .map(str::to_string)
        .ok_or_else(|| missing("image"))?;

    let price = first_with_class(&document, "span", |c| c.starts_with(PRICE_CLASS_PREFIX))
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    Ok(DetailFields {
        title,
        address,
        price,
        image_url,
    })
}

/// Turns fetched detail pages into listings, consulting the geocoder and dedup store
#[derive(Clone)]
pub struct ListingResolver {
    fetcher: Arc<dyn PageFetcher>,
    geocoder: Arc<dyn Geocoder>,
    dedup: Arc<dyn DedupStore>,
    reference: Coordinates,
}

impl ListingResolver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        geocoder: Arc<dyn Geocoder>,
        dedup: Arc<dyn DedupStore>,
        reference: Coordinates,
    ) -> Self {
        Self {
            fetcher,
            geocoder,
            dedup,
            reference,
        }
    }

    /// Fetch a detail page and parse it
    pub async fn fetch_listing(
        &self,
        id: &str,
        url: &str,
        category: &str,
    ) -> Result<ParseOutcome, ListingError> {
        info!("Parsing {}", url);
        let html = self.fetcher.fetch(url).await?;
        self.parse_listing(id, url, category, &html).await
    }

    pub async fn parse_listing(
        &self,
        id: &str,
        url: &str,
        category: &str,
        html: &[u8],
    ) -> Result<ParseOutcome, ListingError> {
        let fields = extract_fields(id, html)?;

        let (image, coordinates) = tokio::join!(
            self.fetcher.fetch(&fields.image_url),
            self.geocoder.geocode(&fields.address),
        );
        let coordinates = coordinates?;
        let image = image?;

        let distance_km = haversine_km(coordinates, self.reference);

        let image_hash = fingerprint(&image);
        if self.dedup.contains_content_hash(&image_hash).await {
            return Ok(self.duplicate(id, DuplicateKind::Image).await);
        }

        let content_hash = content_fingerprint(&fields.title, &fields.address);
        if self.dedup.contains_content_hash(&content_hash).await {
            return Ok(self.duplicate(id, DuplicateKind::Text).await);
        }

        let listing = Listing::new(ListingParts {
            id: id.to_string(),
            url: url.to_string(),
            title: fields.title,
            address: fields.address,
            price: fields.price,
            category: category.to_string(),
            coordinates,
            distance_km,
            content_hash,
            image_hash,
        })?;

        Ok(ParseOutcome::Fresh(listing))
    }

    async fn duplicate(&self, id: &str, kind: DuplicateKind) -> ParseOutcome {
        self.dedup.add_ids(&[id.to_string()]).await;
        info!(id = %id, kind = ?kind, "Duplicated listing content, skipping");
        ParseOutcome::Duplicate {
            id: id.to_string(),
            kind,
        }
    }
}
