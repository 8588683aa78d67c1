//! In-memory fakes for the network-facing traits.

use crate::error::{FetchError, GeocodeError};
use crate::geo::{Coordinates, Geocoder};
use crate::scrapers::traits::PageFetcher;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned bodies by exact URL and records every request.
/// Unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: Vec<u8>) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn was_fetched(&self, url: &str) -> bool {
        self.fetch_count(url) > 0
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Delays every request and records the most requests ever in flight at once
pub struct SlowFetcher {
    inner: FakeFetcher,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowFetcher {
    pub fn new(inner: FakeFetcher, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for SlowFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let result = self.inner.fetch(url).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Resolves only the addresses it was given
#[derive(Debug, Clone, Default)]
pub struct FakeGeocoder {
    addresses: HashMap<String, Coordinates>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: &str, coordinates: Coordinates) -> Self {
        self.addresses.insert(address.to_string(), coordinates);
        self
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        self.addresses
            .get(address)
            .copied()
            .ok_or_else(|| GeocodeError::NoMatch {
                address: address.to_string(),
            })
    }
}

/// A result page with one container per `(id, href, sponsored)` entry
pub fn result_page(entries: &[(&str, &str, bool)]) -> String {
    let containers: String = entries
        .iter()
        .map(|(id, href, sponsored)| {
            let class = if *sponsored {
                "search-item top-feature"
            } else {
                "search-item regular-ad"
            };
            format!(
                r#"<div class="{}" data-listing-id="{}" data-ad-id="{}" data-vip-url="{}"><a href="{}">link</a></div>"#,
                class, id, id, href, href
            )
        })
        .collect();

    format!("<html><body><main>{}</main></body></html>", containers)
}

/// A detail page carrying the given title, address, price and hero image
pub fn detail_page(title: &str, address: &str, price: &str, image_url: &str) -> String {
    format!(
        r#"<html><body>
            <h1 class="title-2323565163">{}</h1>
            <span class="currentPrice-2842943473"><span content="2150.00">{}</span></span>
            <span itemprop="address">{}</span>
            <img class="heroImageForPrint-2858486787" src="{}">
        </body></html>"#,
        title, price, address, image_url
    )
}
