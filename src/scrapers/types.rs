use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};

/// Search parameters for listing acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Category labels to crawl, e.g. "bc" or "1b"
    pub categories: Vec<String>,
    /// Result pages fetched per category
    pub max_pages: u32,
    /// Lower price bound, passed through to the site untouched
    pub min_price: String,
    /// Upper price bound, passed through to the site untouched
    pub max_price: String,
    /// Free-text reference address (usually a postal code)
    pub address: String,
    /// Resolved coordinates of `address`; distances are measured from here
    pub reference: Coordinates,
    /// Search radius in kilometers
    pub radius_km: String,
    /// Cap on simultaneous requests per fan-out stage. 0 means unbounded.
    pub max_concurrent_requests: usize,
}

impl SearchParams {
    /// Number of futures to keep in flight for `pending` queued requests
    pub fn concurrency_for(&self, pending: usize) -> usize {
        match self.max_concurrent_requests {
            0 => pending.max(1),
            n => n,
        }
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            categories: vec!["bc".to_string(), "1b".to_string()],
            max_pages: 5,
            min_price: "1500".to_string(),
            max_price: "3000".to_string(),
            address: "M5J1E6".to_string(),
            reference: Coordinates::new(-79.381576, 43.645100),
            radius_km: "5".to_string(),
            max_concurrent_requests: 8,
        }
    }
}
