//! Typed errors for the acquisition pipeline.
//!
//! All of these are per-item failures: the orchestrator logs them and drops
//! the affected page or listing. Fatal errors only come from configuration
//! and are reported through `anyhow` in `main`.

use thiserror::Error;

/// Failure retrieving raw bytes for a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Failure resolving an address to coordinates.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no geocoding match for {address:?}")]
    NoMatch { address: String },

    #[error("geocoding service unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected geocoding response: {0}")]
    InvalidResponse(String),
}

/// Why a single listing could not be produced.
#[derive(Debug, Error)]
pub enum ListingError {
    /// A required field was absent from the detail page
    #[error("listing {id} has no {field}")]
    IncompleteListing { id: String, field: &'static str },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("invalid listing: {0}")]
    Invalid(String),
}
