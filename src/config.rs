use crate::geo::Coordinates;
use crate::scrapers::catalog::{category_path, known_categories};
use crate::scrapers::SearchParams;
use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub max_pages: u32,
    pub min_price: String,
    pub max_price: String,
    pub postal: String,
    pub postal_lat: f64,
    pub postal_lon: f64,
    pub search_distance: String,
    pub geocoding_api_key: Option<String>,
    pub selected_categories: Vec<String>,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub dedup_store_path: PathBuf,
    pub outbox_dir: PathBuf,
    pub max_concurrent_requests: usize,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; unset keys fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string_or =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            max_pages: parse_or(&lookup, "MAX_PAGES", 5)?,
            min_price: string_or("MIN_PRICE", "1500"),
            max_price: string_or("MAX_PRICE", "3000"),
            postal: string_or("POSTAL", "M5J1E6"),
            postal_lat: parse_or(&lookup, "POSTAL_LAT", 43.645100)?,
            postal_lon: parse_or(&lookup, "POSTAL_LON", -79.381576)?,
            search_distance: string_or("SEARCH_DISTANCE", "5"),
            geocoding_api_key: lookup("GOOGLE_GEO_API_KEY").filter(|k| !k.trim().is_empty()),
            selected_categories: split_list(&string_or("SELECTED_UNIT_TYPES", "bc,1b")),
            from_address: string_or("FROM_ADDRESS", ""),
            to_addresses: split_list(&string_or("TO_ADDRESSES", "")),
            dedup_store_path: PathBuf::from(string_or("DEDUP_STORE_PATH", "seen_listings.json")),
            outbox_dir: PathBuf::from(string_or("OUTBOX_DIR", "outbox")),
            max_concurrent_requests: parse_or(&lookup, "MAX_CONCURRENT_REQUESTS", 8)?,
        })
    }

    /// Check everything a run needs before any request goes out
    pub fn validate(&self) -> Result<()> {
        if self.geocoding_api_key.is_none() {
            bail!("GOOGLE_GEO_API_KEY must be set");
        }
        if self.to_addresses.is_empty() {
            bail!("TO_ADDRESSES must be set");
        }
        if self.max_pages == 0 {
            bail!("MAX_PAGES must be at least 1");
        }
        if self.selected_categories.is_empty() {
            bail!("SELECTED_UNIT_TYPES must name at least one category");
        }
        if let Some(unknown) = self
            .selected_categories
            .iter()
            .find(|c| category_path(c).is_none())
        {
            bail!(
                "Unknown category in SELECTED_UNIT_TYPES: {} (expected one of {})",
                unknown,
                known_categories().collect::<Vec<_>>().join(", ")
            );
        }
        Ok(())
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            categories: self.selected_categories.clone(),
            max_pages: self.max_pages,
            min_price: self.min_price.clone(),
            max_price: self.max_price.clone(),
            address: self.postal.clone(),
            reference: Coordinates::new(self.postal_lon, self.postal_lat),
            radius_km: self.search_distance.clone(),
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }
}
