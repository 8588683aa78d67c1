use crate::error::ListingError;
use crate::geo::Coordinates;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything needed to build a [`Listing`], gathered while resolving a detail page
#[derive(Debug, Clone)]
pub struct ListingParts {
    pub id: String,
    pub url: String,
    pub title: String,
    pub address: String,
    pub price: String,
    pub category: String,
    pub coordinates: Coordinates,
    pub distance_km: f64,
    pub content_hash: String,
    pub image_hash: String,
}

/// A fully resolved rental advert.
///
/// Only obtainable through [`Listing::new`], so a value of this type always
/// has every field populated.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    id: String,
    url: String,
    title: String,
    address: String,
    price: String,
    category: String,
    coordinates: Coordinates,
    distance_km: f64,
    content_hash: String,
    image_hash: String,
    scraped_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(parts: ListingParts) -> Result<Self, ListingError> {
        let ListingParts {
            id,
            url,
            title,
            address,
            price,
            category,
            coordinates,
            distance_km,
            content_hash,
            image_hash,
        } = parts;

        if id.is_empty() {
            return Err(ListingError::Invalid("empty id".to_string()));
        }
        if url.is_empty() {
            return Err(ListingError::Invalid(format!("listing {} has no url", id)));
        }
        if content_hash.is_empty() || image_hash.is_empty() {
            return Err(ListingError::Invalid(format!("listing {} is missing a fingerprint", id)));
        }
        if !distance_km.is_finite() {
            return Err(ListingError::Invalid(format!("listing {} has a non-finite distance", id)));
        }

        Ok(Self {
            id,
            url,
            title,
            address,
            price,
            category,
            coordinates,
            distance_km,
            content_hash,
            image_hash,
            scraped_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Fingerprint of the raw `title + address` text
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Fingerprint of the primary image bytes
    pub fn image_hash(&self) -> &str {
        &self.image_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> ListingParts {
        ListingParts {
            id: "1234567890".to_string(),
            url: "http://www.kijiji.ca/v-apartments/1234567890".to_string(),
            title: "Bright 1 bedroom".to_string(),
            address: "100 Queen St W, Toronto".to_string(),
            price: "$2,100.00".to_string(),
            category: "1b".to_string(),
            coordinates: Coordinates::new(-79.38, 43.65),
            distance_km: 1.2,
            content_hash: "abc".to_string(),
            image_hash: "def".to_string(),
        }
    }

    #[test]
    fn test_builds_from_complete_parts() {
        let listing = Listing::new(parts()).unwrap();
        assert_eq!(listing.id(), "1234567890");
        assert_eq!(listing.price(), "$2,100.00");
        assert_eq!(listing.coordinates(), Coordinates::new(-79.38, 43.65));
    }

    #[test]
    fn test_rejects_empty_id() {
        let mut p = parts();
        p.id = String::new();
        assert!(matches!(Listing::new(p), Err(ListingError::Invalid(_))));
    }

    #[test]
    fn test_rejects_missing_fingerprint() {
        let mut p = parts();
        p.image_hash = String::new();
        assert!(Listing::new(p).is_err());
    }

    #[test]
    fn test_rejects_nan_distance() {
        let mut p = parts();
        p.distance_km = f64::NAN;
        assert!(Listing::new(p).is_err());
    }
}
