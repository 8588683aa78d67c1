use super::{Coordinates, Geocoder};
use crate::error::GeocodeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Geocoder backed by the Google Maps Geocoding API
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, GEOCODE_ENDPOINT)
    }

    /// Point the geocoder at a different API root (used against mock servers)
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create geocoding HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let url = format!(
            "{}?address={}&key={}",
            self.endpoint,
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );

        debug!(address = %address, "Geocoding address");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeocodeError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Unreachable(format!(
                "geocoding API returned HTTP {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        match body.status.as_str() {
            "OK" => {
                let location = body
                    .results
                    .first()
                    .map(|r| &r.geometry.location)
                    .ok_or_else(|| GeocodeError::NoMatch {
                        address: address.to_string(),
                    })?;
                Ok(Coordinates::new(location.lng, location.lat))
            }
            "ZERO_RESULTS" => Err(GeocodeError::NoMatch {
                address: address.to_string(),
            }),
            other => {
                warn!(status = %other, address = %address, "Geocoding API rejected request");
                Err(GeocodeError::InvalidResponse(format!(
                    "{}: {}",
                    other,
                    body.error_message.unwrap_or_default()
                )))
            }
        }
    }
}
