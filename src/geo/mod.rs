pub mod google;

use crate::error::GeocodeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use google::GoogleGeocoder;

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the Earth in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

/// Resolves free-text addresses to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

/// Great-circle distance in kilometers between two points (haversine formula)
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lon1, lat1) = (a.longitude.to_radians(), a.latitude.to_radians());
    let (lon2, lat2) = (b.longitude.to_radians(), b.latitude.to_radians());

    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);

    // Rounding can push h a hair past 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TORONTO: Coordinates = Coordinates { longitude: -79.381576, latitude: 43.645100 };

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_km(TORONTO, TORONTO), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            (TORONTO, Coordinates::new(-73.5673, 45.5017)),
            (Coordinates::new(151.2093, -33.8688), Coordinates::new(-0.1276, 51.5072)),
            (Coordinates::new(0.0, 0.0), Coordinates::new(180.0, 0.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_km(a, b), haversine_km(b, a));
        }
    }

    #[test]
    fn test_toronto_to_montreal() {
        // ~504 km as the crow flies
        let montreal = Coordinates::new(-73.5673, 45.5017);
        let d = haversine_km(TORONTO, montreal);
        assert!(d > 495.0 && d < 515.0, "got {}", d);
    }

    #[test]
    fn test_meridian_arc() {
        let north = Coordinates::new(
            TORONTO.longitude,
            TORONTO.latitude + (5.0 / EARTH_RADIUS_KM).to_degrees(),
        );
        assert!((haversine_km(TORONTO, north) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_antipodes_are_half_circumference() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(180.0, 0.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
