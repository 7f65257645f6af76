//! Location model for geographic coordinates and metadata

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// Location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, formatted address, etc.)
    pub name: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Great-circle distance to another location in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &Location) -> f64 {
        let from = HaversineLocation {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        let to = HaversineLocation {
            latitude: other.latitude,
            longitude: other.longitude,
        };
        distance(from, to, Units::Kilometers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinates() {
        let location = Location::new(9.931_233, 76.267_304, "Kochi".to_string());
        assert_eq!(location.format_coordinates(), "9.9312, 76.2673");
    }

    #[test]
    fn test_distance_km() {
        let kochi = Location::new(9.9312, 76.2673, "Kochi".to_string());
        let same = kochi.clone();
        assert!(kochi.distance_km(&same) < 0.001);

        // Kochi to Munnar is roughly 85 km as the crow flies
        let munnar = Location::new(10.0889, 77.0595, "Munnar".to_string());
        let d = kochi.distance_km(&munnar);
        assert!(d > 80.0 && d < 95.0, "unexpected distance {d}");
    }
}
