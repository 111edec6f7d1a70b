//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

use crate::{FoodGuideError, Result};

/// A WGS-84 position in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl GeoLocation {
    /// Create a new location
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both coordinates are finite and inside ±90 / ±180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(FoodGuideError::invalid_input(format!(
                "latitude {} is outside -90..=90",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(FoodGuideError::invalid_input(format!(
                "longitude {} is outside -180..=180",
                self.lng
            )));
        }
        Ok(())
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_format_coordinates() {
        let location = GeoLocation::new(25.033_964, 121.564_468);
        assert_eq!(location.format_coordinates(), "25.0340, 121.5645");
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(25.03, 121.56)]
    fn test_valid_coordinates(#[case] lat: f64, #[case] lng: f64) {
        assert!(GeoLocation::new(lat, lng).validate().is_ok());
    }

    #[rstest]
    #[case(90.01, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 180.5)]
    #[case(0.0, -200.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn test_invalid_coordinates(#[case] lat: f64, #[case] lng: f64) {
        let err = GeoLocation::new(lat, lng).validate().unwrap_err();
        assert!(matches!(err, FoodGuideError::InvalidInput { .. }));
    }
}
