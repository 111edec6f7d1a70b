//! Location Resolution Module
//!
//! Supplies the user's position once per request. A position can come from
//! explicit coordinates or from a place name geocoded through Open-Meteo.

use std::str::FromStr;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::models::GeoLocation;
use crate::{FoodGuideError, Result};

const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1";

/// Source of the user's current position, asked once per acquisition.
///
/// Failures are [`FoodGuideError::LocationUnsupported`] when there is no way
/// to locate at all and [`FoodGuideError::LocationUnavailable`] otherwise.
/// Implementations may use `async fn`; the returned future must be `Send`.
pub trait LocationProvider {
    fn current_position(&self) -> impl Future<Output = Result<GeoLocation>> + Send;
}

/// A location as typed by the user
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates(GeoLocation),
    Name(String),
}

impl FromStr for LocationInput {
    type Err = FoodGuideError;

    /// "25.03,121.56" parses as coordinates, anything else as a place name
    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.is_empty() {
            return Err(FoodGuideError::invalid_input("Location cannot be empty"));
        }

        if let Some((lat, lng)) = input.split_once(',') {
            if let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
                let location = GeoLocation::new(lat, lng);
                location.validate()?;
                return Ok(LocationInput::Coordinates(location));
            }
        }

        Ok(LocationInput::Name(input.to_string()))
    }
}

/// Forward geocoding against the Open-Meteo API (no API key required)
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new(OPEN_METEO_GEOCODING_URL)
    }
}

impl Geocoder {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Resolve a place name to the best matching coordinates
    #[instrument(skip(self))]
    pub async fn geocode(&self, name: &str) -> Result<GeoLocation> {
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(name)
        );
        debug!("Geocoding request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FoodGuideError::location_unavailable(format!("Geocoding failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FoodGuideError::location_unavailable(format!(
                "Geocoding service returned {}",
                response.status()
            )));
        }

        let body: openmeteo::GeocodingResponse = response.json().await.map_err(|e| {
            FoodGuideError::location_unavailable(format!("Failed to parse geocoding response: {e}"))
        })?;

        let result = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| FoodGuideError::location_unavailable(format!("Location not found: {name}")))?;

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            result.name, result.latitude, result.longitude
        );
        Ok(GeoLocation::new(result.latitude, result.longitude))
    }
}

/// Service for resolving location inputs
pub struct LocationResolver {
    input: Option<LocationInput>,
    geocoder: Geocoder,
}

impl LocationResolver {
    pub fn new(input: Option<LocationInput>, geocoder: Geocoder) -> Self {
        Self { input, geocoder }
    }
}

impl LocationProvider for LocationResolver {
    async fn current_position(&self) -> Result<GeoLocation> {
        debug!("Resolving location input: {:?}", self.input);

        let location = match &self.input {
            None => {
                return Err(FoodGuideError::location_unsupported(
                    "no location given and none configured",
                ));
            }
            Some(LocationInput::Coordinates(location)) => *location,
            Some(LocationInput::Name(name)) => self.geocoder.geocode(name).await.inspect_err(|e| {
                warn!("Could not resolve '{}': {}", name, e);
            })?,
        };

        debug!("Resolved location: ({})", location.format_coordinates());
        Ok(location)
    }
}

/// `OpenMeteo` geocoding response structures
mod openmeteo {
    use super::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
    }
}
