//! `FoodGuide` - Location-aware restaurant discovery
//!
//! This library asks a maps-grounded Gemini model for the best-rated
//! restaurants of a cuisine near a position, normalizes the JSON it answers
//! with, and drives the search session shown to the user.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod gemini;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod render;
pub mod search;
pub mod session;
pub mod web;

// Re-export core types for public API
pub use config::FoodGuideConfig;
pub use controller::SearchController;
pub use error::FoodGuideError;
pub use gemini::{GeminiClient, GeminiSettings};
pub use location_resolver::{Geocoder, LocationInput, LocationProvider, LocationResolver};
pub use models::{CuisineCategory, GeoLocation, ReservationKind, Restaurant, Review};
pub use search::{CompletionService, RequestComposer, ResponseExtractor, RestaurantSearchClient};
pub use session::{LoadingState, SearchSession, SessionFailure, SessionView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FoodGuideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
