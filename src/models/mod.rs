//! Data models for the FoodGuide application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates of the user
//! - Category: The fixed set of cuisine filters
//! - Restaurant: Normalized restaurant records and their reviews

pub mod category;
pub mod location;
pub mod restaurant;

// Re-export all public types for convenient access
pub use category::CuisineCategory;
pub use location::GeoLocation;
pub use restaurant::{ReservationKind, Restaurant, Review};
