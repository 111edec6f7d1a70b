//! Restaurant records as shown on result cards

use serde::{Deserialize, Serialize};

/// A customer review summary, always nested under a [`Restaurant`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub author: String,
    /// Star rating as reported by the model, nominally 1-5
    pub rating: Option<f64>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_time: Option<String>,
}

/// A normalized restaurant record from one search batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Unique within the batch it was ingested in
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub rating: Option<f64>,
    /// Passed through as received; may be fractional or negative
    pub review_count: Option<f64>,
    pub address: String,
    pub description: String,
    /// Price token such as "$" or "$$$"
    pub price_level: String,
    pub reviews: Vec<Review>,
    pub reservation_link: Option<String>,
    pub google_maps_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub image_url: String,
}

/// How a reservation link is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationKind {
    /// Direct booking through inline.app
    Inline,
    /// Another booking platform (OpenTable, TableCheck)
    Online,
    /// Official website or social page
    Website,
}

impl ReservationKind {
    #[must_use]
    pub fn classify(link: &str) -> Self {
        let lower = link.to_lowercase();
        if lower.contains("inline.app") {
            ReservationKind::Inline
        } else if lower.contains("opentable") || lower.contains("tablecheck") {
            ReservationKind::Online
        } else {
            ReservationKind::Website
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ReservationKind::Inline => "Book on inline",
            ReservationKind::Online => "Book online",
            ReservationKind::Website => "Booking / website",
        }
    }
}

impl Restaurant {
    #[must_use]
    pub fn reservation_kind(&self) -> Option<ReservationKind> {
        self.reservation_link
            .as_deref()
            .map(ReservationKind::classify)
    }

    /// Price level with the card's "$$" fallback
    #[must_use]
    pub fn display_price(&self) -> &str {
        if self.price_level.trim().is_empty() {
            "$$"
        } else {
            &self.price_level
        }
    }

    /// Rating for display; absent or non-finite values render as a dash
    #[must_use]
    pub fn display_rating(&self) -> String {
        match self.rating {
            Some(rating) if rating.is_finite() => format!("{rating:.1}"),
            _ => "-".to_string(),
        }
    }

    /// Review count rounded for display; negative or non-finite counts are
    /// treated as unknown
    #[must_use]
    pub fn display_review_count(&self) -> String {
        match self.review_count {
            Some(count) if count.is_finite() && count >= 0.0 => format!("{:.0}", count.round()),
            _ => "?".to_string(),
        }
    }
}
