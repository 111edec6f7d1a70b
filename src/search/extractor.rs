//! Turns free-form model text into normalized [`Restaurant`] records.
//!
//! The model is asked to answer with a JSON array inside a ```json fence.
//! Anything that deviates from that contract is a `MalformedResponse`.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Restaurant, Review};
use crate::{FoodGuideError, Result};

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json\b(.*?)```").expect("JSON fence pattern is valid")
});

/// Distinguishes batches ingested within the same millisecond
static BATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

const PLACEHOLDER_TOKENS: [&str; 4] = ["null", "none", "", "n/a"];

const IMAGE_WIDTH: u32 = 400;
const IMAGE_HEIGHT: u32 = 300;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRestaurant {
    name: String,
    cuisine: Option<String>,
    rating: Option<f64>,
    review_count: Option<f64>,
    address: Option<String>,
    description: Option<String>,
    price_level: Option<String>,
    reviews: Option<Vec<RawReview>>,
    reservation_link: Option<Value>,
    google_maps_url: Option<Value>,
    website_url: Option<Value>,
    image_url: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReview {
    author: Option<String>,
    rating: Option<f64>,
    text: Option<String>,
    relative_time: Option<String>,
}

impl From<RawReview> for Review {
    fn from(raw: RawReview) -> Self {
        Self {
            author: raw.author.unwrap_or_default(),
            rating: raw.rating,
            text: raw.text.unwrap_or_default(),
            relative_time: raw.relative_time,
        }
    }
}

/// Parser for the model's fenced JSON answer
pub struct ResponseExtractor;

impl ResponseExtractor {
    /// Extract the restaurant list from raw model text, in answer order
    pub fn extract(text: &str) -> Result<Vec<Restaurant>> {
        let Some(block) = Self::find_json_block(text) else {
            warn!("No ```json block in model response ({} bytes)", text.len());
            debug!("Unparseable model response: {}", text);
            return Err(FoodGuideError::malformed("no fenced JSON block in response"));
        };

        let value: Value = serde_json::from_str(block)
            .map_err(|e| FoodGuideError::malformed(format!("fenced block is not valid JSON: {e}")))?;

        let Value::Array(items) = value else {
            return Err(FoodGuideError::malformed("fenced JSON is not an array"));
        };

        let batch = BATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let stamp = Utc::now().timestamp_millis();

        let restaurants = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let raw: RawRestaurant = serde_json::from_value(item).map_err(|e| {
                    FoodGuideError::malformed(format!("restaurant #{}: {e}", index + 1))
                })?;
                Ok(Self::normalize(raw, format!("rest-{stamp}-{batch}-{index}")))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Extracted {} restaurants from model response", restaurants.len());
        Ok(restaurants)
    }

    /// Content of the first ```json fenced block, trimmed
    #[must_use]
    pub fn find_json_block(text: &str) -> Option<&str> {
        JSON_FENCE
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim())
    }

    /// Keep a link unless it is one of the model's "no value" tokens.
    ///
    /// The comparison is done on a trimmed, lower-cased copy; a kept link is
    /// returned exactly as received.
    #[must_use]
    pub fn normalize_link(value: Option<&Value>) -> Option<String> {
        match value {
            Some(Value::String(link)) => {
                let probe = link.trim().to_lowercase();
                if PLACEHOLDER_TOKENS.contains(&probe.as_str()) {
                    None
                } else {
                    Some(link.clone())
                }
            }
            _ => None,
        }
    }

    /// Deterministic placeholder image seeded by the restaurant name
    #[must_use]
    pub fn placeholder_image_url(name: &str) -> String {
        format!(
            "https://picsum.photos/seed/{}/{IMAGE_WIDTH}/{IMAGE_HEIGHT}",
            urlencoding::encode(name)
        )
    }

    fn normalize(raw: RawRestaurant, id: String) -> Restaurant {
        let image_url = Self::normalize_link(raw.image_url.as_ref())
            .unwrap_or_else(|| Self::placeholder_image_url(&raw.name));

        Restaurant {
            id,
            reservation_link: Self::normalize_link(raw.reservation_link.as_ref()),
            google_maps_url: Self::normalize_link(raw.google_maps_url.as_ref()),
            website_url: Self::normalize_link(raw.website_url.as_ref()),
            image_url,
            name: raw.name,
            cuisine: raw.cuisine.unwrap_or_default(),
            rating: raw.rating,
            review_count: raw.review_count,
            address: raw.address.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            price_level: raw.price_level.unwrap_or_default(),
            reviews: raw
                .reviews
                .unwrap_or_default()
                .into_iter()
                .map(Review::from)
                .collect(),
        }
    }
}
