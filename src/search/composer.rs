//! Builds the outbound restaurant search request.
//!
//! The maps retrieval tool cannot be combined with a JSON response schema, so
//! the schema is spelled out in the prompt and the answer is parsed from text
//! by [`super::extractor`].

use tracing::debug;

use crate::models::GeoLocation;
use crate::{FoodGuideError, Result};

/// How many restaurants the prompt asks for
pub const RESULT_COUNT: usize = 5;

pub const DEFAULT_TEMPERATURE: f32 = 0.4;

pub const DEFAULT_LANGUAGE: &str = "Traditional Chinese";

const RESPONSE_SCHEMA: &str = r#"[
  {
    "name": "string",
    "cuisine": "string",
    "rating": number,
    "reviewCount": number,
    "address": "string",
    "description": "string",
    "priceLevel": "string",
    "reviews": [
      {"author": "string", "rating": 5, "text": "string"}
    ],
    "reservationLink": "string | null",
    "googleMapsUrl": "string"
  }
]"#;

/// Retrieval capability the model is allowed to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalTool {
    GoogleMaps,
}

/// Grounding configuration: which tool, anchored where
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    pub tool: RetrievalTool,
    pub anchor: GeoLocation,
}

/// A fully composed search request, independent of any wire format
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub prompt: String,
    pub category: String,
    pub retrieval: RetrievalConfig,
    pub temperature: f32,
}

/// Pure builder for [`SearchRequest`]s
#[derive(Debug, Clone)]
pub struct RequestComposer {
    language: String,
    temperature: f32,
}

impl Default for RequestComposer {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE, DEFAULT_TEMPERATURE)
    }
}

impl RequestComposer {
    pub fn new<S: Into<String>>(language: S, temperature: f32) -> Self {
        Self {
            language: language.into(),
            temperature,
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Compose a request for `category` restaurants near `location`
    pub fn compose(&self, location: &GeoLocation, category: &str) -> Result<SearchRequest> {
        if category.trim().is_empty() {
            return Err(FoodGuideError::invalid_input("category must not be empty"));
        }
        location.validate()?;

        let prompt = self.build_prompt(location, category);
        debug!(
            "Composed {} byte prompt for '{}' at ({})",
            prompt.len(),
            category,
            location.format_coordinates()
        );

        Ok(SearchRequest {
            prompt,
            category: category.to_string(),
            retrieval: RetrievalConfig {
                tool: RetrievalTool::GoogleMaps,
                anchor: *location,
            },
            temperature: self.temperature,
        })
    }

    fn build_prompt(&self, location: &GeoLocation, category: &str) -> String {
        let language = &self.language;
        format!(
            r#"My current position is latitude: {lat}, longitude: {lng}.
Use Google Maps to find the {count} highest-rated "{category}" restaurants near me.

Write every description and review in {language}.

For each restaurant provide:
1. Name
2. Cuisine type
3. Rating (1-5)
4. Estimated total review count
5. Full address
6. A short, catchy description (in {language})
7. Price level ($, $$, $$$, $$$$)
8. 2-3 summary reviews from customers (in {language}, covering both pros and cons)
9. Reservation link:
   - First choice: a direct booking link on inline (inline.app), OpenTable, TableCheck or a similar platform.
   - Otherwise: the restaurant's official website or its Facebook/Instagram page.
   - Return "null" only when no web link exists at all.
10. Google Maps URL

Always answer the same way for the same question.

IMPORTANT: Output the result ONLY as a valid JSON array inside a ```json code block.
The JSON structure must match this exactly:
{schema}
"#,
            lat = location.lat,
            lng = location.lng,
            count = RESULT_COUNT,
            schema = RESPONSE_SCHEMA,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_request_embeds_category_and_coordinates() {
        let composer = RequestComposer::default();
        let location = GeoLocation::new(25.03, 121.56);
        let request = composer.compose(&location, "Cafe").unwrap();

        assert_eq!(request.category, "Cafe");
        assert_eq!(request.retrieval.anchor, location);
        assert_eq!(request.retrieval.tool, RetrievalTool::GoogleMaps);
        assert!(request.prompt.contains("\"Cafe\""));
        assert!(request.prompt.contains("latitude: 25.03"));
        assert!(request.prompt.contains("longitude: 121.56"));
    }

    #[test]
    fn test_prompt_declares_fence_and_schema() {
        let request = RequestComposer::default()
            .compose(&GeoLocation::new(0.0, 0.0), "Bar")
            .unwrap();
        assert!(request.prompt.contains("```json"));
        assert!(request.prompt.contains("\"reservationLink\""));
        assert!(request.prompt.contains("\"googleMapsUrl\""));
        assert!(request.prompt.contains("5 highest-rated"));
    }

    #[test]
    fn test_language_and_temperature() {
        let composer = RequestComposer::new("English", 0.2);
        let request = composer
            .compose(&GeoLocation::new(48.85, 2.35), "Italian")
            .unwrap();
        assert!(request.prompt.contains("in English"));
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(composer.language(), "English");
    }

    #[test]
    fn test_default_temperature_is_low_but_not_greedy() {
        let request = RequestComposer::default()
            .compose(&GeoLocation::new(1.0, 1.0), "Vegan")
            .unwrap();
        assert!(request.temperature > 0.0 && request.temperature < 1.0);
    }

    #[rstest]
    #[case(25.03, 121.56, "")]
    #[case(25.03, 121.56, "   ")]
    #[case(91.0, 121.56, "Cafe")]
    #[case(25.03, -181.0, "Cafe")]
    #[case(f64::NAN, 0.0, "Cafe")]
    fn test_invalid_input(#[case] lat: f64, #[case] lng: f64, #[case] category: &str) {
        let err = RequestComposer::default()
            .compose(&GeoLocation::new(lat, lng), category)
            .unwrap_err();
        assert!(matches!(err, FoodGuideError::InvalidInput { .. }));
    }
}
