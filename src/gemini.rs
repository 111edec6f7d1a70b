//! Gemini `generateContent` client
//!
//! Sends a composed [`SearchRequest`] with the Google Maps retrieval tool
//! enabled and returns the model's text answer.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::GeminiConfig;
use crate::search::{CompletionService, RetrievalTool, SearchRequest};
use crate::{FoodGuideError, Result};

/// Explicit settings for the Gemini client, built once at startup
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// `None` leaves request latency bounded by the service alone
    pub timeout: Option<Duration>,
}

impl GeminiSettings {
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                FoodGuideError::config(
                    "Gemini API key is missing. Set FOODGUIDE_GEMINI__API_KEY or GEMINI_API_KEY.",
                )
            })?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout: (config.timeout_seconds > 0)
                .then(|| Duration::from_secs(config.timeout_seconds.into())),
        })
    }
}

/// HTTP client for the Gemini API
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("FoodGuide/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FoodGuideError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.settings.model, category = %request.category))]
    async fn generate(&self, request: &SearchRequest) -> Result<String> {
        let url = self.endpoint();
        debug!("Gemini API request URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&wire::GenerateContentRequest::from(request))
            .send()
            .await
            .map_err(|e| FoodGuideError::transport(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, error_text);
            return Err(FoodGuideError::transport(format!(
                "Gemini API error {status}"
            )));
        }

        let body: wire::GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| FoodGuideError::transport(format!("Unreadable Gemini response: {e}")))?;

        let text = body.text();
        if text.trim().is_empty() {
            return Err(FoodGuideError::transport(format!(
                "Gemini returned no text (finish reason: {})",
                body.finish_reason().unwrap_or("unknown")
            )));
        }

        let duration = start_time.elapsed();
        info!("Gemini answered in {:.3}s ({} bytes)", duration.as_secs_f64(), text.len());
        if duration.as_secs() > 30 {
            warn!("Slow Gemini response detected: {:.3}s", duration.as_secs_f64());
        }

        Ok(text)
    }
}

/// `generateContent` request and response bodies
mod wire {
    use serde::{Deserialize, Serialize};

    use super::{RetrievalTool, SearchRequest};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerateContentRequest {
        pub contents: Vec<Content>,
        pub tools: Vec<Tool>,
        pub tool_config: ToolConfig,
        pub generation_config: GenerationConfig,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Content {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub role: Option<String>,
        #[serde(default)]
        pub parts: Vec<Part>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Part {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub text: Option<String>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Tool {
        pub google_maps: GoogleMaps,
    }

    #[derive(Debug, Serialize)]
    pub struct GoogleMaps {}

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ToolConfig {
        pub retrieval_config: RetrievalConfig,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RetrievalConfig {
        pub lat_lng: LatLng,
    }

    #[derive(Debug, Serialize)]
    pub struct LatLng {
        pub latitude: f64,
        pub longitude: f64,
    }

    #[derive(Debug, Serialize)]
    pub struct GenerationConfig {
        pub temperature: f32,
    }

    #[derive(Debug, Deserialize)]
    pub struct GenerateContentResponse {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Candidate {
        pub content: Option<Content>,
        pub finish_reason: Option<String>,
    }

    impl From<&SearchRequest> for GenerateContentRequest {
        fn from(request: &SearchRequest) -> Self {
            let tools = match request.retrieval.tool {
                RetrievalTool::GoogleMaps => vec![Tool {
                    google_maps: GoogleMaps {},
                }],
            };

            Self {
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part {
                        text: Some(request.prompt.clone()),
                    }],
                }],
                tools,
                tool_config: ToolConfig {
                    retrieval_config: RetrievalConfig {
                        lat_lng: LatLng {
                            latitude: request.retrieval.anchor.lat,
                            longitude: request.retrieval.anchor.lng,
                        },
                    },
                },
                generation_config: GenerationConfig {
                    temperature: request.temperature,
                },
            }
        }
    }

    impl GenerateContentResponse {
        /// Concatenated text parts of the first candidate
        pub fn text(&self) -> String {
            self.candidates
                .first()
                .and_then(|candidate| candidate.content.as_ref())
                .map(|content| {
                    content
                        .parts
                        .iter()
                        .filter_map(|part| part.text.as_deref())
                        .collect::<String>()
                })
                .unwrap_or_default()
        }

        pub fn finish_reason(&self) -> Option<&str> {
            self.candidates
                .first()
                .and_then(|candidate| candidate.finish_reason.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoLocation;
    use crate::search::RequestComposer;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> GeminiSettings {
        GeminiSettings {
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url,
            timeout: None,
        }
    }

    fn request() -> SearchRequest {
        RequestComposer::default()
            .compose(&GeoLocation::new(25.03, 121.56), "Cafe")
            .unwrap()
    }

    fn answer(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_sends_maps_tool_and_anchor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "tools": [{"googleMaps": {}}],
                "toolConfig": {"retrievalConfig": {"latLng": {"latitude": 25.03, "longitude": 121.56}}},
                "generationConfig": {"temperature": 0.4}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer("```json\n[]\n```")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(settings(server.uri())).unwrap();
        let text = client.generate(&request()).await.unwrap();
        assert_eq!(text, "```json\n[]\n```");
    }

    #[tokio::test]
    async fn test_joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "```json\n"}, {"text": "[]\n```"}]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(settings(format!("{}/", server.uri()))).unwrap();
        let text = client.generate(&request()).await.unwrap();
        assert_eq!(text, "```json\n[]\n```");
    }

    #[tokio::test]
    async fn test_error_status_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(settings(server.uri())).unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, FoodGuideError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_no_candidates_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = GeminiClient::new(settings(server.uri())).unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, FoodGuideError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(answer("```json\n[]\n```"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut settings = settings(server.uri());
        settings.timeout = Some(Duration::from_millis(100));
        let client = GeminiClient::new(settings).unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, FoodGuideError::Transport { .. }));
    }

    #[test]
    fn test_settings_require_api_key() {
        let mut config = GeminiConfig::default();
        config.api_key = None;
        let err = GeminiSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, FoodGuideError::Config { .. }));

        config.api_key = Some("AIza-test-key-123".to_string());
        config.timeout_seconds = 0;
        let settings = GeminiSettings::from_config(&config).unwrap();
        assert!(settings.timeout.is_none());
        assert_eq!(settings.model, "gemini-2.5-flash");
    }
}
