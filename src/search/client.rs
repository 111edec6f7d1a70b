use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::{RequestComposer, ResponseExtractor, SearchRequest};
use crate::models::{GeoLocation, Restaurant};
use crate::{FoodGuideError, Result};

/// A remote text-completion backend that can ground answers in map data.
///
/// Implementations perform exactly one call per `generate` and report every
/// failure as [`FoodGuideError::Transport`].
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn generate(&self, request: &SearchRequest) -> Result<String>;
}

/// Runs one end-to-end restaurant search
pub struct RestaurantSearchClient {
    composer: RequestComposer,
    service: Arc<dyn CompletionService>,
}

impl RestaurantSearchClient {
    pub fn new(composer: RequestComposer, service: Arc<dyn CompletionService>) -> Self {
        Self { composer, service }
    }

    /// Search for `category` restaurants near `location`.
    ///
    /// Invalid input fails before any network call. The completion service is
    /// called once; nothing is retried here.
    #[instrument(skip(self, location), fields(location = %location.format_coordinates()))]
    pub async fn search(&self, location: &GeoLocation, category: &str) -> Result<Vec<Restaurant>> {
        let request = self.composer.compose(location, category)?;

        let start_time = Instant::now();
        let text = self.service.generate(&request).await.inspect_err(|e| {
            warn!("Completion call failed after {:.3}s: {}", start_time.elapsed().as_secs_f64(), e);
        })?;

        if text.trim().is_empty() {
            return Err(FoodGuideError::transport("completion service returned no text"));
        }

        let restaurants = ResponseExtractor::extract(&text)?;
        info!(
            "Found {} '{}' restaurants in {:.3}s",
            restaurants.len(),
            category,
            start_time.elapsed().as_secs_f64()
        );
        Ok(restaurants)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Completion service returning canned answers, recording each request
    pub(crate) struct ScriptedService {
        answers: Mutex<Vec<Result<String>>>,
        pub(crate) requests: Mutex<Vec<SearchRequest>>,
    }

    impl ScriptedService {
        pub(crate) fn new(answers: Vec<Result<String>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn generate(&self, request: &SearchRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                return Err(FoodGuideError::transport("no scripted answer left"));
            }
            answers.remove(0)
        }
    }

    fn client(service: Arc<ScriptedService>) -> RestaurantSearchClient {
        RestaurantSearchClient::new(RequestComposer::default(), service)
    }

    #[tokio::test]
    async fn test_search_calls_service_once() {
        let service = Arc::new(ScriptedService::new(vec![Ok(
            "```json\n[{\"name\": \"Fika Fika Cafe\"}]\n```".to_string(),
        )]));
        let restaurants = client(service.clone())
            .search(&GeoLocation::new(25.03, 121.56), "Cafe")
            .await
            .unwrap();

        assert_eq!(restaurants.len(), 1);
        assert_eq!(service.calls(), 1);
        let request = service.requests.lock().unwrap()[0].clone();
        assert_eq!(request.category, "Cafe");
        assert_eq!(request.retrieval.anchor, GeoLocation::new(25.03, 121.56));
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_call() {
        let service = Arc::new(ScriptedService::new(vec![]));
        let err = client(service.clone())
            .search(&GeoLocation::new(120.0, 0.0), "Cafe")
            .await
            .unwrap_err();
        assert!(matches!(err, FoodGuideError::InvalidInput { .. }));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_is_transport_failure() {
        let service = Arc::new(ScriptedService::new(vec![Ok("  \n".to_string())]));
        let err = client(service)
            .search(&GeoLocation::new(25.03, 121.56), "Bar")
            .await
            .unwrap_err();
        assert!(matches!(err, FoodGuideError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let service = Arc::new(ScriptedService::new(vec![
            Err(FoodGuideError::transport("HTTP 503")),
            Ok("```json\n[]\n```".to_string()),
        ]));
        let err = client(service.clone())
            .search(&GeoLocation::new(25.03, 121.56), "BBQ")
            .await
            .unwrap_err();
        assert!(matches!(err, FoodGuideError::Transport { .. }));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_prose_answer_is_malformed() {
        let service = Arc::new(ScriptedService::new(vec![Ok(
            "I found some great places but forgot the JSON.".to_string(),
        )]));
        let err = client(service)
            .search(&GeoLocation::new(25.03, 121.56), "Vegan")
            .await
            .unwrap_err();
        assert!(matches!(err, FoodGuideError::MalformedResponse { .. }));
    }
}
