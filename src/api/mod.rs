use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    FoodGuideError,
    models::{CuisineCategory, GeoLocation, Restaurant},
    search::RestaurantSearchClient,
};

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<RestaurantSearchClient>,
}

#[derive(Deserialize)]
pub struct RestaurantQuery {
    pub lat: f64,
    pub lng: f64,
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct ApiCategory {
    pub name: &'static str,
    pub default: bool,
}

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
}

/// Maps search failures to HTTP statuses without leaking their details
pub struct ApiError(FoodGuideError);

impl From<FoodGuideError> for ApiError {
    fn from(err: FoodGuideError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FoodGuideError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            FoodGuideError::Transport { .. } | FoodGuideError::MalformedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status != StatusCode::BAD_REQUEST {
            warn!("Restaurant search failed: {}", self.0);
        }
        let body = ApiErrorBody {
            error: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/restaurants", get(get_restaurants))
        .with_state(state)
}

async fn get_categories() -> Json<Vec<ApiCategory>> {
    let categories = CuisineCategory::ALL
        .iter()
        .map(|category| ApiCategory {
            name: category.as_str(),
            default: *category == CuisineCategory::default(),
        })
        .collect();
    Json(categories)
}

async fn get_restaurants(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let category = match query.category.as_deref() {
        Some(name) => name.parse::<CuisineCategory>()?,
        None => CuisineCategory::default(),
    };
    let location = GeoLocation::new(query.lat, query.lng);

    let restaurants = state.client.search(&location, category.as_str()).await?;
    Ok(Json(restaurants))
}
