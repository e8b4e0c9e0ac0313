use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::request_id::RequestId;
use crate::models::ScoredTitle;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    #[serde(default)]
    pub movie: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub loaded: bool,
    pub movies_loaded: usize,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = state.health().await;
    let response = HealthResponse {
        status: if health.loaded { "healthy" } else { "loading" },
        loaded: health.loaded,
        movies_loaded: health.count,
    };
    (StatusCode::OK, Json(response))
}

/// Get all movie titles in catalog order
pub async fn list_movies(State(state): State<AppState>) -> Json<Vec<String>> {
    let titles = match state.recommender().await {
        Some(recommender) => recommender.list_titles(),
        None => Vec::new(),
    };
    Json(titles)
}

/// Search titles by case-insensitive substring
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    let results = match state.recommender().await {
        Some(recommender) => recommender.search(&params.q, state.limits.search_limit),
        None => Vec::new(),
    };
    Json(results)
}

/// Recommend titles similar to the given movie
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> Json<Vec<String>> {
    let Some(recommender) = state.recommender().await else {
        tracing::warn!(request_id = %request_id, "Recommendation requested before index loaded");
        return Json(Vec::new());
    };

    let titles = recommender.recommend(&params.movie, state.limits.recommendation_count);
    tracing::info!(
        request_id = %request_id,
        movie = %params.movie,
        results = titles.len(),
        "Recommendations served"
    );
    Json(titles)
}

/// Recommend titles similar to the given movie, with similarity scores.
///
/// Unlike `recommend`, an unknown title is reported as 404.
pub async fn recommend_scored(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<Vec<ScoredTitle>>> {
    let Some(recommender) = state.recommender().await else {
        return Ok(Json(Vec::new()));
    };
    let results =
        recommender.try_recommend_scored(&params.movie, state.limits.recommendation_count)?;
    Ok(Json(results))
}
