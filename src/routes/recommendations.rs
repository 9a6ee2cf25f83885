use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{Recommendations, UserProfile},
    routes::AppState,
    services::RecommendationStrategy,
};

/// Handler for `POST /recommend/:strategy`
///
/// Unknown strategy keys are rejected by the path extractor with a 400.
pub async fn recommend(
    State(state): State<AppState>,
    Path(strategy): Path<RecommendationStrategy>,
    Json(profile): Json<UserProfile>,
) -> AppResult<Json<Recommendations>> {
    tracing::info!(strategy = %strategy, "Recommendation requested");
    let recommendations = state.recommendations.recommend(strategy, &profile).await?;
    Ok(Json(recommendations))
}
