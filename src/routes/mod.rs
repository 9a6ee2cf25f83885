use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::{DiscoverySource, MetadataSource},
        RecommendationService,
    },
};

pub mod movies;
pub mod recommendations;

/// Shared handler state; every field is an explicitly constructed collaborator
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
    pub discovery: Arc<dyn DiscoverySource>,
    pub metadata: Arc<dyn MetadataSource>,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend/:strategy", post(recommendations::recommend))
        .route("/movies/genres", get(movies::genres))
        .route("/movies/actors", get(movies::actors))
        .route("/movies/keywords", post(movies::keywords))
        .route("/movies/discover", post(movies::discover))
        .route("/movies/:title", post(movies::lookup))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
