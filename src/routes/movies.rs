use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{DiscoveredMovie, OmdbMovie, UserProfile},
    routes::AppState,
    services::recommenders::DiscoveryRecommender,
};

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize)]
pub struct ActorsResponse {
    pub actors: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keyword_ids: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub movies: Vec<DiscoveredMovie>,
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub movie: OmdbMovie,
}

/// Genre names and ids, for building a profile
pub async fn genres(State(state): State<AppState>) -> AppResult<Json<GenresResponse>> {
    let genres = state.discovery.genres().await?;
    Ok(Json(GenresResponse { genres }))
}

/// Currently popular people, for building a profile
pub async fn actors(State(state): State<AppState>) -> AppResult<Json<ActorsResponse>> {
    let actors = state.discovery.popular_people().await?;
    Ok(Json(ActorsResponse { actors }))
}

/// Keyword ids for free-text themes; themes without a match are skipped
pub async fn keywords(
    State(state): State<AppState>,
    Json(themes): Json<Vec<String>>,
) -> AppResult<Json<KeywordsResponse>> {
    let mut keyword_ids = Vec::new();
    for theme in themes.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        match state.discovery.keyword_id(theme).await? {
            Some(id) => keyword_ids.push(id),
            None => tracing::warn!(keyword = %theme, "Keyword not found"),
        }
    }
    Ok(Json(KeywordsResponse { keyword_ids }))
}

/// Raw discovery results for a profile, fallback included
pub async fn discover(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> AppResult<Json<DiscoverResponse>> {
    let movies = DiscoveryRecommender::new(state.discovery.clone())
        .discover(&profile)
        .await?;
    Ok(Json(DiscoverResponse { movies }))
}

/// Metadata lookup for a single title
pub async fn lookup(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<MovieResponse>> {
    match state.metadata.lookup(&title, None).await? {
        Some(movie) => Ok(Json(MovieResponse { movie })),
        None => Err(AppError::NotFound(format!("Movie not found: {}", title))),
    }
}
