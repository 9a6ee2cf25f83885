use std::sync::Arc;

use anyhow::Context;
use reqwest::Client as HttpClient;
use tracing_subscriber::EnvFilter;

use movie_recommender::{
    config::Config,
    db::EmbeddingCache,
    routes::{create_router, AppState},
    services::{
        ingest::{ScrapeIngestor, TranscriptIngestor},
        providers::{OmdbProvider, OpenAiClient, TmdbProvider, WikipediaProvider},
        recommenders::{DiscoveryRecommender, GenerativeRecommender, SimilarityRecommender},
        Embedder, Enricher, RecommendationService, RecommendationStrategy,
    },
};

/// Wires every collaborator from configuration
fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let http_client = HttpClient::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let openai = Arc::new(OpenAiClient::new(
        http_client.clone(),
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        config.openai_model.clone(),
        config.embedding_model.clone(),
    ));
    let omdb = Arc::new(OmdbProvider::new(
        http_client.clone(),
        config.omdb_api_key.clone(),
        config.omdb_url.clone(),
    ));
    let tmdb = Arc::new(TmdbProvider::new(
        http_client.clone(),
        config.tmdb_api_key.clone(),
        config.tmdb_url.clone(),
    ));
    let wikipedia = Arc::new(WikipediaProvider::new(
        http_client,
        config.wikipedia_api_url.clone(),
    ));

    let embedder = Embedder::new(openai.clone());
    let enricher = Enricher::new(omdb.clone(), wikipedia.clone(), openai.clone());
    let discovery = DiscoveryRecommender::new(tmdb.clone());
    let amount = config.amount_of_movies;

    let worst_movies = SimilarityRecommender::new(
        EmbeddingCache::new(&config.worst_movies_cache_path),
        Arc::new(ScrapeIngestor::new(
            config.worst_movies_url.clone(),
            wikipedia,
            embedder.clone(),
        )),
        embedder.clone(),
        amount,
    );
    let subtitles = SimilarityRecommender::new(
        EmbeddingCache::new(&config.subtitles_cache_path),
        Arc::new(TranscriptIngestor::new(
            &config.subtitles_dir,
            config.subtitle_interval_minutes,
            embedder.clone(),
        )),
        embedder,
        amount,
    );

    let recommendations = RecommendationService::new(enricher)
        .with_strategy(RecommendationStrategy::Discovery, Arc::new(discovery.clone()))
        .with_strategy(
            RecommendationStrategy::PureAi,
            Arc::new(GenerativeRecommender::pure(openai.clone(), amount)),
        )
        .with_strategy(
            RecommendationStrategy::AiAssist,
            Arc::new(GenerativeRecommender::assisted(openai, discovery, amount)),
        )
        .with_strategy(RecommendationStrategy::WorstMovie, Arc::new(worst_movies))
        .with_strategy(RecommendationStrategy::Subtitles, Arc::new(subtitles));

    Ok(AppState {
        recommendations: Arc::new(recommendations),
        discovery: tmdb,
        metadata: omdb,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = build_state(&config)?;
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
