use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Chunk, UserProfile},
    services::providers::EmbeddingService,
};

/// Turns text into vectors through the configured embedding service
///
/// No caching happens here; corpora persist their chunks through `EmbeddingCache`.
/// Service failures are returned as-is and the caller decides whether to abort.
#[derive(Clone)]
pub struct Embedder {
    service: Arc<dyn EmbeddingService>,
}

impl Embedder {
    pub fn new(service: Arc<dyn EmbeddingService>) -> Self {
        Self { service }
    }

    pub async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        self.service.embed(text).await
    }

    /// Embeds `text` and keeps it alongside its vector
    pub async fn embed_chunk(&self, text: String) -> AppResult<Chunk> {
        let embedding = self.embed(&text).await?;
        Ok(Chunk { text, embedding })
    }

    /// Query vector for a user profile, built from its metadata string
    pub async fn embed_profile(&self, profile: &UserProfile) -> AppResult<Vec<f32>> {
        self.embed(&profile.to_metadata_str()).await
    }
}
