/// Corpus ingestion
///
/// An ingestor turns raw source material into embedded cache records. Ingestion runs
/// once per corpus: its output is saved through `EmbeddingCache` and reused until the
/// cache file is deleted by hand. A failure on one item is logged and that item is
/// skipped; only failures to reach the source at all abort ingestion.
use crate::{db::EmbeddingCache, error::AppResult, models::Corpus};

pub mod scrape;
pub mod transcripts;

pub use scrape::ScrapeIngestor;
pub use transcripts::TranscriptIngestor;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CorpusIngestor: Send + Sync {
    /// Builds the full corpus from source
    async fn ingest(&self) -> AppResult<Corpus>;

    /// Ingestor name for logging
    fn name(&self) -> &'static str;
}

/// Loads the cached corpus, or ingests and saves it when no cache file exists
pub async fn load_or_ingest(
    cache: &EmbeddingCache,
    ingestor: &dyn CorpusIngestor,
) -> AppResult<Corpus> {
    if cache.exists().await {
        return Ok(cache.load().await);
    }

    tracing::info!(
        ingestor = ingestor.name(),
        path = %cache.path().display(),
        "No embedding cache found, ingesting corpus"
    );

    let corpus = ingestor.ingest().await?;

    if !cache.save(&corpus).await {
        tracing::warn!(
            ingestor = ingestor.name(),
            "Corpus built but not persisted; it will be rebuilt next run"
        );
    }

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{CacheRecord, Chunk, PLOT_CHUNK_KEY};

    fn corpus() -> Corpus {
        let mut corpus = Corpus::new();
        corpus.insert(
            "Troll 2 (1990)".to_string(),
            CacheRecord::single(
                PLOT_CHUNK_KEY,
                Chunk {
                    text: "Nilbog".to_string(),
                    embedding: vec![1.0, 0.0],
                },
            ),
        );
        corpus
    }

    #[tokio::test]
    async fn test_ingests_and_saves_when_cache_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path().join("corpus.json"));

        let mut ingestor = MockCorpusIngestor::new();
        ingestor.expect_name().return_const("test");
        ingestor.expect_ingest().times(1).returning(|| Ok(corpus()));

        let loaded = load_or_ingest(&cache, &ingestor).await.unwrap();
        assert_eq!(loaded, corpus());
        assert_eq!(cache.load().await, corpus());
    }

    #[tokio::test]
    async fn test_existing_cache_skips_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path().join("corpus.json"));
        assert!(cache.save(&corpus()).await);

        let mut ingestor = MockCorpusIngestor::new();
        ingestor.expect_name().return_const("test");
        ingestor.expect_ingest().never();

        let loaded = load_or_ingest(&cache, &ingestor).await.unwrap();
        assert_eq!(loaded, corpus());
    }

    #[tokio::test]
    async fn test_ingestion_failure_propagates_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path().join("corpus.json"));

        let mut ingestor = MockCorpusIngestor::new();
        ingestor.expect_name().return_const("test");
        ingestor
            .expect_ingest()
            .returning(|| Err(AppError::ExternalApi("page down".to_string())));

        let result = load_or_ingest(&cache, &ingestor).await;
        assert!(result.is_err());
        assert!(!cache.exists().await);
    }
}
