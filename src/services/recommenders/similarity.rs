use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{
    db::EmbeddingCache,
    error::{AppError, AppResult},
    models::{Candidate, Corpus, UserProfile},
    services::{
        embedding::Embedder,
        ingest::{load_or_ingest, CorpusIngestor},
        recommenders::{CandidateList, Recommender},
        similarity::rank,
    },
};

/// Ranks a pre-built corpus against the embedded user profile
///
/// The corpus is loaded from its cache file on first use, ingesting and saving it
/// when the file does not exist yet, and is kept in memory afterwards. A failed
/// first load is not remembered; the next request tries again.
pub struct SimilarityRecommender {
    cache: EmbeddingCache,
    ingestor: Arc<dyn CorpusIngestor>,
    embedder: Embedder,
    amount: usize,
    corpus: OnceCell<Corpus>,
}

impl SimilarityRecommender {
    pub fn new(
        cache: EmbeddingCache,
        ingestor: Arc<dyn CorpusIngestor>,
        embedder: Embedder,
        amount: usize,
    ) -> Self {
        Self {
            cache,
            ingestor,
            embedder,
            amount,
            corpus: OnceCell::new(),
        }
    }

    async fn corpus(&self) -> AppResult<&Corpus> {
        self.corpus
            .get_or_try_init(|| async {
                let corpus = load_or_ingest(&self.cache, self.ingestor.as_ref()).await?;
                tracing::info!(
                    ingestor = self.ingestor.name(),
                    records = corpus.len(),
                    "Corpus ready"
                );
                Ok::<_, AppError>(corpus)
            })
            .await
    }
}

#[async_trait::async_trait]
impl Recommender for SimilarityRecommender {
    async fn candidates(&self, profile: &UserProfile) -> AppResult<CandidateList> {
        let corpus = self.corpus().await?;
        let query = self.embedder.embed_profile(profile).await?;

        let ranked = rank(&query, corpus, self.amount);
        for hit in &ranked {
            tracing::debug!(key = %hit.key, score = hit.score, "Ranked corpus entry");
        }

        let candidates = ranked
            .iter()
            .map(|hit| Candidate::from_corpus_key(&hit.key))
            .collect();
        Ok(CandidateList::new(candidates))
    }
}
