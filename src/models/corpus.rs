use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Chunk key used by corpora that hold a single plot text per item
pub const PLOT_CHUNK_KEY: &str = "plot";

/// A slice of source text together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// All chunks derived for one corpus item
///
/// Keyed by `"plot"` for scraped items and by time-bucket index for transcripts.
/// A record without chunks is kept in the cache but never ranked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheRecord {
    pub chunks: IndexMap<String, Chunk>,
}

impl CacheRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record holding a single chunk under `key`
    pub fn single(key: &str, chunk: Chunk) -> Self {
        let mut record = Self::new();
        record.insert(key, chunk);
        record
    }

    pub fn insert(&mut self, key: &str, chunk: Chunk) {
        self.chunks.insert(key.to_string(), chunk);
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn embeddings(&self) -> impl Iterator<Item = &[f32]> {
        self.chunks.values().map(|c| c.embedding.as_slice())
    }
}

/// Item key (e.g. `"The Matrix (1999)"`) to record
///
/// Iteration order is insertion order, which is page order for scraped corpora and
/// file order once loaded back from the cache. Ranking ties fall back to it.
pub type Corpus = IndexMap<String, CacheRecord>;

/// A corpus item scored against a query vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub key: String,
    pub score: f32,
}
