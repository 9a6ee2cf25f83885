use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::models::Corpus;

/// JSON file holding one corpus of embedded chunks
///
/// Single-process, single-writer: there is no locking, so two processes saving the
/// same file race. Entries are never refreshed; delete the file to rebuild the corpus.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    path: PathBuf,
}

impl EmbeddingCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Loads the corpus, or an empty one if the file is missing or unparsable
    pub async fn load(&self) -> Corpus {
        match self.read().await {
            Ok(corpus) => {
                tracing::debug!(
                    path = %self.path.display(),
                    items = corpus.len(),
                    "Loaded embedding cache"
                );
                corpus
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to load embedding cache, starting empty"
                );
                Corpus::new()
            }
        }
    }

    /// Writes the corpus as pretty-printed UTF-8 JSON, creating parent directories
    ///
    /// Returns `false` instead of failing when the write does not succeed.
    pub async fn save(&self, corpus: &Corpus) -> bool {
        match self.write(corpus).await {
            Ok(()) => {
                tracing::info!(
                    path = %self.path.display(),
                    items = corpus.len(),
                    "Saved embedding cache"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to save embedding cache"
                );
                false
            }
        }
    }

    async fn read(&self) -> AppResult<Corpus> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::CacheIo(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| AppError::CacheIo(e.to_string()))
    }

    async fn write(&self, corpus: &Corpus) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::CacheIo(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(corpus)
            .map_err(|e| AppError::CacheIo(format!("Cache serialization error: {}", e)))?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::CacheIo(e.to_string()))
    }
}
