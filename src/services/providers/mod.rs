/// External data and model providers
///
/// Each upstream the recommender depends on sits behind its own trait so the
/// pipeline receives explicitly constructed clients and tests can substitute fakes.
/// Every call is a single round trip with no retry; failures propagate to the caller,
/// which decides whether they are fatal.
use std::collections::BTreeMap;

use crate::{
    error::AppResult,
    models::{DiscoverQuery, DiscoveredMovie, OmdbMovie},
};

pub mod omdb;
pub mod openai;
pub mod tmdb;
pub mod wikipedia;

pub use omdb::OmdbProvider;
pub use openai::OpenAiClient;
pub use tmdb::TmdbProvider;
pub use wikipedia::WikipediaProvider;

/// Structured movie metadata looked up by title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Returns `Ok(None)` when the source has no match for the title (and year, if given)
    async fn lookup(&self, title: &str, year: Option<u16>) -> AppResult<Option<OmdbMovie>>;
}

/// Long-form plot text
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlotSource: Send + Sync {
    async fn fetch_plot(&self, title: &str) -> AppResult<Option<String>>;
}

/// Structured discovery plus the name-to-id lookups needed to build its filters
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DiscoverySource: Send + Sync {
    /// Movies matching the query; an empty list is a valid answer
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<DiscoveredMovie>>;

    /// Genre name to id
    async fn genres(&self) -> AppResult<BTreeMap<String, u64>>;

    /// Popular people, name to id
    async fn popular_people(&self) -> AppResult<BTreeMap<String, u64>>;

    /// Best keyword match for a free-text theme
    async fn keyword_id(&self, keyword: &str) -> AppResult<Option<u64>>;

    /// Best person match for a cast or crew name
    async fn person_id(&self, name: &str) -> AppResult<Option<u64>>;
}

/// Chat-style text completion
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        system_messages: &[String],
        user_message: &str,
        max_tokens: u32,
    ) -> AppResult<String>;
}

/// Text embedding
///
/// Vectors are only comparable when produced by the same model.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Raw page download for scraped corpora
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> AppResult<String>;
}
