use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Candidate, DiscoverQuery, DiscoveredMovie, UserProfile},
    services::{
        providers::DiscoverySource,
        recommenders::{CandidateList, Recommender, NO_MOVIES_FOUND},
    },
};

/// Structured discovery against the movie database
///
/// Profile entries are resolved to ids first: genres through the genre list,
/// themes through keyword search, actors and directors through person search.
/// Entries that are already numeric are taken as ids. Names that resolve to
/// nothing are logged and left out of the query.
#[derive(Clone)]
pub struct DiscoveryRecommender {
    source: Arc<dyn DiscoverySource>,
}

impl DiscoveryRecommender {
    pub fn new(source: Arc<dyn DiscoverySource>) -> Self {
        Self { source }
    }

    /// Resolves profile names into discovery filter ids
    pub async fn resolve_query(&self, profile: &UserProfile) -> AppResult<DiscoverQuery> {
        let mut query = DiscoverQuery::default();

        let genres = profile.active_genres();
        if !genres.is_empty() {
            let known = self.source.genres().await?;
            for genre in genres {
                let id = parse_id(genre).or_else(|| {
                    known
                        .iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(genre))
                        .map(|(_, id)| *id)
                });
                match id {
                    Some(id) => query.genre_ids.push(id),
                    None => tracing::warn!(genre = %genre, "Unknown genre"),
                }
            }
        }

        for theme in profile.active_themes() {
            match self.source.keyword_id(theme).await? {
                Some(id) => query.keyword_ids.push(id),
                None => tracing::warn!(keyword = %theme, "Keyword not found"),
            }
        }

        for actor in profile.active_actors() {
            if let Some(id) = self.person(actor).await? {
                query.cast_ids.push(id);
            }
        }

        for director in profile.active_directors() {
            if let Some(id) = self.person(director).await? {
                query.crew_ids.push(id);
            }
        }

        Ok(query)
    }

    async fn person(&self, name: &str) -> AppResult<Option<u64>> {
        if let Some(id) = parse_id(name) {
            return Ok(Some(id));
        }
        let id = self.source.person_id(name).await?;
        if id.is_none() {
            tracing::warn!(person = %name, "Person not found");
        }
        Ok(id)
    }

    /// Discovered movies for `profile`, in the order the source ranks them
    ///
    /// When the combined query matches nothing, the profile is split into a
    /// cast-only query and a themes-and-genres query. Both run once and their
    /// results are merged, first occurrence wins. There is no further fallback.
    pub async fn discover(&self, profile: &UserProfile) -> AppResult<Vec<DiscoveredMovie>> {
        let query = self.resolve_query(profile).await?;
        tracing::debug!(?query, "Running discovery");

        let movies = self.source.discover(&query).await?;
        if !movies.is_empty() {
            return Ok(movies);
        }

        tracing::info!("Combined discovery query matched nothing, splitting profile");
        let by_cast = self.source.discover(&query.cast_only()).await?;
        let by_themes = self.source.discover(&query.themes_and_genres_only()).await?;

        Ok(merge_unique(by_cast, by_themes))
    }
}

fn parse_id(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn merge_unique(first: Vec<DiscoveredMovie>, second: Vec<DiscoveredMovie>) -> Vec<DiscoveredMovie> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|movie| seen.insert(movie.id))
        .collect()
}

#[async_trait::async_trait]
impl Recommender for DiscoveryRecommender {
    async fn candidates(&self, profile: &UserProfile) -> AppResult<CandidateList> {
        let movies = self.discover(profile).await?;
        if movies.is_empty() {
            return Ok(CandidateList::default().with_error(NO_MOVIES_FOUND));
        }

        let candidates = movies
            .iter()
            .map(|movie| Candidate::new(movie.title.as_str()).with_year(movie.release_year()))
            .collect();
        Ok(CandidateList::new(candidates))
    }
}
