use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub mod corpus;
pub mod movie;
pub mod user_profile;

pub use corpus::{CacheRecord, Chunk, Corpus, RankedCandidate, PLOT_CHUNK_KEY};
pub use movie::{split_title_year, Candidate, EnrichedMovie, MovieDetails, Recommendations};
pub use user_profile::UserProfile;

// ============================================================================
// OMDb API Types
// ============================================================================

/// Movie record returned by OMDb for a successful title lookup
///
/// Closed schema: only the fields below are read. `"N/A"` placeholders become `None`
/// and anything else OMDb sends is collected in `unrecognized` for logging.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbMovie {
    pub title: String,
    #[serde(default, deserialize_with = "na_as_none")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub rated: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub released: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub runtime: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub writer: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub actors: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub awards: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default, deserialize_with = "na_as_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID", default, deserialize_with = "na_as_none")]
    pub imdb_id: Option<String>,
    #[serde(flatten, skip_serializing)]
    pub unrecognized: HashMap<String, serde_json::Value>,
}

fn na_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != "N/A"
    }))
}

impl From<OmdbMovie> for MovieDetails {
    fn from(movie: OmdbMovie) -> Self {
        MovieDetails {
            title: movie.title,
            year: movie.year,
            genre: movie.genre,
            director: movie.director,
            actors: movie.actors,
            plot: movie.plot,
            long_plot: None,
            rating: movie.imdb_rating,
            runtime: movie.runtime,
            language: movie.language,
            country: movie.country,
            awards: movie.awards,
            poster: movie.poster,
            reason: None,
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// `{ "id": .., "name": .. }` pairs used by genre, keyword and person endpoints
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TmdbNamedId {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TmdbGenreList {
    pub genres: Vec<TmdbNamedId>,
}

/// Paged TMDB response; only the first page is ever read
#[derive(Debug, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// A movie returned by TMDB discovery
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DiscoveredMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl DiscoveredMovie {
    /// Year part of `release_date` (`"1986-03-21"` -> 1986)
    pub fn release_year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// Title to show a language model; falls back to the localized title
    pub fn seed_title(&self) -> &str {
        if self.original_title.is_empty() {
            &self.title
        } else {
            &self.original_title
        }
    }
}

/// Resolved discovery filters. Ids within a category are OR-ed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub genre_ids: Vec<u64>,
    pub keyword_ids: Vec<u64>,
    pub cast_ids: Vec<u64>,
    pub crew_ids: Vec<u64>,
}

impl DiscoverQuery {
    pub fn is_empty(&self) -> bool {
        self.genre_ids.is_empty()
            && self.keyword_ids.is_empty()
            && self.cast_ids.is_empty()
            && self.crew_ids.is_empty()
    }

    /// Fallback query constrained by actors only
    pub fn cast_only(&self) -> Self {
        Self {
            cast_ids: self.cast_ids.clone(),
            ..Self::default()
        }
    }

    /// Fallback query constrained by themes and genres only
    pub fn themes_and_genres_only(&self) -> Self {
        Self {
            genre_ids: self.genre_ids.clone(),
            keyword_ids: self.keyword_ids.clone(),
            ..Self::default()
        }
    }

    /// Query-string filters, omitting empty categories
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        [
            ("with_genres", &self.genre_ids),
            ("with_keywords", &self.keyword_ids),
            ("with_cast", &self.cast_ids),
            ("with_crew", &self.crew_ids),
        ]
        .into_iter()
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(name, ids)| {
            let joined: Vec<String> = ids.iter().map(u64::to_string).collect();
            (name, joined.join("|"))
        })
        .collect()
    }
}
