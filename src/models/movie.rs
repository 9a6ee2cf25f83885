use serde::{ser::SerializeMap, Serialize, Serializer};

/// A title proposed by a candidate-generation strategy, not yet enriched
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Key the enriched movie is returned under
    pub key: String,
    pub title: String,
    pub year: Option<u16>,
    /// Rationale supplied by the strategy itself, if any
    pub reason: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            key: title.clone(),
            title,
            year: None,
            reason: None,
        }
    }

    /// Builds a candidate from a corpus key shaped like `Title (Year)`
    pub fn from_corpus_key(key: &str) -> Self {
        let (title, year) = split_title_year(key);
        Self {
            key: key.to_string(),
            title,
            year,
            reason: None,
        }
    }

    pub fn with_year(mut self, year: Option<u16>) -> Self {
        self.year = year;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Splits `"The Matrix (1999)"` into `("The Matrix", Some(1999))`
///
/// Keys without a trailing numeric parenthesis are returned whole with no year.
pub fn split_title_year(key: &str) -> (String, Option<u16>) {
    let trimmed = key.trim();
    if let (Some(open), true) = (trimmed.rfind('('), trimmed.ends_with(')')) {
        let inner = trimmed[open + 1..trimmed.len() - 1].trim();
        if let Ok(year) = inner.parse::<u16>() {
            return (trimmed[..open].trim().to_string(), Some(year));
        }
    }
    (trimmed.to_string(), None)
}

/// Fully resolved metadata for a recommended movie
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct MovieDetails {
    pub title: String,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    /// Working plot; summarized when the summary call succeeded
    pub plot: Option<String>,
    /// Long-form plot from the secondary source, already length-capped
    pub long_plot: Option<String>,
    pub rating: Option<String>,
    pub runtime: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub awards: Option<String>,
    pub poster: Option<String>,
    pub reason: Option<String>,
}

/// Outcome of enriching one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichedMovie {
    Valid(Box<MovieDetails>),
    /// Metadata lookup failed; nothing but the requested title is known
    Invalid { title: String },
}

impl EnrichedMovie {
    pub fn is_valid(&self) -> bool {
        matches!(self, EnrichedMovie::Valid(_))
    }

    pub fn into_details(self) -> Option<MovieDetails> {
        match self {
            EnrichedMovie::Valid(details) => Some(*details),
            EnrichedMovie::Invalid { .. } => None,
        }
    }
}

/// Valid movies keyed by candidate key, in candidate order, plus notices for the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub movies: Vec<(String, MovieDetails)>,
    pub errors: Vec<String>,
}

impl Recommendations {
    pub fn get(&self, key: &str) -> Option<&MovieDetails> {
        self.movies.iter().find(|(k, _)| k == key).map(|(_, m)| m)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.movies.iter().map(|(k, _)| k.as_str()).collect()
    }
}

struct MovieMap<'a>(&'a [(String, MovieDetails)]);

impl Serialize for MovieMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, movie) in self.0 {
            map.serialize_entry(key, movie)?;
        }
        map.end()
    }
}

impl Serialize for Recommendations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("recommendations", &MovieMap(&self.movies))?;
        map.serialize_entry("errors", &self.errors)?;
        map.end()
    }
}
