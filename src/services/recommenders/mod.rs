/// Candidate-generation strategies
///
/// Every strategy turns a user profile into an ordered list of candidate titles.
/// Enrichment and filtering happen afterwards, in `RecommendationService`.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{Candidate, UserProfile},
};

pub mod discovery;
pub mod generative;
pub mod similarity;

pub use discovery::DiscoveryRecommender;
pub use generative::GenerativeRecommender;
pub use similarity::SimilarityRecommender;

/// Notice surfaced when structured discovery matched nothing at all
pub const NO_MOVIES_FOUND: &str = "No movies found with the given criteria";

/// Candidates in rank order, plus notices to show the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateList {
    pub candidates: Vec<Candidate>,
    pub errors: Vec<String>,
}

impl CandidateList {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            errors: Vec::new(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Ordered candidates for `profile`
    ///
    /// Recoverable problems are reported in `CandidateList::errors`; an `Err` means an
    /// upstream service failed and the whole request should fail with it.
    async fn candidates(&self, profile: &UserProfile) -> AppResult<CandidateList>;
}

/// Strategy selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStrategy {
    /// Structured discovery on profile filters
    Discovery,
    /// Language model with the profile only
    PureAi,
    /// Language model seeded with discovery results
    AiAssist,
    /// Similarity ranking over the scraped worst-films list
    WorstMovie,
    /// Similarity ranking over film transcripts
    Subtitles,
}

impl RecommendationStrategy {
    pub const ALL: [RecommendationStrategy; 5] = [
        RecommendationStrategy::Discovery,
        RecommendationStrategy::PureAi,
        RecommendationStrategy::AiAssist,
        RecommendationStrategy::WorstMovie,
        RecommendationStrategy::Subtitles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStrategy::Discovery => "discovery",
            RecommendationStrategy::PureAi => "pureai",
            RecommendationStrategy::AiAssist => "aiassist",
            RecommendationStrategy::WorstMovie => "worstmovie",
            RecommendationStrategy::Subtitles => "subtitles",
        }
    }
}

impl fmt::Display for RecommendationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_wire_keys() {
        for strategy in RecommendationStrategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy.as_str()));

            let parsed: RecommendationStrategy = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, strategy);
        }
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(serde_json::from_str::<RecommendationStrategy>("\"openai\"").is_err());
        assert!(serde_json::from_str::<RecommendationStrategy>("\"PureAi\"").is_err());
    }

    #[test]
    fn test_candidate_list_with_error() {
        let list = CandidateList::new(vec![Candidate::new("Alien")]).with_error(NO_MOVIES_FOUND);
        assert_eq!(list.candidates.len(), 1);
        assert_eq!(list.errors, vec![NO_MOVIES_FOUND.to_string()]);
    }
}
