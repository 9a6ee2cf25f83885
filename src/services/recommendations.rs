use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{EnrichedMovie, Recommendations, UserProfile},
    services::{
        enrichment::Enricher,
        recommenders::{RecommendationStrategy, Recommender},
    },
};

/// Generates enriched recommendations for a user profile
///
/// The selected strategy proposes candidates, each candidate is enriched in turn,
/// and only the ones that resolved to real movies are returned, keyed and ordered
/// as the strategy ranked them. An invalid candidate never fails its siblings.
pub struct RecommendationService {
    enricher: Enricher,
    strategies: HashMap<RecommendationStrategy, Arc<dyn Recommender>>,
}

impl RecommendationService {
    pub fn new(enricher: Enricher) -> Self {
        Self {
            enricher,
            strategies: HashMap::new(),
        }
    }

    pub fn with_strategy(
        mut self,
        strategy: RecommendationStrategy,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        self.strategies.insert(strategy, recommender);
        self
    }

    pub async fn recommend(
        &self,
        strategy: RecommendationStrategy,
        profile: &UserProfile,
    ) -> AppResult<Recommendations> {
        let recommender = self.strategies.get(&strategy).ok_or_else(|| {
            AppError::InvalidInput(format!("Strategy `{}` is not available", strategy))
        })?;

        let list = recommender.candidates(profile).await?;
        tracing::info!(
            strategy = %strategy,
            candidates = list.candidates.len(),
            "Enriching candidates"
        );

        let mut result = Recommendations {
            movies: Vec::with_capacity(list.candidates.len()),
            errors: list.errors,
        };
        let mut seen = HashSet::new();

        for candidate in &list.candidates {
            if !seen.insert(candidate.key.as_str()) {
                continue;
            }
            match self.enricher.enrich(candidate, profile).await {
                EnrichedMovie::Valid(details) => {
                    result.movies.push((candidate.key.clone(), *details));
                }
                EnrichedMovie::Invalid { title } => {
                    tracing::warn!(title = %title, "No data available for movie, dropping it");
                }
            }
        }

        tracing::info!(
            strategy = %strategy,
            recommended = result.movies.len(),
            "Recommendations ready"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, OmdbMovie};
    use crate::services::providers::{MockCompletionService, MockMetadataSource, MockPlotSource};
    use crate::services::recommenders::{CandidateList, MockRecommender};

    fn enricher() -> Enricher {
        let mut metadata = MockMetadataSource::new();
        metadata.expect_lookup().returning(|title, _| {
            if title == "Nonexistent Film" {
                return Ok(None);
            }
            let movie: OmdbMovie =
                serde_json::from_value(serde_json::json!({ "Title": title, "Plot": "A plot." }))
                    .unwrap();
            Ok(Some(movie))
        });
        let mut plots = MockPlotSource::new();
        plots.expect_fetch_plot().returning(|_| Ok(None));
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .returning(|_, _, _| Ok("Generated.".to_string()));

        Enricher::new(Arc::new(metadata), Arc::new(plots), Arc::new(completion))
    }

    #[tokio::test]
    async fn test_keeps_only_valid_candidates_in_order() {
        let mut recommender = MockRecommender::new();
        recommender.expect_candidates().returning(|_| {
            Ok(CandidateList {
                candidates: vec![
                    Candidate::new("Solaris").with_reason("Slow space."),
                    Candidate::new("Nonexistent Film"),
                    Candidate::from_corpus_key("Alien (1979)"),
                    Candidate::new("Solaris"),
                ],
                errors: vec!["partial".to_string()],
            })
        });

        let service = RecommendationService::new(enricher())
            .with_strategy(RecommendationStrategy::PureAi, Arc::new(recommender));
        let result = service
            .recommend(RecommendationStrategy::PureAi, &UserProfile::default())
            .await
            .unwrap();

        assert_eq!(result.keys(), vec!["Solaris", "Alien (1979)"]);
        assert_eq!(
            result.get("Solaris").and_then(|m| m.reason.as_deref()),
            Some("Slow space.")
        );
        assert_eq!(
            result.get("Alien (1979)").and_then(|m| m.reason.as_deref()),
            Some("Generated.")
        );
        assert_eq!(result.errors, vec!["partial".to_string()]);
    }

    #[tokio::test]
    async fn test_unregistered_strategy_is_invalid_input() {
        let service = RecommendationService::new(enricher());
        let result = service
            .recommend(RecommendationStrategy::Subtitles, &UserProfile::default())
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_strategy_failure_propagates() {
        let mut recommender = MockRecommender::new();
        recommender
            .expect_candidates()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));

        let service = RecommendationService::new(enricher())
            .with_strategy(RecommendationStrategy::WorstMovie, Arc::new(recommender));
        let result = service
            .recommend(RecommendationStrategy::WorstMovie, &UserProfile::default())
            .await;
        assert!(result.is_err());
    }
}
