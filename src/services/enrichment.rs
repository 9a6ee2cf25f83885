use std::sync::Arc;

use crate::{
    models::{Candidate, EnrichedMovie, MovieDetails, UserProfile},
    services::providers::{CompletionService, MetadataSource, PlotSource},
};

/// Long-form plots are cut to this many characters before summarization
pub const LONG_PLOT_MAX_CHARS: usize = 2500;

const SUMMARY_MAX_TOKENS: u32 = 500;
const REASON_MAX_TOKENS: u32 = 200;

/// Resolves a candidate title into a full movie record
///
/// 1. Metadata lookup by title and year. A miss or an error makes the candidate
///    `Invalid` and nothing else runs.
/// 2. Long-form plot lookup, capped at `LONG_PLOT_MAX_CHARS`.
/// 3. Summary of the long plot, or of the metadata plot when there is none.
/// 4. A rationale for the user, unless the candidate already carries one.
///
/// Steps 2 to 4 degrade: a failed call keeps whatever the record had before it.
#[derive(Clone)]
pub struct Enricher {
    metadata: Arc<dyn MetadataSource>,
    plots: Arc<dyn PlotSource>,
    completion: Arc<dyn CompletionService>,
}

impl Enricher {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        plots: Arc<dyn PlotSource>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            metadata,
            plots,
            completion,
        }
    }

    pub async fn enrich(&self, candidate: &Candidate, profile: &UserProfile) -> EnrichedMovie {
        let movie = match self.metadata.lookup(&candidate.title, candidate.year).await {
            Ok(Some(movie)) => movie,
            Ok(None) => {
                return EnrichedMovie::Invalid {
                    title: candidate.title.clone(),
                }
            }
            Err(e) => {
                tracing::error!(title = %candidate.title, error = %e, "Metadata lookup failed");
                return EnrichedMovie::Invalid {
                    title: candidate.title.clone(),
                };
            }
        };

        let mut details = MovieDetails::from(movie);
        details.reason = candidate.reason.clone();
        details.long_plot = self.long_plot(&candidate.title).await;

        let source_plot = details.long_plot.clone().or_else(|| details.plot.clone());
        if let Some(plot) = source_plot {
            details.plot = Some(self.summarize(&candidate.title, &plot).await.unwrap_or(plot));
        }

        if details.reason.is_none() {
            details.reason = self.explain(&details, profile).await;
        }

        EnrichedMovie::Valid(Box::new(details))
    }

    async fn long_plot(&self, title: &str) -> Option<String> {
        match self.plots.fetch_plot(title).await {
            Ok(plot) => plot.map(|p| truncate_chars(&p, LONG_PLOT_MAX_CHARS)),
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "Long plot lookup failed");
                None
            }
        }
    }

    async fn summarize(&self, title: &str, plot: &str) -> Option<String> {
        tracing::debug!(title = %title, "Summarizing plot");
        let system = vec!["You are a helpful assistant that has in-depth movie knowledge.".to_string()];
        let prompt = format!("Summarize the following plot:\n\n{}", plot);

        match self.completion.complete(&system, &prompt, SUMMARY_MAX_TOKENS).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "Plot summary failed, keeping original");
                None
            }
        }
    }

    async fn explain(&self, details: &MovieDetails, profile: &UserProfile) -> Option<String> {
        let system = vec![
            "You are a movie expert that provides compact movie recommendations.".to_string(),
            format!("Movie plot: {}", details.plot.as_deref().unwrap_or("unknown")),
        ];
        let prompt = format!(
            "Explain why the user would like the movie: {}. The plot is provided. \
             Be honest, but keep it short. User profile: {}",
            details.title,
            profile.to_metadata_str()
        );

        match self.completion.complete(&system, &prompt, REASON_MAX_TOKENS).await {
            Ok(reason) => Some(reason),
            Err(e) => {
                tracing::warn!(title = %details.title, error = %e, "Rationale generation failed");
                None
            }
        }
    }
}

/// First `max` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::OmdbMovie;
    use crate::services::providers::{MockCompletionService, MockMetadataSource, MockPlotSource};

    fn omdb_movie(title: &str, plot: Option<&str>) -> OmdbMovie {
        let mut json = serde_json::json!({ "Title": title, "Year": "1986", "Director": "Jim Wynorski" });
        if let Some(plot) = plot {
            json["Plot"] = serde_json::Value::String(plot.to_string());
        }
        serde_json::from_value(json).unwrap()
    }

    fn enricher(
        metadata: MockMetadataSource,
        plots: MockPlotSource,
        completion: MockCompletionService,
    ) -> Enricher {
        Enricher::new(Arc::new(metadata), Arc::new(plots), Arc::new(completion))
    }

    #[tokio::test]
    async fn test_not_found_is_invalid_and_stops() {
        let mut metadata = MockMetadataSource::new();
        metadata.expect_lookup().times(1).returning(|_, _| Ok(None));
        let mut plots = MockPlotSource::new();
        plots.expect_fetch_plot().never();
        let mut completion = MockCompletionService::new();
        completion.expect_complete().never();

        let result = enricher(metadata, plots, completion)
            .enrich(&Candidate::new("Nonexistent Film"), &UserProfile::default())
            .await;

        assert_eq!(
            result,
            EnrichedMovie::Invalid {
                title: "Nonexistent Film".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_error_is_invalid() {
        let mut metadata = MockMetadataSource::new();
        metadata
            .expect_lookup()
            .returning(|_, _| Err(AppError::ExternalApi("503".to_string())));

        let result = enricher(metadata, MockPlotSource::new(), MockCompletionService::new())
            .enrich(&Candidate::new("Alien"), &UserProfile::default())
            .await;

        assert!(!result.is_valid());
    }

    #[tokio::test]
    async fn test_passes_title_and_year_to_lookup() {
        let mut metadata = MockMetadataSource::new();
        metadata
            .expect_lookup()
            .withf(|title, year| title == "Chopping Mall" && *year == Some(1986))
            .returning(|_, _| Ok(None));

        enricher(metadata, MockPlotSource::new(), MockCompletionService::new())
            .enrich(
                &Candidate::from_corpus_key("Chopping Mall (1986)"),
                &UserProfile::default(),
            )
            .await;
    }

    #[tokio::test]
    async fn test_long_plot_is_capped_and_summarized() {
        let long_plot = "x".repeat(LONG_PLOT_MAX_CHARS + 500);

        let mut metadata = MockMetadataSource::new();
        metadata
            .expect_lookup()
            .returning(|_, _| Ok(Some(omdb_movie("Chopping Mall", Some("Short plot.")))));
        let mut plots = MockPlotSource::new();
        let returned = long_plot.clone();
        plots
            .expect_fetch_plot()
            .returning(move |_| Ok(Some(returned.clone())));

        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .withf(|_, prompt, max_tokens| {
                prompt.starts_with("Summarize the following plot:")
                    && prompt.len() == "Summarize the following plot:\n\n".len() + LONG_PLOT_MAX_CHARS
                    && *max_tokens == 500
            })
            .times(1)
            .returning(|_, _, _| Ok("Robots hunt teens.".to_string()));

        let details = enricher(metadata, plots, completion)
            .enrich(
                &Candidate::new("Chopping Mall").with_reason("Given by the strategy"),
                &UserProfile::default(),
            )
            .await
            .into_details()
            .unwrap();

        assert_eq!(details.plot.as_deref(), Some("Robots hunt teens."));
        assert_eq!(details.long_plot.map(|p| p.len()), Some(LONG_PLOT_MAX_CHARS));
        assert_eq!(details.reason.as_deref(), Some("Given by the strategy"));
        assert_eq!(details.director.as_deref(), Some("Jim Wynorski"));
    }

    #[tokio::test]
    async fn test_short_plot_used_and_reason_generated() {
        let mut metadata = MockMetadataSource::new();
        metadata
            .expect_lookup()
            .returning(|_, _| Ok(Some(omdb_movie("Chopping Mall", Some("Short plot.")))));
        let mut plots = MockPlotSource::new();
        plots.expect_fetch_plot().returning(|_| Ok(None));

        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .withf(|_, prompt, _| prompt == "Summarize the following plot:\n\nShort plot.")
            .times(1)
            .returning(|_, _, _| Ok("Summary.".to_string()));
        completion
            .expect_complete()
            .withf(|system, prompt, max_tokens| {
                system.len() == 2
                    && system[1] == "Movie plot: Summary."
                    && prompt.contains("Chopping Mall")
                    && prompt.contains("themes -> ['Space', 'Love', 'Action']")
                    && *max_tokens == 200
            })
            .times(1)
            .returning(|_, _, _| Ok("You like robots.".to_string()));

        let details = enricher(metadata, plots, completion)
            .enrich(&Candidate::new("Chopping Mall"), &UserProfile::default())
            .await
            .into_details()
            .unwrap();

        assert_eq!(details.plot.as_deref(), Some("Summary."));
        assert_eq!(details.long_plot, None);
        assert_eq!(details.reason.as_deref(), Some("You like robots."));
    }

    #[tokio::test]
    async fn test_downstream_failures_degrade() {
        let mut metadata = MockMetadataSource::new();
        metadata
            .expect_lookup()
            .returning(|_, _| Ok(Some(omdb_movie("Alien", Some("In space.")))));
        let mut plots = MockPlotSource::new();
        plots
            .expect_fetch_plot()
            .returning(|_| Err(AppError::ExternalApi("wiki down".to_string())));
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .times(2)
            .returning(|_, _, _| Err(AppError::ExternalApi("model down".to_string())));

        let result = enricher(metadata, plots, completion)
            .enrich(&Candidate::new("Alien"), &UserProfile::default())
            .await;

        let details = result.into_details().unwrap();
        assert_eq!(details.plot.as_deref(), Some("In space."));
        assert_eq!(details.reason, None);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
