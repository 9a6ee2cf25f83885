use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{user_profile::render_list, Candidate, UserProfile},
    services::{
        providers::CompletionService,
        recommenders::{CandidateList, DiscoveryRecommender, Recommender, NO_MOVIES_FOUND},
    },
};

pub const MOVIE_LIST_MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str =
    "You are a movie expert that provides detailed movie recommendations in JSON format.";

#[derive(Debug, Deserialize)]
struct GeneratedList {
    #[serde(default)]
    movies: Vec<GeneratedMovie>,
}

/// Both fields are required; one incomplete item fails the whole list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedMovie {
    pub title: String,
    pub explanation: String,
}

/// Prompt asking for at least `amount` movies as `{"movies": [{"title", "explanation"}]}`
///
/// `seeds` are titles the model may keep, replace or extend.
pub fn build_prompt(profile: &UserProfile, seeds: &[String], amount: usize) -> String {
    let mut prompt = format!(
        "The user likes movies with the following genres: {}. \
         Their favorite themes are: {}. \
         They enjoy movies with actors like: {}. \
         Their favorite directors are: {}. \
         Recently, they watched: {}. DO NOT recommend these movies again. \
         Other comments: {}. ",
        render_list(&profile.genres),
        render_list(&profile.themes),
        render_list(&profile.actors),
        render_list(&profile.directors),
        render_list(&profile.recent_watches),
        profile.other_comments,
    );

    if !seeds.is_empty() {
        prompt.push_str(&format!(
            "Currently we have this list of movies: [{}]. \
             You are allowed to modify the list of movies if you think it will help the user. \
             Additionally, add extra movies if the list is not exhaustive enough yet. ",
            seeds.join(", ")
        ));
    }

    prompt.push_str(&format!(
        "Return a list of movies that the user would like, taking all preferences into account where possible. \
         Return the list in JSON format with the title (in english) and a 3-sentence HONEST explanation \
         why the user would like this movie. \
         Example format: {{\"movies\": [{{\"title\": \"Movie title\", \"explanation\": \"Explanation why user would like this movie.\"}}]}} \
         Recommend at least {} movies. Be creative in recommendations, honest in explanations",
        amount
    ));

    prompt
}

/// Parses the model's movie list
///
/// Text around the outermost JSON object (such as a code fence) is ignored. An object
/// without a `movies` key is an empty list. Any item without a `title` or
/// `explanation` rejects the whole list.
pub fn parse_recommendations(raw: &str) -> AppResult<Vec<GeneratedMovie>> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(AppError::MalformedResponse(
            "No JSON object in model output".to_string(),
        ));
    };
    if end < start {
        return Err(AppError::MalformedResponse(
            "No JSON object in model output".to_string(),
        ));
    }

    let list: GeneratedList = serde_json::from_str(&raw[start..=end])
        .map_err(|e| AppError::MalformedResponse(e.to_string()))?;
    Ok(list.movies)
}

/// Language-model candidates, optionally seeded with discovery results
pub struct GenerativeRecommender {
    completion: Arc<dyn CompletionService>,
    seeds: Option<DiscoveryRecommender>,
    amount: usize,
}

impl GenerativeRecommender {
    /// Prompt built from the profile alone
    pub fn pure(completion: Arc<dyn CompletionService>, amount: usize) -> Self {
        Self {
            completion,
            seeds: None,
            amount,
        }
    }

    /// Prompt that also lists what structured discovery found
    pub fn assisted(
        completion: Arc<dyn CompletionService>,
        discovery: DiscoveryRecommender,
        amount: usize,
    ) -> Self {
        Self {
            completion,
            seeds: Some(discovery),
            amount,
        }
    }

    async fn seed_titles(&self, profile: &UserProfile, errors: &mut Vec<String>) -> AppResult<Vec<String>> {
        let Some(discovery) = &self.seeds else {
            return Ok(Vec::new());
        };

        let movies = discovery.discover(profile).await?;
        if movies.is_empty() {
            tracing::info!("No discovery seeds, prompting from the profile alone");
            errors.push(NO_MOVIES_FOUND.to_string());
        }
        Ok(movies.iter().map(|m| m.seed_title().to_string()).collect())
    }
}

#[async_trait::async_trait]
impl Recommender for GenerativeRecommender {
    async fn candidates(&self, profile: &UserProfile) -> AppResult<CandidateList> {
        let mut errors = Vec::new();
        let seeds = self.seed_titles(profile, &mut errors).await?;

        let prompt = build_prompt(profile, &seeds, self.amount);
        let raw = self
            .completion
            .complete(&[SYSTEM_PROMPT.to_string()], &prompt, MOVIE_LIST_MAX_TOKENS)
            .await?;

        let movies = match parse_recommendations(&raw) {
            Ok(movies) => movies,
            Err(e) => {
                tracing::error!(error = %e, "Could not parse generated recommendations");
                errors.push(format!(
                    "An error occurred while parsing the recommendations: {}. Please try again!",
                    e
                ));
                return Ok(CandidateList {
                    candidates: Vec::new(),
                    errors,
                });
            }
        };

        let mut seen = HashSet::new();
        let candidates = movies
            .into_iter()
            .filter(|movie| seen.insert(movie.title.clone()))
            .map(|movie| Candidate::new(movie.title).with_reason(movie.explanation))
            .collect();

        Ok(CandidateList { candidates, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscoveredMovie;
    use crate::services::providers::{MockCompletionService, MockDiscoverySource};

    fn space_and_love() -> UserProfile {
        UserProfile {
            genres: vec![],
            themes: vec!["Space".to_string(), "Love".to_string()],
            actors: vec![],
            directors: vec![],
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_build_prompt_without_seeds() {
        let prompt = build_prompt(&space_and_love(), &[], 5);

        assert!(prompt.contains("Their favorite themes are: ['Space', 'Love']."));
        assert!(prompt.contains("Recently, they watched: ['Chopping Mall']. DO NOT recommend these movies again."));
        assert!(prompt.contains("Other comments: I like movies with robots."));
        assert!(prompt.contains(r#"{"movies": [{"title": "Movie title""#));
        assert!(prompt.contains("Recommend at least 5 movies."));
        assert!(!prompt.contains("Currently we have this list"));
    }

    #[test]
    fn test_build_prompt_with_seeds() {
        let seeds = vec!["Alien".to_string(), "Solaris".to_string()];
        let prompt = build_prompt(&space_and_love(), &seeds, 8);

        assert!(prompt.contains("Currently we have this list of movies: [Alien, Solaris]."));
        assert!(prompt.contains("Recommend at least 8 movies."));
    }

    #[test]
    fn test_parse_recommendations() {
        let raw = "```json\n{\"movies\": [{\"title\": \"Interstellar\", \"explanation\": \"Space and love.\"}]}\n```";
        let movies = parse_recommendations(raw).unwrap();
        assert_eq!(
            movies,
            vec![GeneratedMovie {
                title: "Interstellar".to_string(),
                explanation: "Space and love.".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_rejects_incomplete_item() {
        let raw = r#"{"movies": [
            {"title": "Interstellar", "explanation": "Space and love."},
            {"title": "WALL-E"}
        ]}"#;
        assert!(matches!(
            parse_recommendations(raw),
            Err(AppError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_recommendations("Sorry, I cannot help with that.").is_err());
        assert!(parse_recommendations("} nope {").is_err());
        assert!(parse_recommendations(r#"{"movies": "Interstellar"}"#).is_err());
    }

    #[test]
    fn test_parse_object_without_movies_is_empty() {
        assert!(parse_recommendations("{}").unwrap().is_empty());
        assert!(parse_recommendations(r#"{"films": []}"#).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pure_scenario_space_and_love() {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .withf(|system, prompt, max_tokens| {
                system.len() == 1
                    && prompt.contains("['Space', 'Love']")
                    && prompt.contains("Recommend at least 5 movies")
                    && *max_tokens == MOVIE_LIST_MAX_TOKENS
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(r#"{"movies": [
                    {"title": "Interstellar", "explanation": "Space and love."},
                    {"title": "WALL-E", "explanation": "Robots in love."}
                ]}"#
                .to_string())
            });

        let list = GenerativeRecommender::pure(Arc::new(completion), 5)
            .candidates(&space_and_love())
            .await
            .unwrap();

        assert_eq!(
            list.candidates,
            vec![
                Candidate::new("Interstellar").with_reason("Space and love."),
                Candidate::new("WALL-E").with_reason("Robots in love."),
            ]
        );
        assert!(list.errors.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_output_is_empty_with_notice() {
        let mut completion = MockCompletionService::new();
        completion.expect_complete().returning(|_, _, _| {
            Ok(r#"{"movies": [{"title": "Interstellar"}]}"#.to_string())
        });

        let list = GenerativeRecommender::pure(Arc::new(completion), 5)
            .candidates(&space_and_love())
            .await
            .unwrap();

        assert!(list.candidates.is_empty());
        assert_eq!(list.errors.len(), 1);
        assert!(list.errors[0].starts_with("An error occurred while parsing the recommendations"));
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .returning(|_, _, _| Err(AppError::ExternalApi("429".to_string())));

        let result = GenerativeRecommender::pure(Arc::new(completion), 5)
            .candidates(&space_and_love())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_assisted_seeds_prompt_with_original_titles() {
        let mut source = MockDiscoverySource::new();
        source.expect_keyword_id().returning(|_| Ok(Some(1)));
        source.expect_discover().times(1).returning(|_| {
            Ok(vec![DiscoveredMovie {
                id: 1,
                title: "The Intouchables".to_string(),
                original_title: "Intouchables".to_string(),
                release_date: None,
                overview: None,
            }])
        });

        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .withf(|_, prompt, _| prompt.contains("Currently we have this list of movies: [Intouchables]."))
            .times(1)
            .returning(|_, _, _| Ok(r#"{"movies": []}"#.to_string()));

        let recommender = GenerativeRecommender::assisted(
            Arc::new(completion),
            DiscoveryRecommender::new(Arc::new(source)),
            5,
        );
        let list = recommender.candidates(&space_and_love()).await.unwrap();

        assert!(list.candidates.is_empty());
        assert!(list.errors.is_empty());
    }

    #[tokio::test]
    async fn test_assisted_without_seeds_surfaces_notice() {
        let mut source = MockDiscoverySource::new();
        source.expect_keyword_id().returning(|_| Ok(None));
        source.expect_discover().times(3).returning(|_| Ok(vec![]));

        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .withf(|_, prompt, _| !prompt.contains("Currently we have this list"))
            .returning(|_, _, _| {
                Ok(r#"{"movies": [{"title": "Solaris", "explanation": "Space."}]}"#.to_string())
            });

        let recommender = GenerativeRecommender::assisted(
            Arc::new(completion),
            DiscoveryRecommender::new(Arc::new(source)),
            5,
        );
        let list = recommender.candidates(&space_and_love()).await.unwrap();

        assert_eq!(list.candidates.len(), 1);
        assert_eq!(list.errors, vec![NO_MOVIES_FOUND.to_string()]);
    }
}
