use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OpenAI (or compatible) API key
    pub openai_api_key: String,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Chat model used for summaries, rationales and generated lists
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Embedding model. Cached corpora are only comparable with vectors of the same model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// OMDb API key
    pub omdb_api_key: String,

    #[serde(default = "default_omdb_url")]
    pub omdb_url: String,

    /// TMDB read access token (sent as a bearer token)
    pub tmdb_api_key: String,

    #[serde(default = "default_tmdb_url")]
    pub tmdb_url: String,

    /// MediaWiki API endpoint used for long-form plots
    #[serde(default = "default_wikipedia_api_url")]
    pub wikipedia_api_url: String,

    /// Listing page scraped for the "worst movies" corpus
    #[serde(default = "default_worst_movies_url")]
    pub worst_movies_url: String,

    #[serde(default = "default_worst_movies_cache_path")]
    pub worst_movies_cache_path: String,

    #[serde(default = "default_subtitles_cache_path")]
    pub subtitles_cache_path: String,

    /// Folder holding `Title (Year).srt` transcripts
    #[serde(default = "default_subtitles_dir")]
    pub subtitles_dir: String,

    /// Width of a transcript chunk in minutes
    #[serde(default = "default_subtitle_interval_minutes")]
    pub subtitle_interval_minutes: u32,

    /// Number of movies requested from / kept by each strategy
    #[serde(default = "default_amount_of_movies")]
    pub amount_of_movies: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_omdb_url() -> String {
    "http://www.omdbapi.com/".to_string()
}

fn default_tmdb_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_wikipedia_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_worst_movies_url() -> String {
    "https://en.wikipedia.org/wiki/List_of_films_considered_the_worst".to_string()
}

fn default_worst_movies_cache_path() -> String {
    "data/json/worst_movies.json".to_string()
}

fn default_subtitles_cache_path() -> String {
    "data/json/subtitles.json".to_string()
}

fn default_subtitles_dir() -> String {
    "data/subtitles/".to_string()
}

fn default_subtitle_interval_minutes() -> u32 {
    10
}

fn default_amount_of_movies() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_for_optional_keys() {
        let vars = vec![
            ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
            ("OMDB_API_KEY".to_string(), "omdb".to_string()),
            ("TMDB_API_KEY".to_string(), "tmdb".to_string()),
        ];

        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.subtitle_interval_minutes, 10);
        assert_eq!(config.amount_of_movies, 5);
        assert_eq!(config.worst_movies_cache_path, "data/json/worst_movies.json");
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_missing_required_key_fails() {
        let vars = vec![("OMDB_API_KEY".to_string(), "omdb".to_string())];
        let result = envy::from_iter::<_, Config>(vars);
        assert!(result.is_err());
    }
}
