/// OMDb metadata provider
///
/// Title lookup with the full plot: `GET /?apikey=..&t=<title>&y=<year>&plot=full`.
/// OMDb answers misses with HTTP 200 and `{"Response": "False", "Error": ".."}`.
use crate::{
    error::{AppError, AppResult},
    models::OmdbMovie,
    services::providers::MetadataSource,
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }

    /// Interprets an OMDb response body
    fn parse_response(&self, title: &str, body: serde_json::Value) -> AppResult<Option<OmdbMovie>> {
        let mut body = match body {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(AppError::ExternalApi(
                    "Invalid OMDb response format".to_string(),
                ))
            }
        };

        let found = body
            .remove("Response")
            .and_then(|v| v.as_str().map(|s| s.eq_ignore_ascii_case("true")))
            .unwrap_or(false);

        if !found {
            let reason = body
                .get("Error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown reason");
            tracing::warn!(title = %title, reason = %reason, "Movie not found");
            return Ok(None);
        }

        let movie: OmdbMovie = serde_json::from_value(serde_json::Value::Object(body))
            .map_err(|e| AppError::ExternalApi(format!("Failed to parse OMDb response: {}", e)))?;

        if !movie.unrecognized.is_empty() {
            let mut fields: Vec<&str> = movie.unrecognized.keys().map(String::as_str).collect();
            fields.sort_unstable();
            tracing::debug!(title = %title, fields = ?fields, "Ignoring unrecognised OMDb fields");
        }

        Ok(Some(movie))
    }
}

#[async_trait::async_trait]
impl MetadataSource for OmdbProvider {
    async fn lookup(&self, title: &str, year: Option<u16>) -> AppResult<Option<OmdbMovie>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
        }

        tracing::info!(title = %title, year = ?year, provider = "omdb", "Validating movie");

        let mut params = vec![
            ("apikey", self.api_key.clone()),
            ("t", title.to_string()),
            ("plot", "full".to_string()),
        ];
        if let Some(year) = year {
            params.push(("y", year.to_string()));
        }

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        self.parse_response(title, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_provider() -> OmdbProvider {
        OmdbProvider::new(
            reqwest::Client::new(),
            "test_key".to_string(),
            "http://test.local/".to_string(),
        )
    }

    #[test]
    fn test_parse_response_found() {
        let provider = create_test_provider();
        let body = json!({
            "Title": "Troll 2",
            "Year": "1990",
            "Director": "Claudio Fragasso",
            "Plot": "A family vacations in Nilbog.",
            "Response": "True"
        });

        let movie = provider.parse_response("Troll 2", body).unwrap().unwrap();
        assert_eq!(movie.title, "Troll 2");
        assert_eq!(movie.director.as_deref(), Some("Claudio Fragasso"));
        assert!(!movie.unrecognized.contains_key("Response"));
    }

    #[test]
    fn test_parse_response_not_found() {
        let provider = create_test_provider();
        let body = json!({ "Response": "False", "Error": "Movie not found!" });
        assert_eq!(provider.parse_response("Nothing", body).unwrap(), None);
    }

    #[test]
    fn test_parse_response_rejects_non_object() {
        let provider = create_test_provider();
        let result = provider.parse_response("Anything", json!(["Response"]));
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_lookup_empty_title_is_invalid() {
        let provider = create_test_provider();
        let result = provider.lookup("   ", None).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
