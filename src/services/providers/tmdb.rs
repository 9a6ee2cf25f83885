/// TMDB provider
///
/// Discovery plus the lookups used to turn profile names into TMDB ids:
/// - `/discover/movie` with `|`-joined (OR) filters, most popular first
/// - `/genre/movie/list`, `/person/popular`
/// - `/search/keyword`, `/search/person` (first hit wins)
use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::{DiscoverQuery, DiscoveredMovie, TmdbGenreList, TmdbNamedId, TmdbPage},
    services::providers::DiscoverySource,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const DISCOVER_DEFAULTS: [(&str, &str); 5] = [
    ("include_adult", "false"),
    ("include_video", "false"),
    ("language", "en-US"),
    ("page", "1"),
    ("sort_by", "popularity.desc"),
];

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn first_search_hit(&self, path: &str, query: &str) -> AppResult<Option<u64>> {
        let page: TmdbPage<TmdbNamedId> = self
            .get_json(
                path,
                &[("query", query.to_string()), ("page", "1".to_string())],
            )
            .await?;
        Ok(page.results.first().map(|hit| hit.id))
    }
}

/// Full discovery query string: fixed defaults followed by the non-empty filters
pub fn discover_params(query: &DiscoverQuery) -> Vec<(&'static str, String)> {
    DISCOVER_DEFAULTS
        .iter()
        .map(|(k, v)| (*k, v.to_string()))
        .chain(query.to_params())
        .collect()
}

#[async_trait::async_trait]
impl DiscoverySource for TmdbProvider {
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<DiscoveredMovie>> {
        let params = discover_params(query);
        tracing::debug!(params = ?params, "TMDB discover query");

        let page: TmdbPage<DiscoveredMovie> = self.get_json("discover/movie", &params).await?;

        tracing::info!(
            results = page.results.len(),
            provider = "tmdb",
            "Discovery completed"
        );

        Ok(page.results)
    }

    async fn genres(&self) -> AppResult<BTreeMap<String, u64>> {
        let list: TmdbGenreList = self
            .get_json("genre/movie/list", &[("language", "en".to_string())])
            .await?;
        Ok(list.genres.into_iter().map(|g| (g.name, g.id)).collect())
    }

    async fn popular_people(&self) -> AppResult<BTreeMap<String, u64>> {
        let page: TmdbPage<TmdbNamedId> = self.get_json("person/popular", &[]).await?;
        Ok(page.results.into_iter().map(|p| (p.name, p.id)).collect())
    }

    async fn keyword_id(&self, keyword: &str) -> AppResult<Option<u64>> {
        self.first_search_hit("search/keyword", keyword).await
    }

    async fn person_id(&self, name: &str) -> AppResult<Option<u64>> {
        self.first_search_hit("search/person", name).await
    }
}
