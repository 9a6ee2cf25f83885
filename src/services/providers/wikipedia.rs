/// Wikipedia provider
///
/// Long-form plots come from the MediaWiki extracts API as plain text with
/// `== Heading ==` markers; only the `Plot` section is kept. The same client also
/// downloads raw listing pages for scraped corpora.
use crate::{
    error::{AppError, AppResult},
    services::providers::{PageFetcher, PlotSource},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const USER_AGENT: &str = "movie-recommender";
const PLOT_SECTION: &str = "Plot";

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
}

#[derive(Clone)]
pub struct WikipediaProvider {
    http_client: HttpClient,
    api_url: String,
}

impl WikipediaProvider {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
        }
    }
}

/// Returns the heading level and name if `line` is a `== Heading ==` marker
fn heading(line: &str) -> Option<(usize, &str)> {
    let line = line.trim();
    if !line.starts_with("==") || !line.ends_with("==") {
        return None;
    }
    let level = line.chars().take_while(|c| *c == '=').count();
    let name = line.trim_matches('=').trim();
    Some((level, name))
}

/// Body of the level-2 section named `section`, without its subsection headings
pub fn extract_section(extract: &str, section: &str) -> Option<String> {
    let mut lines = extract.lines();
    lines.find(|line| matches!(heading(line), Some((2, name)) if name.eq_ignore_ascii_case(section)))?;

    let mut body = Vec::new();
    for line in lines {
        match heading(line) {
            Some((level, _)) if level <= 2 => break,
            Some(_) => continue,
            None => body.push(line),
        }
    }

    let text = body.join("\n").trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait::async_trait]
impl PlotSource for WikipediaProvider {
    async fn fetch_plot(&self, title: &str) -> AppResult<Option<String>> {
        let response = self
            .http_client
            .get(&self.api_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("exsectionformat", "wiki"),
                ("redirects", "1"),
                ("format", "json"),
                ("formatversion", "2"),
                ("titles", title),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Wikipedia API returned status {}: {}",
                status, body
            )));
        }

        let extract: ExtractResponse = response.json().await?;
        let plot = extract
            .query
            .into_iter()
            .flat_map(|q| q.pages)
            .find(|page| !page.missing)
            .and_then(|page| page.extract)
            .and_then(|text| extract_section(&text, PLOT_SECTION));

        tracing::debug!(
            title = %title,
            found = plot.is_some(),
            provider = "wikipedia",
            "Long plot lookup completed"
        );

        Ok(plot)
    }
}

#[async_trait::async_trait]
impl PageFetcher for WikipediaProvider {
    async fn fetch_page(&self, url: &str) -> AppResult<String> {
        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Page fetch for {} returned status {}",
                url, status
            )));
        }

        Ok(response.text().await?)
    }
}
