/// Listing-page ingestor
///
/// Reads a page laid out as alternating `<h3>` headings and `<p>` paragraphs, one
/// heading per film. The page structure is not documented anywhere, so the parser
/// relies on fixed counts: the first three heading/paragraph elements are front
/// matter and the last one belongs to the citations section.
use std::sync::Arc;

use scraper::{Html, Selector};

use crate::{
    error::{AppError, AppResult},
    models::{CacheRecord, Corpus, PLOT_CHUNK_KEY},
    services::{embedding::Embedder, ingest::CorpusIngestor, providers::PageFetcher},
};

const LEADING_ELEMENTS_SKIPPED: usize = 3;
const TRAILING_ELEMENTS_SKIPPED: usize = 1;

/// One film found on the listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub title: String,
    pub plot: Option<String>,
}

fn element_text(element: &scraper::ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.trim().trim_end_matches("[edit]").trim().to_string()
}

/// Extracts films and their first paragraph from listing HTML, in page order
pub fn parse_listing(html: &str) -> AppResult<Vec<ListingEntry>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h3, p")
        .map_err(|e| AppError::Internal(format!("Invalid listing selector: {}", e)))?;

    let elements: Vec<_> = document.select(&selector).collect();
    let end = elements.len().saturating_sub(TRAILING_ELEMENTS_SKIPPED);
    let body = elements.get(LEADING_ELEMENTS_SKIPPED..end).unwrap_or_default();

    let mut entries: Vec<ListingEntry> = Vec::new();
    for element in body {
        let text = element_text(element);
        match element.value().name() {
            "h3" if !text.is_empty() => entries.push(ListingEntry {
                title: text,
                plot: None,
            }),
            "p" if !text.is_empty() => {
                if let Some(entry) = entries.last_mut().filter(|e| e.plot.is_none()) {
                    entry.plot = Some(text);
                }
            }
            _ => {}
        }
    }

    Ok(entries)
}

pub struct ScrapeIngestor {
    url: String,
    fetcher: Arc<dyn PageFetcher>,
    embedder: Embedder,
}

impl ScrapeIngestor {
    pub fn new(url: String, fetcher: Arc<dyn PageFetcher>, embedder: Embedder) -> Self {
        Self {
            url,
            fetcher,
            embedder,
        }
    }
}

#[async_trait::async_trait]
impl CorpusIngestor for ScrapeIngestor {
    async fn ingest(&self) -> AppResult<Corpus> {
        let html = self.fetcher.fetch_page(&self.url).await?;
        let entries = parse_listing(&html)?;

        tracing::info!(url = %self.url, entries = entries.len(), "Parsed listing page");

        let mut corpus = Corpus::new();
        for entry in entries {
            let record = match entry.plot {
                Some(plot) => match self.embedder.embed_chunk(plot).await {
                    Ok(chunk) => CacheRecord::single(PLOT_CHUNK_KEY, chunk),
                    Err(e) => {
                        tracing::error!(title = %entry.title, error = %e, "Skipping listing entry");
                        continue;
                    }
                },
                None => {
                    tracing::warn!(title = %entry.title, "No plot paragraph found");
                    CacheRecord::new()
                }
            };
            corpus.insert(entry.title, record);
        }

        Ok(corpus)
    }

    fn name(&self) -> &'static str {
        "listing_scrape"
    }
}
