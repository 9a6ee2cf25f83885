/// Transcript ingestor
///
/// Reads `Title (Year).srt` files, buckets cue text into fixed-width time intervals
/// measured from each cue's start, and embeds one chunk per non-empty bucket.
/// Records are keyed by file stem; chunks by bucket index.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Timelike};

use crate::{
    error::{AppError, AppResult},
    models::{split_title_year, CacheRecord, Corpus},
    services::{embedding::Embedder, ingest::CorpusIngestor},
};

/// A single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: NaiveTime,
    pub text: String,
}

impl Cue {
    /// Whole minutes from the start of the film
    pub fn start_minutes(&self) -> u32 {
        self.start.hour() * 60 + self.start.minute()
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveTime> {
    let normalized = raw.trim().replace(',', ".");
    NaiveTime::parse_from_str(&normalized, "%H:%M:%S%.f").ok()
}

/// Parses SubRip content into cues, in file order
///
/// A block ends at any blank or whitespace-only line. Blocks without a parsable
/// timing line or without text are dropped.
pub fn parse_srt(content: &str) -> Vec<Cue> {
    let content = content.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in content.lines().chain(std::iter::once("")) {
        if !line.trim().is_empty() {
            block.push(line.trim_end());
            continue;
        }
        if let Some(cue) = parse_block(&block) {
            cues.push(cue);
        }
        block.clear();
    }

    cues
}

fn parse_block(lines: &[&str]) -> Option<Cue> {
    let timing_idx = lines.iter().position(|l| l.contains("-->"))?;

    let start = lines[timing_idx].split("-->").next().and_then(parse_timestamp);
    let Some(start) = start else {
        tracing::debug!(line = %lines[timing_idx], "Skipping cue with unparsable timing");
        return None;
    };

    let text = lines[timing_idx + 1..].join("\n").trim().to_string();
    (!text.is_empty()).then_some(Cue { start, text })
}

/// Groups cue text into `interval_minutes`-wide buckets, in timestamp order
///
/// Texts within a bucket are joined with a single space. Empty buckets never appear.
pub fn bucket_cues(cues: &[Cue], interval_minutes: u32) -> BTreeMap<u32, String> {
    let interval = interval_minutes.max(1);
    let mut ordered: Vec<&Cue> = cues.iter().collect();
    ordered.sort_by_key(|cue| cue.start);

    let mut buckets: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for cue in ordered {
        buckets
            .entry(cue.start_minutes() / interval)
            .or_default()
            .push(cue.text.as_str());
    }

    buckets
        .into_iter()
        .map(|(bucket, texts)| (bucket, texts.join(" ")))
        .collect()
}

pub struct TranscriptIngestor {
    dir: PathBuf,
    interval_minutes: u32,
    embedder: Embedder,
}

impl TranscriptIngestor {
    pub fn new(dir: impl Into<PathBuf>, interval_minutes: u32, embedder: Embedder) -> Self {
        Self {
            dir: dir.into(),
            interval_minutes,
            embedder,
        }
    }

    async fn transcript_files(&self) -> AppResult<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            AppError::Internal(format!(
                "Cannot read transcript folder {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
        {
            let path = entry.path();
            let is_srt = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"));
            if is_srt {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    async fn ingest_file(&self, path: &Path) -> AppResult<CacheRecord> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Internal(format!("{}: {}", path.display(), e)))?;
        let content = String::from_utf8_lossy(&bytes);

        let cues = parse_srt(&content);
        let mut record = CacheRecord::new();
        for (bucket, text) in bucket_cues(&cues, self.interval_minutes) {
            let chunk = self.embedder.embed_chunk(text).await?;
            record.insert(&bucket.to_string(), chunk);
        }

        Ok(record)
    }
}

#[async_trait::async_trait]
impl CorpusIngestor for TranscriptIngestor {
    async fn ingest(&self) -> AppResult<Corpus> {
        let mut corpus = Corpus::new();

        for path in self.transcript_files().await? {
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            if split_title_year(&key).1.is_none() {
                tracing::warn!(file = %path.display(), "Transcript name is not shaped like `Title (Year)`");
            }

            match self.ingest_file(&path).await {
                Ok(record) => {
                    tracing::info!(key = %key, chunks = record.chunks.len(), "Transcript ingested");
                    corpus.insert(key, record);
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Skipping transcript");
                }
            }
        }

        Ok(corpus)
    }

    fn name(&self) -> &'static str {
        "transcripts"
    }
}
