use std::cmp::Ordering;

use crate::models::{CacheRecord, RankedCandidate};

/// Cosine similarity of two vectors
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ
/// (vectors from different embedding models are not comparable).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Mean similarity between `query` and every chunk of `record`, `None` without chunks
pub fn record_score(query: &[f32], record: &CacheRecord) -> Option<f32> {
    if record.is_empty() {
        return None;
    }

    let total: f64 = record
        .embeddings()
        .map(|embedding| cosine_similarity(query, embedding) as f64)
        .sum();

    Some((total / record.chunks.len() as f64) as f32)
}

/// Scores every non-empty record and returns the `top_n` best, highest first
///
/// The sort is stable: equal scores keep the order the records were yielded in.
pub fn rank<'a, I>(query: &[f32], records: I, top_n: usize) -> Vec<RankedCandidate>
where
    I: IntoIterator<Item = (&'a String, &'a CacheRecord)>,
{
    let mut scored: Vec<RankedCandidate> = records
        .into_iter()
        .filter_map(|(key, record)| {
            record_score(query, record).map(|score| RankedCandidate {
                key: key.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_n);

    for candidate in &scored {
        tracing::debug!(key = %candidate.key, score = candidate.score, "Ranked candidate");
    }

    scored
}
