//! Cosine-similarity ranking of filtered candidates.

use super::encoder::FeatureEncoder;
use super::models::{FeatureSource, ScoredCandidate};

/// Cosine similarity clamped into `[0, 1]`.
///
/// Returns exactly `0.0` when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a_sq: f64 = a.iter().map(|x| x * x).sum();
    let norm_b_sq: f64 = b.iter().map(|x| x * x).sum();

    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        return 0.0;
    }

    // One sqrt over the product keeps identical vectors at exactly 1.0
    (dot / (norm_a_sq * norm_b_sq).sqrt()).clamp(0.0, 1.0)
}

/// Scores every candidate against `profile` and keeps the best `k`.
///
/// Sorting is stable, so equal scores keep the filter order. Asking for more
/// than there are candidates returns all of them.
pub fn rank<P: FeatureSource + ?Sized>(
    encoder: &FeatureEncoder,
    profile: &P,
    candidates: Vec<ScoredCandidate>,
    k: usize,
) -> Vec<ScoredCandidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let user_vector = encoder.encode(profile);

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|mut candidate| {
            let song_vector = encoder.encode(&candidate);
            candidate.similarity_score = Some(cosine_similarity(&user_vector, &song_vector));
            candidate
        })
        .collect();

    scored.sort_by(|a, b| {
        let a = a.similarity_score.unwrap_or(0.0);
        let b = b.similarity_score.unwrap_or(0.0);
        b.total_cmp(&a)
    });
    scored.truncate(k);
    scored
}
