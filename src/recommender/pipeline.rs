use serde::Serialize;

use super::encoder::FeatureEncoder;
use super::filter::filter_for_mood;
use super::models::{ResolvedProfile, ScoredCandidate, UserProfile};
use super::ranker::rank;
use crate::song_store::Song;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    /// How many songs survived the rule-based filter.
    pub candidates_filtered: usize,
    /// The profile actually used for ranking, once defaults were applied.
    pub profile: Option<ResolvedProfile>,
    pub ranked: Vec<ScoredCandidate>,
}

impl RecommendationOutcome {
    fn empty() -> Self {
        Self {
            candidates_filtered: 0,
            profile: None,
            ranked: vec![],
        }
    }
}

/// Runs filter then rank for a single request against a corpus snapshot.
pub fn recommend(
    encoder: &FeatureEncoder,
    profile: &UserProfile,
    songs: &[Song],
    k: usize,
) -> RecommendationOutcome {
    let candidates = filter_for_mood(
        profile.mood,
        profile.genre.as_deref(),
        profile.tempo.as_deref(),
        songs,
    );
    if candidates.is_empty() {
        return RecommendationOutcome::empty();
    }

    let resolved = match profile.resolve(&candidates) {
        Some(resolved) => resolved,
        None => return RecommendationOutcome::empty(),
    };

    let candidates_filtered = candidates.len();
    let ranked = rank(encoder, &resolved, candidates, k);

    RecommendationOutcome {
        candidates_filtered,
        profile: Some(resolved),
        ranked,
    }
}
