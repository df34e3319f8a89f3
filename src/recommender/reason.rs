use super::models::{ResolvedProfile, ScoredCandidate};

/// Human-readable explanation of why a song was recommended,
/// e.g. `"mood match + genre match + 87% similarity"`.
pub fn explain(candidate: &ScoredCandidate, profile: &ResolvedProfile) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);

    if candidate.preliminary_score > 0.5 {
        parts.push("mood match".to_string());
    }
    if candidate.song.genre == profile.genre {
        parts.push("genre match".to_string());
    }
    if candidate.song.tempo == profile.tempo {
        parts.push("tempo match".to_string());
    }

    let similarity_pct = (candidate.similarity_score.unwrap_or(0.0) * 100.0) as u32;
    parts.push(format!("{}% similarity", similarity_pct));

    parts.join(" + ")
}
