//! Rule-based candidate filtering.
//!
//! Narrows the corpus to songs that plausibly fit the requested mood. A strict
//! pass requires both a genre and a tempo match; when it yields fewer than
//! [`MIN_STRICT_CANDIDATES`] songs, a relaxed pass adds songs matching either.

use std::collections::HashSet;

use tracing::debug;

use super::error::RecommendError;
use super::models::{Mood, ScoredCandidate};
use super::mood_rules::rule_for;
use crate::song_store::Song;

/// Strict-pass size at which the relaxed pass is skipped.
pub const MIN_STRICT_CANDIDATES: usize = 10;

const GENRE_WEIGHT: f64 = 0.3;
const TEMPO_WEIGHT: f64 = 0.2;
const MOOD_WEIGHT: f64 = 0.5;

struct Targets<'a> {
    genres: Vec<&'a str>,
    tempos: Vec<&'a str>,
}

struct MatchFlags {
    genre: bool,
    tempo: bool,
    mood: bool,
}

impl MatchFlags {
    fn of(song: &Song, targets: &Targets<'_>, mood: Mood) -> Self {
        Self {
            genre: targets.genres.contains(&song.genre.as_str()),
            tempo: targets.tempos.contains(&song.tempo.as_str()),
            mood: song.mood == mood.as_str(),
        }
    }

    fn score(&self) -> f64 {
        let mut score = 0.0;
        if self.genre {
            score += GENRE_WEIGHT;
        }
        if self.tempo {
            score += TEMPO_WEIGHT;
        }
        if self.mood {
            score += MOOD_WEIGHT;
        }
        score
    }
}

/// Filters `songs` for the given mood and optional overrides.
///
/// A present `genre` or `tempo` replaces the rule table's preferred set for
/// that dimension. Empty strings count as absent. The result keeps corpus
/// order, strict-pass songs first.
pub fn filter_candidates(
    mood: &str,
    genre: Option<&str>,
    tempo: Option<&str>,
    songs: &[Song],
) -> Result<Vec<ScoredCandidate>, RecommendError> {
    let mood: Mood = mood.parse()?;
    Ok(filter_for_mood(mood, genre, tempo, songs))
}

/// Same as [`filter_candidates`] for an already-parsed mood.
pub fn filter_for_mood(
    mood: Mood,
    genre: Option<&str>,
    tempo: Option<&str>,
    songs: &[Song],
) -> Vec<ScoredCandidate> {
    if songs.is_empty() {
        return vec![];
    }

    let rule = rule_for(mood);
    let targets = Targets {
        genres: match genre.filter(|g| !g.is_empty()) {
            Some(genre) => vec![genre],
            None => rule.preferred_genres.to_vec(),
        },
        tempos: match tempo.filter(|t| !t.is_empty()) {
            Some(tempo) => vec![tempo],
            None => rule.preferred_tempos.to_vec(),
        },
    };

    let mut candidates: Vec<ScoredCandidate> = songs
        .iter()
        .filter_map(|song| {
            let flags = MatchFlags::of(song, &targets, mood);
            (flags.genre && flags.tempo).then(|| ScoredCandidate::new(song.clone(), flags.score()))
        })
        .collect();

    if candidates.len() >= MIN_STRICT_CANDIDATES {
        debug!(
            "Strict pass for {} produced {} candidates",
            mood,
            candidates.len()
        );
        return candidates;
    }

    let selected: HashSet<i64> = candidates.iter().map(|c| c.song.id).collect();
    let strict_count = candidates.len();

    candidates.extend(songs.iter().filter_map(|song| {
        if selected.contains(&song.id) {
            return None;
        }
        let flags = MatchFlags::of(song, &targets, mood);
        (flags.genre || flags.tempo).then(|| ScoredCandidate::new(song.clone(), flags.score()))
    }));

    debug!(
        "Relaxed pass for {}: {} strict + {} relaxed candidates",
        mood,
        strict_count,
        candidates.len() - strict_count
    );

    candidates
}
