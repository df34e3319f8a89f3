use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::RecommendError;
use crate::song_store::Song;

/// The moods a user can ask recommendations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sedih,
    Happy,
    Galau,
    Chill,
    Semangat,
}

impl Mood {
    /// All moods, in the order they are presented to clients.
    pub const ALL: [Mood; 5] = [
        Mood::Sedih,
        Mood::Happy,
        Mood::Galau,
        Mood::Chill,
        Mood::Semangat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Sedih => "sedih",
            Mood::Happy => "happy",
            Mood::Galau => "galau",
            Mood::Chill => "chill",
            Mood::Semangat => "semangat",
        }
    }
}

impl FromStr for Mood {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedih" => Ok(Mood::Sedih),
            "happy" => Ok(Mood::Happy),
            "galau" => Ok(Mood::Galau),
            "chill" => Ok(Mood::Chill),
            "semangat" => Ok(Mood::Semangat),
            other => Err(RecommendError::InvalidMood(other.to_string())),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Song tempo buckets, ordered slow to fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tempo {
    Slow,
    Medium,
    Fast,
}

impl Tempo {
    pub const ALL: [Tempo; 3] = [Tempo::Slow, Tempo::Medium, Tempo::Fast];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tempo::Slow => "slow",
            Tempo::Medium => "medium",
            Tempo::Fast => "fast",
        }
    }

    /// Fixed ordinal position used by the feature encoder.
    pub fn ordinal(&self) -> usize {
        match self {
            Tempo::Slow => 0,
            Tempo::Medium => 1,
            Tempo::Fast => 2,
        }
    }

    pub fn parse(s: &str) -> Option<Tempo> {
        match s {
            "slow" => Some(Tempo::Slow),
            "medium" => Some(Tempo::Medium),
            "fast" => Some(Tempo::Fast),
            _ => None,
        }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can be turned into a feature vector.
///
/// Songs, candidates and user profiles all expose the same three categorical
/// attributes; the encoder only ever looks at these.
pub trait FeatureSource {
    fn genre(&self) -> &str;
    fn mood(&self) -> &str;
    fn tempo(&self) -> &str;
}

impl FeatureSource for Song {
    fn genre(&self) -> &str {
        &self.genre
    }

    fn mood(&self) -> &str {
        &self.mood
    }

    fn tempo(&self) -> &str {
        &self.tempo
    }
}

/// What the user asked for. Genre and tempo are optional overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub mood: Mood,
    pub genre: Option<String>,
    pub tempo: Option<String>,
}

impl UserProfile {
    pub fn new(mood: Mood, genre: Option<String>, tempo: Option<String>) -> Self {
        Self { mood, genre, tempo }
    }

    /// Fills missing genre/tempo from the first candidate. Empty strings
    /// count as missing, same as in the filter.
    ///
    /// Returns `None` when there is no candidate to borrow defaults from and
    /// the profile is incomplete.
    pub fn resolve(&self, candidates: &[ScoredCandidate]) -> Option<ResolvedProfile> {
        let first = candidates.first();
        let genre = match self.genre.as_deref().filter(|g| !g.is_empty()) {
            Some(genre) => genre.to_string(),
            None => first?.song.genre.clone(),
        };
        let tempo = match self.tempo.as_deref().filter(|t| !t.is_empty()) {
            Some(tempo) => tempo.to_string(),
            None => first?.song.tempo.clone(),
        };
        Some(ResolvedProfile {
            mood: self.mood,
            genre,
            tempo,
        })
    }
}

/// A user profile with every attribute set, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProfile {
    pub mood: Mood,
    pub genre: String,
    pub tempo: String,
}

impl FeatureSource for ResolvedProfile {
    fn genre(&self) -> &str {
        &self.genre
    }

    fn mood(&self) -> &str {
        self.mood.as_str()
    }

    fn tempo(&self) -> &str {
        &self.tempo
    }
}

/// A song decorated with the scores computed for one request.
///
/// The song is a copy taken from the corpus snapshot; scores live here and
/// are never written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub song: Song,
    pub preliminary_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl ScoredCandidate {
    pub fn new(song: Song, preliminary_score: f64) -> Self {
        Self {
            song,
            preliminary_score,
            similarity_score: None,
        }
    }
}

impl FeatureSource for ScoredCandidate {
    fn genre(&self) -> &str {
        &self.song.genre
    }

    fn mood(&self) -> &str {
        &self.song.mood
    }

    fn tempo(&self) -> &str {
        &self.song.tempo
    }
}
