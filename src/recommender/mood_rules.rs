//! Static mood preferences.
//!
//! Each mood maps to the genres and tempos that usually fit it. The table is
//! domain knowledge, not configuration: it is fixed at compile time.

use super::error::RecommendError;
use super::models::Mood;

#[derive(Debug, PartialEq, Eq)]
pub struct MoodRule {
    pub preferred_genres: &'static [&'static str],
    pub preferred_tempos: &'static [&'static str],
}

const SEDIH: MoodRule = MoodRule {
    preferred_genres: &["indie", "ballad"],
    preferred_tempos: &["slow", "medium"],
};

const HAPPY: MoodRule = MoodRule {
    preferred_genres: &["pop", "rock"],
    preferred_tempos: &["medium", "fast"],
};

const GALAU: MoodRule = MoodRule {
    preferred_genres: &["indie", "pop", "ballad"],
    preferred_tempos: &["slow"],
};

const CHILL: MoodRule = MoodRule {
    preferred_genres: &["lo-fi", "acoustic", "ambient", "indie"],
    preferred_tempos: &["slow", "medium"],
};

const SEMANGAT: MoodRule = MoodRule {
    preferred_genres: &["rock", "pop punk", "edm"],
    preferred_tempos: &["fast", "medium"],
};

/// Rule for an already-validated mood.
pub fn rule_for(mood: Mood) -> &'static MoodRule {
    match mood {
        Mood::Sedih => &SEDIH,
        Mood::Happy => &HAPPY,
        Mood::Galau => &GALAU,
        Mood::Chill => &CHILL,
        Mood::Semangat => &SEMANGAT,
    }
}

/// Looks up the preferences for a raw mood string.
pub fn preferences(mood: &str) -> Result<&'static MoodRule, RecommendError> {
    let mood: Mood = mood.parse()?;
    Ok(rule_for(mood))
}
