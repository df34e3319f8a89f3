use thiserror::Error;

/// Errors raised by the recommendation core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecommendError {
    /// The caller asked for a mood outside the rule table.
    #[error("Invalid mood: {0}. Must be one of sedih, happy, galau, chill, semangat")]
    InvalidMood(String),
}
