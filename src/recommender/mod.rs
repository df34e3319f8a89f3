//! Mood-based song recommendation.
//!
//! Two stages: a rule-based [`filter`] narrows the corpus to plausible
//! candidates, then the [`ranker`] orders them by cosine similarity to the
//! user's profile using vectors from the [`encoder`].
//!
//! Everything here is synchronous and side-effect free; callers hand in a
//! corpus snapshot and get scored copies back.

pub mod encoder;
pub mod error;
pub mod filter;
pub mod models;
pub mod mood_rules;
pub mod pipeline;
pub mod ranker;
pub mod reason;

pub use encoder::{EncoderHandle, FeatureEncoder};
pub use error::RecommendError;
pub use filter::filter_candidates;
pub use models::{FeatureSource, Mood, ResolvedProfile, ScoredCandidate, Tempo, UserProfile};
pub use mood_rules::{preferences, MoodRule};
pub use pipeline::{recommend, RecommendationOutcome};
pub use ranker::{cosine_similarity, rank};
