//! Categorical feature encoding.
//!
//! A [`FeatureEncoder`] is an immutable vocabulary snapshot built from a corpus.
//! Vectors are laid out as `[mood one-hot | genre one-hot | tempo]`, so two
//! vectors are only comparable when produced by the same snapshot.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use tracing::info;

use super::models::{FeatureSource, Tempo};
use crate::song_store::Song;

/// Ordinal used for tempos outside slow/medium/fast.
const UNKNOWN_TEMPO_ORDINAL: usize = 1;
const MAX_TEMPO_ORDINAL: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureEncoder {
    genres: Vec<String>,
    moods: Vec<String>,
    genre_index: HashMap<String, usize>,
    mood_index: HashMap<String, usize>,
}

fn index_of(values: &[String]) -> HashMap<String, usize> {
    values
        .iter()
        .enumerate()
        .map(|(position, value)| (value.clone(), position))
        .collect()
}

impl FeatureEncoder {
    /// Builds the vocabulary from the distinct genres and moods of `songs`,
    /// each sorted ascending.
    pub fn build(songs: &[Song]) -> Self {
        let genres: Vec<String> = songs
            .iter()
            .map(|s| s.genre.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let moods: Vec<String> = songs
            .iter()
            .map(|s| s.mood.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            genre_index: index_of(&genres),
            mood_index: index_of(&moods),
            genres,
            moods,
        }
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn moods(&self) -> &[String] {
        &self.moods
    }

    pub fn genre_position(&self, genre: &str) -> Option<usize> {
        self.genre_index.get(genre).copied()
    }

    pub fn mood_position(&self, mood: &str) -> Option<usize> {
        self.mood_index.get(mood).copied()
    }

    /// Length of every vector this encoder produces.
    pub fn dimension(&self) -> usize {
        self.moods.len() + self.genres.len() + 1
    }

    /// Encodes an item. Unknown moods and genres leave their segment all
    /// zero; unknown tempos encode as medium.
    pub fn encode<T: FeatureSource + ?Sized>(&self, item: &T) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension()];

        if let Some(position) = self.mood_position(item.mood()) {
            vector[position] = 1.0;
        }
        if let Some(position) = self.genre_position(item.genre()) {
            vector[self.moods.len() + position] = 1.0;
        }

        let tempo_ordinal = Tempo::parse(item.tempo())
            .map(|t| t.ordinal())
            .unwrap_or(UNKNOWN_TEMPO_ORDINAL);
        vector[self.dimension() - 1] = tempo_ordinal as f64 / MAX_TEMPO_ORDINAL;

        vector
    }
}

/// Shared, swappable encoder snapshot.
///
/// Readers take a cheap `Arc` clone and keep using it for the whole request;
/// a rebuild constructs the new snapshot off-lock and only takes the write
/// lock to swap the pointer.
#[derive(Debug, Default)]
pub struct EncoderHandle {
    current: RwLock<Arc<FeatureEncoder>>,
}

impl EncoderHandle {
    pub fn new(encoder: FeatureEncoder) -> Self {
        Self {
            current: RwLock::new(Arc::new(encoder)),
        }
    }

    pub fn snapshot(&self) -> Arc<FeatureEncoder> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Builds a new snapshot from `songs` and publishes it.
    pub fn rebuild(&self, songs: &[Song]) -> Arc<FeatureEncoder> {
        let encoder = Arc::new(FeatureEncoder::build(songs));
        info!(
            "Feature encoder built: {} moods, {} genres, dimension {}",
            encoder.moods().len(),
            encoder.genres().len(),
            encoder.dimension()
        );
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = encoder.clone();
        encoder
    }
}
