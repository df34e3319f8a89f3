//! Shared constants for end-to-end tests
//!
//! When the fixture corpus changes, update only this file and fixtures.rs.

// ============================================================================
// Fixture corpus
// ============================================================================

/// Number of songs in the default fixture corpus
pub const FIXTURE_SONG_COUNT: usize = 10;

/// "Hujan Bulan Juni", indie / sedih / slow, has a spotify id
pub const SONG_HUJAN_ID: i64 = 1;
pub const SONG_HUJAN_TITLE: &str = "Hujan Bulan Juni";
pub const SONG_HUJAN_SPOTIFY_ID: &str = "4uLU6hMCjMI75M1A2tKUQC";

/// "Lari Pagi", rock / semangat / fast
pub const SONG_LARI_PAGI_ID: i64 = 5;

/// Distinct genres of the fixture corpus, sorted
pub const FIXTURE_GENRES: [&str; 7] = [
    "acoustic", "ballad", "edm", "indie", "lo-fi", "pop", "rock",
];

/// Distinct moods of the fixture corpus
pub const FIXTURE_MOOD_COUNT: usize = 5;

// ============================================================================
// API messages
// ============================================================================

pub const EMPTY_CORPUS_MESSAGE: &str = "No songs in database";
pub const NO_CANDIDATES_MESSAGE: &str =
    "Maaf, belum ada lagu yang cocok. Coba ubah genre atau tempo.";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// An address nothing listens on, for simulating an unreachable metadata API
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9";
