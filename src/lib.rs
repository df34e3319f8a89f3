//! BeatLens recommendation server library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod metadata;
pub mod recommender;
pub mod server;
pub mod song_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use metadata::{MetadataProvider, NoOpMetadataProvider, SpotifyClient};
pub use recommender::{EncoderHandle, FeatureEncoder};
pub use server::{run_server, RequestsLoggingLevel, ServerState};
pub use song_store::{SongStore, SqliteSongStore};
