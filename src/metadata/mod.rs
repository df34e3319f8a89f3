//! Third-party track metadata (previews, artwork) looked up after ranking.

mod enrich;
mod provider;
mod spotify;

pub use enrich::{enrich, preview_for_song};
pub use provider::{MetadataProvider, NoOpMetadataProvider, TrackPreview};
pub use spotify::{SpotifyClient, SpotifyConfig, SPOTIFY_API_BASE, SPOTIFY_AUTH_URL};
