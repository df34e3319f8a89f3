mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{NewSong, SeedStats, Song};
pub use store::SqliteSongStore;
pub use trait_def::SongStore;
