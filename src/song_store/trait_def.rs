use super::models::{NewSong, Song};
use anyhow::Result;

/// Read/write access to the song catalog.
pub trait SongStore: Send + Sync {
    /// All songs ordered by id. This is the corpus order the filter preserves.
    fn get_all_songs(&self) -> Result<Vec<Song>>;

    fn get_song(&self, id: i64) -> Result<Option<Song>>;

    /// Distinct genres, sorted ascending.
    fn get_genres(&self) -> Result<Vec<String>>;

    /// Distinct moods, sorted ascending.
    fn get_moods(&self) -> Result<Vec<String>>;

    /// Inserts a song and returns its new id.
    fn insert_song(&self, song: &NewSong) -> Result<i64>;

    fn get_songs_count(&self) -> Result<usize>;
}
