//! Test fixture creation
//!
//! Creates temporary song databases with a small, known corpus.

use super::constants::*;
use anyhow::Result;
use beatlens_server::song_store::{NewSong, SqliteSongStore};
use std::path::PathBuf;
use tempfile::TempDir;

pub fn new_song(title: &str, genre: &str, mood: &str, tempo: &str) -> NewSong {
    NewSong {
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        genre: genre.to_string(),
        mood: mood.to_string(),
        tempo: tempo.to_string(),
        spotify_id: None,
        features: None,
    }
}

/// The default corpus. Ids are assigned in this order starting at 1.
pub fn fixture_songs() -> Vec<NewSong> {
    let mut hujan = new_song(SONG_HUJAN_TITLE, "indie", "sedih", "slow");
    hujan.spotify_id = Some(SONG_HUJAN_SPOTIFY_ID.to_string());
    hujan.features = Some(serde_json::json!({"energy": 0.21, "valence": 0.12}));

    vec![
        hujan,
        new_song("Sampai Jadi Debu", "ballad", "sedih", "slow"),
        new_song("Tentang Rindu", "indie", "galau", "medium"),
        new_song("Bahagia Selalu", "pop", "happy", "fast"),
        new_song("Lari Pagi", "rock", "semangat", "fast"),
        new_song("Senja di Pantai", "lo-fi", "chill", "slow"),
        new_song("Kopi Pagi", "acoustic", "chill", "medium"),
        new_song("Hari Baru", "pop", "happy", "medium"),
        new_song("Gelombang", "edm", "semangat", "fast"),
        new_song("Sepi", "ballad", "galau", "slow"),
    ]
}

/// Creates a temporary database holding `songs`.
pub fn create_test_db(songs: &[NewSong]) -> Result<(TempDir, PathBuf, SqliteSongStore)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("beatlens.db");
    let store = SqliteSongStore::new(&db_path)?;
    store.import_seed(songs)?;
    Ok((temp_dir, db_path, store))
}
