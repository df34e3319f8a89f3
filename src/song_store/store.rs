//! SQLite-backed song store.

use super::models::{NewSong, SeedStats, Song};
use super::schema::SONGS_VERSIONED_SCHEMAS;
use super::trait_def::SongStore;
use crate::sqlite_persistence::open_versioned;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const SONG_COLUMNS: &str = "id, title, artist, genre, mood, tempo, spotify_id, features";

#[derive(Clone)]
pub struct SqliteSongStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSongStore {
    /// Opens the database at `db_path`, creating the schema if the file does not exist.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(&db_path, SONGS_VERSIONED_SCHEMAS)
            .with_context(|| format!("Failed to open song store at {:?}", db_path.as_ref()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Imports a JSON array of [`NewSong`] records in a single transaction.
    pub fn import_seed_file<P: AsRef<Path>>(&self, seed_path: P) -> Result<SeedStats> {
        let raw = std::fs::read_to_string(seed_path.as_ref())
            .with_context(|| format!("Failed to read seed file {:?}", seed_path.as_ref()))?;
        let songs: Vec<NewSong> =
            serde_json::from_str(&raw).context("Failed to parse seed file")?;
        self.import_seed(&songs)
    }

    pub fn import_seed(&self, songs: &[NewSong]) -> Result<SeedStats> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for song in songs {
            insert_song_row(&tx, song)
                .with_context(|| format!("Failed to import \"{}\"", song.title))?;
        }
        tx.commit()?;

        let genres: BTreeSet<&str> = songs.iter().map(|s| s.genre.as_str()).collect();
        let moods: BTreeSet<&str> = songs.iter().map(|s| s.mood.as_str()).collect();
        let stats = SeedStats {
            songs: songs.len(),
            genres: genres.len(),
            moods: moods.len(),
        };
        info!(
            "Imported {} songs ({} genres, {} moods)",
            stats.songs, stats.genres, stats.moods
        );
        Ok(stats)
    }

    fn distinct_values(&self, column: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {column} FROM songs ORDER BY {column} ASC"
        ))?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(values)
    }
}

fn insert_song_row(conn: &Connection, song: &NewSong) -> Result<i64> {
    let features = song
        .features
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    conn.execute(
        "INSERT INTO songs (title, artist, genre, mood, tempo, spotify_id, features)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            song.title,
            song.artist,
            song.genre,
            song.mood,
            song.tempo,
            song.spotify_id,
            features
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn song_from_row(row: &Row) -> rusqlite::Result<Song> {
    let id: i64 = row.get(0)?;
    let features: Option<String> = row.get(7)?;
    let features = features.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Song {} has malformed features: {}", id, err);
            None
        }
    });
    Ok(Song {
        id,
        title: row.get(1)?,
        artist: row.get(2)?,
        genre: row.get(3)?,
        mood: row.get(4)?,
        tempo: row.get(5)?,
        spotify_id: row.get(6)?,
        features,
    })
}

impl SongStore for SqliteSongStore {
    fn get_all_songs(&self) -> Result<Vec<Song>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("SELECT {SONG_COLUMNS} FROM songs ORDER BY id ASC"))?;
        let songs = stmt
            .query_map([], song_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn get_song(&self, id: i64) -> Result<Option<Song>> {
        let conn = self.conn.lock().unwrap();
        let song = conn
            .query_row(
                &format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1"),
                params![id],
                song_from_row,
            )
            .optional()?;
        Ok(song)
    }

    fn get_genres(&self) -> Result<Vec<String>> {
        self.distinct_values("genre")
    }

    fn get_moods(&self) -> Result<Vec<String>> {
        self.distinct_values("mood")
    }

    fn insert_song(&self, song: &NewSong) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        insert_song_row(&conn, song)
    }

    fn get_songs_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
