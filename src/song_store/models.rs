use serde::{Deserialize, Serialize};

/// A song as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
    pub tempo: String,
    pub spotify_id: Option<String>,
    /// Free-form audio features, kept as JSON.
    pub features: Option<serde_json::Value>,
}

/// Insert payload, also the record format of seed files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
    pub tempo: String,
    #[serde(default)]
    pub spotify_id: Option<String>,
    #[serde(default)]
    pub features: Option<serde_json::Value>,
}

/// Summary of a seed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedStats {
    pub songs: usize,
    pub genres: usize,
    pub moods: usize,
}
