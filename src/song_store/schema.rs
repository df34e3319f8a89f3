use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

const SONGS_TABLE_V0: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            autoincrement = true
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("mood", &SqlType::Text, non_null = true),
        sqlite_column!(
            "tempo",
            &SqlType::Text,
            non_null = true,
            check = Some("tempo IN ('slow', 'medium', 'fast')")
        ),
        sqlite_column!("spotify_id", &SqlType::Text),
        sqlite_column!("features", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_songs_genre", "genre"),
        ("idx_songs_mood", "mood"),
        ("idx_songs_tempo", "tempo"),
    ],
};

pub const SONGS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SONGS_TABLE_V0],
    migration: None,
}];
