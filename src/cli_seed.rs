use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beatlens_server::song_store::{SongStore, SqliteSongStore};

/// Creates (or extends) a song database from a JSON seed file.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite song database.
    pub db_path: PathBuf,

    /// JSON array of songs: title, artist, genre, mood, tempo and optional spotify_id / features.
    pub seed_json: PathBuf,

    /// Delete the database file first instead of appending to it.
    #[clap(long)]
    pub reset: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    if cli_args.reset && cli_args.db_path.exists() {
        info!("Removing existing database {:?}", cli_args.db_path);
        std::fs::remove_file(&cli_args.db_path)
            .with_context(|| format!("Failed to remove {:?}", cli_args.db_path))?;
    }

    let store = SqliteSongStore::new(&cli_args.db_path)?;
    let stats = store.import_seed_file(&cli_args.seed_json)?;

    info!("Seed import complete:");
    info!("  songs imported: {}", stats.songs);
    info!("  total songs: {}", store.get_songs_count()?);
    info!("  genres: {}", store.get_genres()?.join(", "));
    info!("  moods: {}", store.get_moods()?.join(", "));

    Ok(())
}
