use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beatlens_server::config;
use beatlens_server::metadata::{MetadataProvider, NoOpMetadataProvider, SpotifyClient};
use beatlens_server::recommender::{EncoderHandle, FeatureEncoder};
use beatlens_server::server::{metrics, run_server, RequestsLoggingLevel, ServerState};
use beatlens_server::song_store::{SongStore, SqliteSongStore};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite song database. Created if missing.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Max age in seconds for cached genre and mood listings.
    #[clap(long, default_value_t = 300)]
    pub catalog_cache_age_sec: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Origin allowed to call the API from a browser. Repeatable.
    #[clap(long = "cors-origin", default_values_t = [String::from("http://localhost:3000")])]
    pub cors_origins: Vec<String>,

    /// Spotify client id, enables preview and cover lookups together with the secret.
    #[clap(long, env = "SPOTIFY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            catalog_cache_age_sec: args.catalog_cache_age_sec,
            frontend_dir_path: args.frontend_dir_path.clone(),
            cors_origins: args.cors_origins.clone(),
            spotify_client_id: args.spotify_client_id.clone(),
            spotify_client_secret: args.spotify_client_secret.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
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

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // TOML overrides CLI
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_path: {:?}", app_config.db_path);
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);

    let song_store = Arc::new(SqliteSongStore::new(&app_config.db_path)?);
    let songs = song_store.get_all_songs()?;
    info!("Loaded {} songs", songs.len());

    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::set_songs_total(songs.len());

    let encoder = Arc::new(EncoderHandle::new(FeatureEncoder::build(&songs)));

    let metadata_provider: Arc<dyn MetadataProvider> = match &app_config.spotify {
        Some(spotify_config) => {
            info!("Spotify metadata enabled");
            Arc::new(SpotifyClient::new(spotify_config.clone())?)
        }
        None => {
            info!("Spotify credentials not configured, previews disabled");
            Arc::new(NoOpMetadataProvider)
        }
    };

    let state = ServerState::new(
        app_config.server_config(),
        song_store,
        encoder,
        metadata_provider,
    );

    run_server(state).await
}
