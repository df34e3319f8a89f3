//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own song database.

use super::constants::*;
use super::fixtures::{create_test_db, fixture_songs};
use beatlens_server::metadata::{
    MetadataProvider, NoOpMetadataProvider, SpotifyClient, SpotifyConfig,
};
use beatlens_server::recommender::{EncoderHandle, FeatureEncoder};
use beatlens_server::server::{
    make_admin_app, make_app, RequestsLoggingLevel, ServerConfig, ServerState,
};
use beatlens_server::song_store::{NewSong, SongStore, SqliteSongStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Base URL of the metrics/admin listener
    pub admin_url: String,

    /// Song store for direct database access in tests
    pub song_store: Arc<SqliteSongStore>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server over the default fixture corpus, without metadata lookups.
    pub async fn spawn() -> Self {
        Self::spawn_with(&fixture_songs(), Arc::new(NoOpMetadataProvider)).await
    }

    /// Spawns a server over an arbitrary corpus.
    pub async fn spawn_with_songs(songs: &[NewSong]) -> Self {
        Self::spawn_with(songs, Arc::new(NoOpMetadataProvider)).await
    }

    /// Spawns a server whose Spotify client points at `base_url`.
    pub async fn spawn_with_spotify(base_url: &str) -> Self {
        let mut config = SpotifyConfig::new("test-client", "test-secret");
        config.auth_url = format!("{}/api/token", base_url);
        config.api_base = format!("{}/v1", base_url);
        let client = SpotifyClient::new(config).expect("Failed to build Spotify client");
        Self::spawn_with(&fixture_songs(), Arc::new(client)).await
    }

    /// Spawns a server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound,
    /// or the server doesn't become ready within timeout.
    pub async fn spawn_with(
        songs: &[NewSong],
        metadata_provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        let (temp_db_dir, _db_path, store) =
            create_test_db(songs).expect("Failed to create test database");
        let song_store = Arc::new(store);

        let corpus = song_store.get_all_songs().expect("Failed to load songs");
        let encoder = Arc::new(EncoderHandle::new(FeatureEncoder::build(&corpus)));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let admin_listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind admin port");
        let admin_port = admin_listener
            .local_addr()
            .expect("Failed to get admin address")
            .port();
        let admin_url = format!("http://127.0.0.1:{}", admin_port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            metrics_port: admin_port,
            requests_logging_level: RequestsLoggingLevel::None,
            catalog_cache_age_sec: 0,
            ..Default::default()
        };
        let state = ServerState::new(
            config,
            song_store.clone(),
            encoder,
            metadata_provider,
        );
        let admin_app = make_admin_app(state.clone());
        let app = make_app(state);

        let (admin_shutdown_tx, admin_shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(admin_listener, admin_app)
                .with_graceful_shutdown(async {
                    admin_shutdown_rx.await.ok();
                })
                .await
                .expect("Admin server failed");
        });

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                    admin_shutdown_tx.send(()).ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            admin_url,
            song_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::new();
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
