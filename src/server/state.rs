use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;
use crate::metadata::MetadataProvider;
use crate::recommender::EncoderHandle;
use crate::song_store::SongStore;

pub type GuardedSongStore = Arc<dyn SongStore>;
pub type GuardedEncoder = Arc<EncoderHandle>;
pub type GuardedMetadataProvider = Arc<dyn MetadataProvider>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub song_store: GuardedSongStore,
    pub encoder: GuardedEncoder,
    pub metadata_provider: GuardedMetadataProvider,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        song_store: GuardedSongStore,
        encoder: GuardedEncoder,
        metadata_provider: GuardedMetadataProvider,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            song_store,
            encoder,
            metadata_provider,
        }
    }
}

impl FromRef<ServerState> for GuardedSongStore {
    fn from_ref(input: &ServerState) -> Self {
        input.song_store.clone()
    }
}

impl FromRef<ServerState> for GuardedEncoder {
    fn from_ref(input: &ServerState) -> Self {
        input.encoder.clone()
    }
}

impl FromRef<ServerState> for GuardedMetadataProvider {
    fn from_ref(input: &ServerState) -> Self {
        input.metadata_provider.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
