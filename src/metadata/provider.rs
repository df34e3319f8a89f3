use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Playback preview and artwork for a track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPreview {
    pub preview_url: Option<String>,
    pub cover_url: Option<String>,
    pub duration_ms: Option<u64>,
}

/// Source of third-party track metadata, consulted after ranking.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Looks up a track by its external id.
    ///
    /// `Ok(None)` means the provider had nothing to offer (unknown track,
    /// rate limited, disabled); `Err` is a failed lookup.
    async fn get_track_preview(&self, external_id: &str) -> Result<Option<TrackPreview>>;
}

/// Provider used when no credentials are configured.
pub struct NoOpMetadataProvider;

#[async_trait]
impl MetadataProvider for NoOpMetadataProvider {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn get_track_preview(&self, _external_id: &str) -> Result<Option<TrackPreview>> {
        Ok(None)
    }
}
