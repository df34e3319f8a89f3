use super::provider::{MetadataProvider, TrackPreview};
use crate::recommender::ScoredCandidate;
use crate::server::metrics::record_metadata_lookup;
use crate::song_store::Song;
use futures::future::join_all;
use tracing::warn;

/// Looks up a single song's preview, degrading every failure to `None`.
pub async fn preview_for_song(provider: &dyn MetadataProvider, song: &Song) -> Option<TrackPreview> {
    if !provider.is_enabled() {
        return None;
    }
    let spotify_id = song.spotify_id.as_deref().filter(|id| !id.is_empty())?;

    match provider.get_track_preview(spotify_id).await {
        Ok(Some(preview)) => {
            record_metadata_lookup("found");
            Some(preview)
        }
        Ok(None) => {
            record_metadata_lookup("missing");
            None
        }
        Err(err) => {
            record_metadata_lookup("error");
            warn!("Metadata lookup failed for song {}: {:#}", song.id, err);
            None
        }
    }
}

/// Fetches previews for ranked songs concurrently.
///
/// The result is index-aligned with `ranked`; ranking order is never touched.
pub async fn enrich(
    provider: &dyn MetadataProvider,
    ranked: &[ScoredCandidate],
) -> Vec<Option<TrackPreview>> {
    join_all(
        ranked
            .iter()
            .map(|candidate| preview_for_song(provider, &candidate.song)),
    )
    .await
}
