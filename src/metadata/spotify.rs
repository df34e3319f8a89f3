//! Spotify Web API client using the client-credentials flow.

use super::provider::{MetadataProvider, TrackPreview};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
/// Tokens are refreshed this long before Spotify says they expire.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub api_base: String,
}

impl SpotifyConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            api_base: SPOTIFY_API_BASE.to_string(),
        }
    }
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TrackResponse {
    preview_url: Option<String>,
    duration_ms: Option<u64>,
    album: Option<AlbumResponse>,
}

#[derive(Deserialize)]
struct AlbumResponse {
    #[serde(default)]
    images: Vec<ImageResponse>,
}

#[derive(Deserialize)]
struct ImageResponse {
    url: String,
}

pub struct SpotifyClient {
    client: Client,
    config: SpotifyConfig,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting Spotify access token");
        let response = self
            .client
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Spotify token request failed")?;

        if !response.status().is_success() {
            bail!("Spotify token request failed with status {}", response.status());
        }

        let body: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Spotify token response")?;
        let lifetime = body
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);

        *cached = Some(CachedToken {
            access_token: body.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(body.access_token)
    }
}

/// Builds `{api_base}/tracks/{id}` with the id as a single escaped path segment.
fn track_url(api_base: &str, external_id: &str) -> Result<Url> {
    let mut url =
        Url::parse(api_base).with_context(|| format!("Invalid Spotify API base {}", api_base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Spotify API base {} cannot hold a path", api_base))?
        .pop_if_empty()
        .push("tracks")
        .push(external_id);
    Ok(url)
}

#[async_trait]
impl MetadataProvider for SpotifyClient {
    fn is_enabled(&self) -> bool {
        !self.config.client_id.is_empty() && !self.config.client_secret.is_empty()
    }

    async fn get_track_preview(&self, external_id: &str) -> Result<Option<TrackPreview>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let url = track_url(&self.config.api_base, external_id)?;
        let token = self.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("Spotify track request failed for {}", external_id))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown")
                    .to_string();
                warn!("Spotify rate limited, retry after {}s", retry_after);
                return Ok(None);
            }
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                bail!("Spotify track request failed with status {}", status)
            }
            _ => {}
        }

        let track: TrackResponse = response
            .json()
            .await
            .context("Failed to parse Spotify track response")?;
        let cover_url = track
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url);

        Ok(Some(TrackPreview {
            preview_url: track.preview_url,
            cover_url,
            duration_ms: track.duration_ms,
        }))
    }
}
