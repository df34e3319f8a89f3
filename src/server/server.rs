use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use super::error::{ApiError, ApiResult};
use super::metrics::{metrics_handler, record_recommendation, set_songs_total};
use super::{http_cache, log_requests, state::*, ServerConfig};
use crate::metadata::{enrich, preview_for_song, TrackPreview};
use crate::recommender::reason::explain;
use crate::recommender::{recommend, Mood, Tempo, UserProfile};
use crate::song_store::Song;

pub const MIN_K: i64 = 1;
pub const MAX_K: i64 = 20;
const DEFAULT_K: i64 = 5;

const EMPTY_CORPUS_MESSAGE: &str = "No songs in database";
const NO_CANDIDATES_MESSAGE: &str = "Maaf, belum ada lagu yang cocok. Coba ubah genre atau tempo.";

#[derive(Serialize)]
struct HomeResponse {
    message: &'static str,
    version: &'static str,
    docs: &'static str,
    uptime: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    songs: usize,
    spotify: &'static str,
}

fn default_k() -> i64 {
    DEFAULT_K
}

#[derive(Deserialize, Debug)]
pub struct RecommendRequest {
    pub mood: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tempo: Option<String>,
    #[serde(default = "default_k")]
    pub k: i64,
}

#[derive(Serialize, Debug)]
struct SongResponse {
    #[serde(flatten)]
    song: SongSummary,
    preview_url: Option<String>,
    cover_url: Option<String>,
}

#[derive(Serialize, Debug)]
struct SongSummary {
    id: i64,
    title: String,
    artist: String,
    genre: String,
    mood: String,
    tempo: String,
    spotify_id: Option<String>,
}

impl From<Song> for SongSummary {
    fn from(song: Song) -> Self {
        SongSummary {
            id: song.id,
            title: song.title,
            artist: song.artist,
            genre: song.genre,
            mood: song.mood,
            tempo: song.tempo,
            spotify_id: song.spotify_id,
        }
    }
}

#[derive(Serialize, Debug)]
struct RecommendationItem {
    #[serde(flatten)]
    song: SongResponse,
    similarity_score: f64,
    reason: String,
}

#[derive(Serialize, Debug, Default)]
struct RecommendationMetadata {
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates_filtered: Option<usize>,
}

#[derive(Serialize, Debug)]
struct RecommendationResponse {
    recommendations: Vec<RecommendationItem>,
    metadata: RecommendationMetadata,
}

impl RecommendationResponse {
    fn empty(message: &'static str) -> Self {
        RecommendationResponse {
            recommendations: vec![],
            metadata: RecommendationMetadata {
                count: 0,
                message: Some(message),
                ..Default::default()
            },
        }
    }
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn round_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}

fn song_response(song: Song, preview: Option<TrackPreview>) -> SongResponse {
    let (preview_url, cover_url) = match preview {
        Some(preview) => (preview.preview_url, preview.cover_url),
        None => (None, None),
    };
    SongResponse {
        song: song.into(),
        preview_url,
        cover_url,
    }
}

/// Validated form of a [`RecommendRequest`].
#[derive(Debug)]
struct ValidatedRequest {
    profile: UserProfile,
    k: usize,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn validate_request(request: RecommendRequest) -> ApiResult<ValidatedRequest> {
    let mood = Mood::from_str(&request.mood)?;

    let tempo = non_empty(request.tempo);
    if let Some(tempo) = tempo.as_deref() {
        if Tempo::parse(tempo).is_none() {
            return Err(ApiError::InvalidInput(format!(
                "Invalid tempo: {}. Must be one of slow, medium, fast",
                tempo
            )));
        }
    }

    if !(MIN_K..=MAX_K).contains(&request.k) {
        return Err(ApiError::InvalidInput(format!(
            "k must be between {} and {}, got {}",
            MIN_K, MAX_K, request.k
        )));
    }

    Ok(ValidatedRequest {
        profile: UserProfile::new(mood, non_empty(request.genre), tempo),
        k: request.k as usize,
    })
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HomeResponse {
        message: "Welcome to BeatLens API",
        version: env!("CARGO_PKG_VERSION"),
        docs: "/api",
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

async fn health(State(state): State<ServerState>) -> ApiResult<impl IntoResponse> {
    let songs = state
        .song_store
        .get_songs_count()
        .context("Failed to count songs")?;
    set_songs_total(songs);

    let spotify = if state.metadata_provider.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };
    Ok(Json(HealthResponse {
        status: "healthy",
        database: "connected",
        songs,
        spotify,
    }))
}

async fn post_recommend(
    State(state): State<ServerState>,
    body: Result<Json<RecommendRequest>, JsonRejection>,
) -> ApiResult<Json<RecommendationResponse>> {
    let start = Instant::now();

    let Json(request) = body.map_err(|rejection| {
        record_recommendation("invalid", 0, start.elapsed());
        ApiError::InvalidInput(rejection.body_text())
    })?;
    let request = match validate_request(request) {
        Ok(request) => request,
        Err(err) => {
            record_recommendation("invalid", 0, start.elapsed());
            return Err(err);
        }
    };
    debug!("Recommending for {:?}", request);

    let songs = state
        .song_store
        .get_all_songs()
        .context("Failed to load songs")?;
    if songs.is_empty() {
        record_recommendation("empty_corpus", 0, start.elapsed());
        return Ok(Json(RecommendationResponse::empty(EMPTY_CORPUS_MESSAGE)));
    }

    let encoder = state.encoder.snapshot();
    let outcome = recommend(&encoder, &request.profile, &songs, request.k);
    let profile = match outcome.profile {
        Some(profile) if !outcome.ranked.is_empty() => profile,
        _ => {
            record_recommendation("no_candidates", 0, start.elapsed());
            return Ok(Json(RecommendationResponse::empty(NO_CANDIDATES_MESSAGE)));
        }
    };

    let previews = enrich(state.metadata_provider.as_ref(), &outcome.ranked).await;
    let recommendations: Vec<RecommendationItem> = outcome
        .ranked
        .into_iter()
        .zip(previews)
        .map(|(candidate, preview)| {
            let reason = explain(&candidate, &profile);
            let similarity_score = candidate.similarity_score.unwrap_or(0.0);
            RecommendationItem {
                song: song_response(candidate.song, preview),
                similarity_score,
                reason,
            }
        })
        .collect();

    let elapsed = start.elapsed();
    record_recommendation("ok", outcome.candidates_filtered, elapsed);
    info!(
        "Recommended {} of {} candidates for mood {} in {}ms",
        recommendations.len(),
        outcome.candidates_filtered,
        profile.mood,
        elapsed.as_millis()
    );

    Ok(Json(RecommendationResponse {
        metadata: RecommendationMetadata {
            count: recommendations.len(),
            message: None,
            processing_time: Some(round_millis(elapsed)),
            candidates_filtered: Some(outcome.candidates_filtered),
        },
        recommendations,
    }))
}

async fn get_song(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SongResponse>> {
    let song = state
        .song_store
        .get_song(id)
        .context("Failed to load song")?
        .ok_or_else(|| ApiError::NotFound(format!("Song with ID {} not found", id)))?;

    let preview = preview_for_song(state.metadata_provider.as_ref(), &song).await;
    Ok(Json(song_response(song, preview)))
}

async fn get_genres(State(state): State<ServerState>) -> ApiResult<impl IntoResponse> {
    let genres = state
        .song_store
        .get_genres()
        .context("Failed to load genres")?;
    Ok(Json(serde_json::json!({ "genres": genres })))
}

async fn get_moods() -> impl IntoResponse {
    let moods: Vec<&str> = Mood::ALL.iter().map(|m| m.as_str()).collect();
    Json(serde_json::json!({ "moods": moods }))
}

async fn post_encoder_rebuild(State(state): State<ServerState>) -> ApiResult<impl IntoResponse> {
    let songs = state
        .song_store
        .get_all_songs()
        .context("Failed to load songs")?;
    set_songs_total(songs.len());
    let encoder = state.encoder.rebuild(&songs);
    Ok(Json(serde_json::json!({
        "genres": encoder.genres(),
        "moods": encoder.moods(),
        "dimension": encoder.dimension(),
    })))
}

fn make_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

pub fn make_app(state: ServerState) -> Router {
    let config = state.config.clone();

    let catalog_routes: Router = Router::new()
        .route("/genres", get(get_genres))
        .route("/moods", get(get_moods))
        .layer(middleware::from_fn_with_state(
            config.catalog_cache_age_sec,
            http_cache,
        ))
        .with_state(state.clone());

    let api_routes: Router = Router::new()
        .route("/recommend", post(post_recommend))
        .route("/song/{id}", get(get_song))
        .with_state(state.clone())
        .merge(catalog_routes);

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)).with_state(state.clone()),
    };

    let health_routes: Router = Router::new()
        .route("/health", get(health))
        .with_state(state.clone());

    home_router
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(make_cors_layer(&config.cors_origins))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// Routes served on the metrics port only: Prometheus scraping and
/// operations that change server state.
pub fn make_admin_app(state: ServerState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/api/encoder/rebuild", post(post_encoder_rebuild))
        .with_state(state)
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;
    if let Ok(count) = state.song_store.get_songs_count() {
        set_songs_total(count);
    }

    let admin_app = make_admin_app(state.clone());
    let app = make_app(state);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    info!("Metrics and admin routes available on port {}", metrics_port);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, admin_app).await {
            tracing::error!("Metrics server failed: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::NoOpMetadataProvider;
    use crate::recommender::{EncoderHandle, FeatureEncoder};
    use crate::song_store::{NewSong, SongStore};
    use anyhow::anyhow;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Default)]
    struct InMemorySongStore {
        songs: Mutex<Vec<Song>>,
        broken: bool,
    }

    impl SongStore for InMemorySongStore {
        fn get_all_songs(&self) -> Result<Vec<Song>> {
            if self.broken {
                return Err(anyhow!("disk on fire"));
            }
            Ok(self.songs.lock().unwrap().clone())
        }

        fn get_song(&self, id: i64) -> Result<Option<Song>> {
            Ok(self
                .songs
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        fn get_genres(&self) -> Result<Vec<String>> {
            let mut genres: Vec<String> = self
                .songs
                .lock()
                .unwrap()
                .iter()
                .map(|s| s.genre.clone())
                .collect();
            genres.sort();
            genres.dedup();
            Ok(genres)
        }

        fn get_moods(&self) -> Result<Vec<String>> {
            unimplemented!()
        }

        fn insert_song(&self, song: &NewSong) -> Result<i64> {
            let mut songs = self.songs.lock().unwrap();
            let id = songs.len() as i64 + 1;
            songs.push(Song {
                id,
                title: song.title.clone(),
                artist: song.artist.clone(),
                genre: song.genre.clone(),
                mood: song.mood.clone(),
                tempo: song.tempo.clone(),
                spotify_id: song.spotify_id.clone(),
                features: song.features.clone(),
            });
            Ok(id)
        }

        fn get_songs_count(&self) -> Result<usize> {
            Ok(self.songs.lock().unwrap().len())
        }
    }

    fn new_song(title: &str, genre: &str, mood: &str, tempo: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            artist: "Artist".to_string(),
            genre: genre.to_string(),
            mood: mood.to_string(),
            tempo: tempo.to_string(),
            spotify_id: None,
            features: None,
        }
    }

    fn make_test_app(store: InMemorySongStore) -> Router {
        let songs = store.get_all_songs().unwrap_or_default();
        let state = ServerState::new(
            ServerConfig::default(),
            Arc::new(store),
            Arc::new(EncoderHandle::new(FeatureEncoder::build(&songs))),
            Arc::new(NoOpMetadataProvider),
        );
        make_app(state)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_validate_request_bounds() {
        let request = |k| RecommendRequest {
            mood: "happy".to_string(),
            genre: None,
            tempo: None,
            k,
        };
        assert!(validate_request(request(0)).is_err());
        assert!(validate_request(request(21)).is_err());
        assert_eq!(validate_request(request(20)).unwrap().k, 20);
    }

    #[test]
    fn test_validate_request_treats_empty_strings_as_absent() {
        let validated = validate_request(RecommendRequest {
            mood: "chill".to_string(),
            genre: Some(String::new()),
            tempo: Some(String::new()),
            k: 5,
        })
        .unwrap();
        assert!(validated.profile.genre.is_none());
        assert!(validated.profile.tempo.is_none());
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn rejects_unknown_mood() {
        let app = make_test_app(InMemorySongStore::default());
        let (status, body) = post_json(app, "/api/recommend", r#"{"mood": "angry"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input");
        assert!(body["detail"].as_str().unwrap().contains("angry"));
    }

    #[tokio::test]
    async fn rejects_malformed_body() {
        let app = make_test_app(InMemorySongStore::default());
        let (status, body) = post_json(app, "/api/recommend", r#"{"genre": "pop"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input");
    }

    #[tokio::test]
    async fn encoder_rebuild_is_admin_only() {
        let store = InMemorySongStore::default();
        store
            .insert_song(&new_song("Hujan", "indie", "sedih", "slow"))
            .unwrap();
        let state = ServerState::new(
            ServerConfig::default(),
            Arc::new(store),
            Arc::new(EncoderHandle::new(FeatureEncoder::build(&[]))),
            Arc::new(NoOpMetadataProvider),
        );

        let request = Request::builder()
            .method("POST")
            .uri("/api/encoder/rebuild")
            .body(Body::empty())
            .unwrap();
        let response = make_app(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(state.encoder.snapshot().genres().is_empty());

        let (status, body) =
            post_json(make_admin_app(state.clone()), "/api/encoder/rebuild", "").await;
        assert_eq!(status, StatusCode::OK);
        // 1 mood + 1 genre + tempo
        assert_eq!(body["dimension"], 3);
        assert_eq!(state.encoder.snapshot().genres(), ["indie".to_string()]);
    }

    #[tokio::test]
    async fn malformed_body_counts_as_invalid_recommendation() {
        use crate::server::metrics::RECOMMENDATIONS_TOTAL;

        let invalid = RECOMMENDATIONS_TOTAL.with_label_values(&["invalid"]);
        let before = invalid.get();
        let app = make_test_app(InMemorySongStore::default());
        let (status, _) = post_json(app, "/api/recommend", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(invalid.get() >= before + 1.0);
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() {
        let store = InMemorySongStore {
            broken: true,
            ..Default::default()
        };
        let app = make_test_app(store);
        let (status, body) = post_json(app, "/api/recommend", r#"{"mood": "happy"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn recommends_from_in_memory_store() {
        let store = InMemorySongStore::default();
        store.insert_song(&new_song("A", "pop", "happy", "fast")).unwrap();
        store.insert_song(&new_song("B", "rock", "semangat", "fast")).unwrap();
        let app = make_test_app(store);

        let (status, body) =
            post_json(app, "/api/recommend", r#"{"mood": "happy", "k": 1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["count"], 1);
        assert_eq!(body["metadata"]["candidates_filtered"], 2);
        assert_eq!(body["recommendations"][0]["id"], 1);
        assert!(body["recommendations"][0]["preview_url"].is_null());
    }

    #[tokio::test]
    async fn catalog_routes_are_cacheable() {
        let app = make_test_app(InMemorySongStore::default());
        let request = Request::builder()
            .uri("/api/moods")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "max-age=300"
        );
    }
}
