use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all BeatLens metrics
const PREFIX: &str = "beatlens";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Recommendations
    pub static ref RECOMMENDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_recommendations_total"),
            "Recommendation requests by outcome"
        ),
        &["outcome"]
    ).expect("Failed to create recommendations_total metric");

    pub static ref RECOMMENDATION_CANDIDATES: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_recommendation_candidates"),
            "Number of songs surviving the candidate filter"
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0])
    ).expect("Failed to create recommendation_candidates metric");

    pub static ref RECOMMENDATION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_recommendation_duration_seconds"),
            "Filter and rank duration in seconds"
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0])
    ).expect("Failed to create recommendation_duration_seconds metric");

    // Metadata provider
    pub static ref METADATA_LOOKUPS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_metadata_lookups_total"),
            "Track metadata lookups by outcome"
        ),
        &["outcome"]
    ).expect("Failed to create metadata_lookups_total metric");

    // Catalog
    pub static ref SONGS_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_songs_total"),
        "Number of songs in the catalog"
    ).expect("Failed to create songs_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_CANDIDATES.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(METADATA_LOOKUPS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SONGS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn set_songs_total(count: usize) {
    SONGS_TOTAL.set(count as f64);
}

/// Collapses concrete paths into route templates to keep label cardinality bounded.
pub fn route_label(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/health" => "/health",
        "/api/recommend" => "/api/recommend",
        "/api/genres" => "/api/genres",
        "/api/moods" => "/api/moods",
        "/api/encoder/rebuild" => "/api/encoder/rebuild",
        p if p.starts_with("/api/song/") => "/api/song/{id}",
        p if p.starts_with("/api/") => "/api/other",
        _ => "static",
    }
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Records a completed recommendation run. `outcome` is one of
/// `ok`, `empty_corpus`, `no_candidates` or `invalid`.
pub fn record_recommendation(outcome: &str, candidates: usize, duration: Duration) {
    RECOMMENDATIONS_TOTAL.with_label_values(&[outcome]).inc();
    RECOMMENDATION_CANDIDATES.observe(candidates as f64);
    RECOMMENDATION_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn record_metadata_lookup(outcome: &str) {
    METADATA_LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
