use super::RequestsLoggingLevel;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Max age for cacheable catalog listings (genres, moods).
    pub catalog_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8000,
            metrics_port: 9091,
            catalog_cache_age_sec: 300,
            frontend_dir_path: None,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
        }
    }
}
