mod file_config;

pub use file_config::{FileConfig, SpotifyFileConfig};

use crate::metadata::{SpotifyConfig, SPOTIFY_API_BASE, SPOTIFY_AUTH_URL};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub catalog_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub cors_origins: Vec<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub catalog_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub cors_origins: Vec<String>,

    /// Present only when both client id and secret are configured.
    pub spotify: Option<SpotifyConfig>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in config file")
            })?;

        // The file itself may not exist yet, its directory must
        let db_dir = match db_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !db_dir.is_dir() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let catalog_cache_age_sec = file
            .catalog_cache_age_sec
            .unwrap_or(cli.catalog_cache_age_sec);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let cors_origins = file
            .cors_origins
            .unwrap_or_else(|| cli.cors_origins.clone());

        let spotify_file = file.spotify.unwrap_or_default();
        let client_id = spotify_file
            .client_id
            .or_else(|| cli.spotify_client_id.clone())
            .filter(|s| !s.is_empty());
        let client_secret = spotify_file
            .client_secret
            .or_else(|| cli.spotify_client_secret.clone())
            .filter(|s| !s.is_empty());
        let spotify = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyConfig {
                client_id,
                client_secret,
                auth_url: spotify_file
                    .auth_url
                    .unwrap_or_else(|| SPOTIFY_AUTH_URL.to_string()),
                api_base: spotify_file
                    .api_base
                    .unwrap_or_else(|| SPOTIFY_API_BASE.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            db_path,
            port,
            metrics_port,
            logging_level,
            catalog_cache_age_sec,
            frontend_dir_path,
            cors_origins,
            spotify,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            catalog_cache_age_sec: self.catalog_cache_age_sec,
            frontend_dir_path: self.frontend_dir_path.clone(),
            cors_origins: self.cors_origins.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with_db(dir: &TempDir) -> CliConfig {
        CliConfig {
            db_path: Some(dir.path().join("beatlens.db")),
            port: 8000,
            metrics_port: 9091,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("BODY"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::Headers,
            catalog_cache_age_sec: 60,
            frontend_dir_path: Some("/frontend".to_string()),
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..cli_with_db(&temp_dir)
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_path, temp_dir.path().join("beatlens.db"));
        assert_eq!(config.port, 8000);
        assert_eq!(config.metrics_port, 9091);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.catalog_cache_age_sec, 60);
        assert_eq!(config.frontend_dir_path, Some("/frontend".to_string()));
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert!(config.spotify.is_none());
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(PathBuf::from("/should/be/overridden/beatlens.db")),
            cors_origins: vec!["http://cli.example".to_string()],
            ..cli_with_db(&temp_dir)
        };

        let file_config = FileConfig {
            db_path: Some(
                temp_dir
                    .path()
                    .join("from_toml.db")
                    .to_string_lossy()
                    .to_string(),
            ),
            port: Some(4000),
            logging_level: Some("body".to_string()),
            cors_origins: Some(vec!["http://toml.example".to_string()]),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.db_path, temp_dir.path().join("from_toml.db"));
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.cors_origins, vec!["http://toml.example"]);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.metrics_port, 9091);
    }

    #[test]
    fn test_resolve_missing_db_path_error() {
        let result = AppConfig::resolve(&CliConfig::default(), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_path must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_path: Some(PathBuf::from("/nonexistent/path/that/should/not/exist/x.db")),
            port: 1,
            metrics_port: 2,
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_same_ports_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            metrics_port: 8000,
            ..cli_with_db(&temp_dir)
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("must differ"));
    }

    #[test]
    fn test_spotify_requires_both_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            spotify_client_id: Some("id".to_string()),
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).unwrap().spotify.is_none());

        let file_config = FileConfig {
            spotify: Some(SpotifyFileConfig {
                client_secret: Some("secret".to_string()),
                api_base: Some("http://localhost:1/v1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let spotify = AppConfig::resolve(&cli, Some(file_config))
            .unwrap()
            .spotify
            .unwrap();
        assert_eq!(spotify.client_id, "id");
        assert_eq!(spotify.client_secret, "secret");
        assert_eq!(spotify.auth_url, SPOTIFY_AUTH_URL);
        assert_eq!(spotify.api_base, "http://localhost:1/v1");
    }

    #[test]
    fn test_server_config_carries_resolved_values() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_db(&temp_dir), None).unwrap();
        let server_config = config.server_config();
        assert_eq!(server_config.port, 8000);
        assert_eq!(server_config.metrics_port, 9091);
    }
}
