use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default endpoint for the YouTube Data API v3.
pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Credentials and endpoint for the upstream playlist.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: Option<String>,
    pub playlist_id: Option<String>,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl YouTubeConfig {
    /// Returns the key and playlist id when both are present and neither is a
    /// `dummy` placeholder.
    #[must_use]
    pub fn live_credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_deref().filter(|k| !is_placeholder(k))?;
        let playlist = self.playlist_id.as_deref().filter(|p| !is_placeholder(p))?;
        Some((key, playlist))
    }
}

fn is_placeholder(value: &str) -> bool {
    value.trim().is_empty() || value.starts_with("dummy")
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // YouTube
    pub youtube: YouTubeConfig,

    // Sync policy
    pub sync_cooldown: Duration,

    // Database
    pub database_path: PathBuf,

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Admin
    pub admin_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing YouTube credentials are not an error: the fetcher runs as a
    /// no-op until they are provided.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // YouTube
            youtube: YouTubeConfig {
                api_key: optional_env("YOUTUBE_API_KEY"),
                playlist_id: optional_env("YOUTUBE_PLAYLIST_ID"),
                api_base_url: env_or_default("YOUTUBE_API_BASE_URL", DEFAULT_YOUTUBE_API_BASE_URL),
                request_timeout: Duration::from_secs(parse_env_u64("YOUTUBE_TIMEOUT_SECS", 30)?),
            },

            // Sync policy
            sync_cooldown: Duration::from_secs(parse_env_u64("SYNC_COOLDOWN_SECS", 3600)?),

            // Database
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/videos.sqlite")),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,

            // Admin
            admin_token: optional_env("ADMIN_TOKEN"),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.youtube.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "YOUTUBE_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.youtube.api_base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "YOUTUBE_API_BASE_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if let Some(token) = &self.admin_token {
            if token.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: "ADMIN_TOKEN".to_string(),
                    message: "cannot be blank; unset it to disable admin routes".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Configuration for tests: no credentials, in-memory friendly defaults.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            youtube: YouTubeConfig {
                api_key: None,
                playlist_id: None,
                api_base_url: DEFAULT_YOUTUBE_API_BASE_URL.to_string(),
                request_timeout: Duration::from_secs(5),
            },
            sync_cooldown: Duration::from_secs(3600),
            database_path: PathBuf::from("./data/test.sqlite"),
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
            admin_token: Some("test-admin-token".to_string()),
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
