//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base address of the backend REST API, e.g. `http://localhost:8000/api`.
    pub api_base_url: Url,
    /// Origin of the web front end, used to build public share links.
    pub app_origin: String,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` uses the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Backend and Front End Addresses ---
        let api_base_url_str =
            lookup("API_BASE_URL").unwrap_or_else(|| "http://localhost:8000/api".to_string());
        let api_base_url = parse_base_url(&api_base_url_str)?;

        let app_origin =
            lookup("APP_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());
        Url::parse(&app_origin)
            .map_err(|e| ConfigError::InvalidValue("APP_ORIGIN".to_string(), e.to_string()))?;

        // --- Persisted Session ---
        let session_file = lookup("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".pdf_portal/session.json"));

        // --- Request Settings ---
        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "30".to_string());
        let timeout_secs = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REQUEST_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            app_origin: app_origin.trim_end_matches('/').to_string(),
            session_file,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level,
        })
    }

    /// Replaces the backend address, e.g. from a command-line flag.
    pub fn with_api_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = parse_base_url(raw)?;
        Ok(self)
    }
}

/// Endpoint paths are appended to the base, so it must end without a slash.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidValue("API_BASE_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue(
            "API_BASE_URL".to_string(),
            format!("'{}' cannot be used as a base address", raw),
        ));
    }
    Ok(url)
}
