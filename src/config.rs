// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. Leaving `API_BASE_URL`
//! unset puts the service in offline mode, where analytics come from the
//! synthetic generator instead of the backend.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime environment, controls the synthetic fallback on load failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Backend ---
    /// Backend base URL without version segment (None = offline mode)
    pub api_base_url: Option<String>,
    /// API version path segment
    pub api_version: String,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
    pub environment: Environment,

    // --- Analytics pipeline ---
    /// User id mixed into cache keys
    pub user_id: Option<String>,
    pub enable_caching: bool,
    pub cache_timeout: Duration,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    /// Artificial latency of the offline generator
    pub synthetic_delay: Duration,

    // --- Session ---
    /// Persisted token file (None = in-memory tokens)
    pub token_file: Option<PathBuf>,

    // --- Server ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    pub port: u16,
}

impl Config {
    /// Offline, zero-delay configuration for tests.
    pub fn test_default() -> Self {
        Self {
            api_base_url: None,
            api_version: "v1".to_string(),
            request_timeout: Duration::from_secs(5),
            environment: Environment::Production,
            user_id: Some("test-user-123".to_string()),
            enable_caching: true,
            cache_timeout: Duration::from_secs(600),
            auto_refresh: false,
            refresh_interval: Duration::from_secs(300),
            synthetic_delay: Duration::ZERO,
            token_file: None,
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = match env::var("API_BASE_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(normalize_base_url(&raw)?),
            _ => None,
        };

        Ok(Self {
            api_base_url,
            api_version: env::var("API_VERSION").unwrap_or_else(|_| "v1".to_string()),
            request_timeout: Duration::from_secs(parse_var("API_TIMEOUT_SECS", 10)?),
            environment: env::var("APP_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or(Environment::Production),
            user_id: env::var("ANALYTICS_USER_ID")
                .ok()
                .filter(|v| !v.is_empty()),
            enable_caching: parse_flag("ANALYTICS_CACHE_ENABLED", true)?,
            cache_timeout: Duration::from_secs(parse_var("ANALYTICS_CACHE_TIMEOUT_SECS", 600)?),
            auto_refresh: parse_flag("ANALYTICS_AUTO_REFRESH", false)?,
            refresh_interval: Duration::from_secs(parse_var(
                "ANALYTICS_REFRESH_INTERVAL_SECS",
                300,
            )?),
            synthetic_delay: Duration::from_millis(parse_var("SYNTHETIC_DELAY_MS", 1000)?),
            token_file: env::var("TOKEN_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Versioned backend URL, e.g. `https://api.satrf.org.za/api/v1`.
    pub fn api_url(&self) -> Option<String> {
        self.api_base_url.as_ref().map(|base| {
            let version = self.api_version.trim_matches('/');
            if version.is_empty() {
                base.clone()
            } else {
                format!("{}/{}", base, version)
            }
        })
    }

    /// True when no backend is configured.
    pub fn is_offline(&self) -> bool {
        self.api_base_url.is_none()
    }
}

/// Strip trailing slashes and reject URLs reqwest cannot use.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed).map_err(|_| ConfigError::InvalidUrl(trimmed.to_string()))?;
    Ok(trimmed.to_string())
}

fn parse_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API_BASE_URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
