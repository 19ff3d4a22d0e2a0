use std::time::Duration;

use thiserror::Error;

use crate::constants::{API_BASE_URL, SITE_BASE_URL};

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

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Upstream endpoints
    pub api_base: String,
    pub site_base: String,

    // Fetch queue
    pub fetch_concurrency: usize,
    pub fetch_rate_limit: usize,
    pub fetch_rate_window: Duration,
    pub request_timeout: Duration,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a default, so an empty environment yields a
    /// working configuration pointed at the real upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Upstream endpoints
            api_base: env_or_default("HN_API_BASE", API_BASE_URL),
            site_base: env_or_default("HN_SITE_BASE", SITE_BASE_URL),

            // Fetch queue
            fetch_concurrency: parse_env_usize("FETCH_CONCURRENCY", 999)?,
            fetch_rate_limit: parse_env_usize("FETCH_RATE_LIMIT", 1000)?,
            fetch_rate_window: Duration::from_millis(parse_env_u64("FETCH_RATE_WINDOW_MS", 1000)?),
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FETCH_CONCURRENCY".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.fetch_rate_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FETCH_RATE_LIMIT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.fetch_rate_window.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "FETCH_RATE_WINDOW_MS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.api_base.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "HN_API_BASE".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.site_base.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "HN_SITE_BASE".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration for tests: localhost, small limits, no real upstream.
    /// Tests override the bases with a mock server's URI.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_base: "http://127.0.0.1:9".to_string(),
            site_base: "http://127.0.0.1:9".to_string(),
            fetch_concurrency: 8,
            fetch_rate_limit: 100,
            fetch_rate_window: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
        }
    }
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

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
