use reqwest::Url;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8008";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

pub const ENV_BASE_URL: &str = "BUS_API_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "BUS_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "BUS_REQUEST_TIMEOUT_MS";

/// Fixed connection settings for the backend.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: Url,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl DashboardConfig {
    /// Reads the process environment (call `dotenvy::dotenv()` first to pick
    /// up a `.env` file).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to the
    /// defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = parse_base_url(
            lookup(ENV_BASE_URL)
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let poll_interval = parse_millis(
            ENV_POLL_INTERVAL_MS,
            lookup(ENV_POLL_INTERVAL_MS),
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        let request_timeout = parse_millis(
            ENV_REQUEST_TIMEOUT_MS,
            lookup(ENV_REQUEST_TIMEOUT_MS),
            DEFAULT_REQUEST_TIMEOUT_MS,
        )?;

        Ok(Self {
            base_url,
            poll_interval,
            request_timeout,
        })
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    pub fn with_poll_interval_ms(mut self, millis: u64) -> Result<Self, ConfigError> {
        if millis == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "poll interval",
                value: millis.to_string(),
            });
        }
        self.poll_interval = Duration::from_millis(millis);
        Ok(self)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_millis(
    key: &'static str,
    raw: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_millis(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidNumber { key, value: raw }),
    }
}
