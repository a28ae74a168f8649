//! Configuration Module
//!
//! Loads server, fetch and cache settings from environment variables. Nothing
//! else in the crate reads the environment; the engine receives explicit
//! `FetchConfig` and `CacheConfig` values built here.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::fetch::FetchConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Wiki root that entity paths are appended to
    pub wiki_base_url: String,
    /// Minimum gap between outbound requests in milliseconds
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    pub cache_dir: PathBuf,
    /// Cache entry lifetime in seconds
    pub cache_ttl: u64,
    pub cache_enabled: bool,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `WIKI_BASE_URL` - Wiki root (default: https://leagueoflegends.fandom.com/wiki)
    /// - `RATE_LIMIT_MS` - Minimum request spacing (default: 1000)
    /// - `REQUEST_TIMEOUT` - Request timeout in seconds (default: 30)
    /// - `MAX_RETRIES` - Retries per fetch (default: 3)
    /// - `RETRY_DELAY_MS` - Base backoff delay (default: 500)
    /// - `CACHE_DIR` - Cache directory (default: .cache/wiki_stats)
    /// - `CACHE_TTL` - Entry lifetime in seconds (default: 86400)
    /// - `CACHE_ENABLED` - Enable the disk cache (default: true)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 3600)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            wiki_base_url: env::var("WIKI_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.wiki_base_url),
            rate_limit_ms: env_or("RATE_LIMIT_MS", defaults.rate_limit_ms),
            request_timeout: env_or("REQUEST_TIMEOUT", defaults.request_timeout),
            max_retries: env_or("MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("RETRY_DELAY_MS", defaults.retry_delay_ms),
            cache_dir: env::var_os("CACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            cache_enabled: env_or("CACHE_ENABLED", defaults.cache_enabled),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
        }
    }

    /// Parameters for the fetch client.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            min_interval: Duration::from_millis(self.rate_limit_ms),
            timeout: Duration::from_secs(self.request_timeout),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ..FetchConfig::default()
        }
    }

    /// Parameters for the content cache.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            dir: self.cache_dir.clone(),
            ttl: Duration::from_secs(self.cache_ttl),
            enabled: self.cache_enabled,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wiki_base_url: "https://leagueoflegends.fandom.com/wiki".to_string(),
            rate_limit_ms: 1000,
            request_timeout: 30,
            max_retries: 3,
            retry_delay_ms: 500,
            cache_dir: PathBuf::from(".cache/wiki_stats"),
            cache_ttl: 86_400,
            cache_enabled: true,
            server_port: 3000,
            sweep_interval: 3600,
        }
    }
}
