//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;

/// Default number of index entries retained before eviction kicks in
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Default TTL for endpoints without a dedicated entry (15 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

// == Cache Config ==
/// Retention policy for the expiring cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of index entries kept after any write
    pub max_entries: usize,
    /// TTL applied to endpoints missing from `endpoint_ttls`
    pub default_ttl: Duration,
    /// Per-endpoint TTL table
    pub endpoint_ttls: HashMap<String, Duration>,
}

impl CacheConfig {
    /// Creates a config with no endpoint-specific TTLs.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            max_entries,
            default_ttl,
            endpoint_ttls: HashMap::new(),
        }
    }

    /// Sets the TTL for one endpoint.
    pub fn with_endpoint_ttl(mut self, endpoint: impl Into<String>, ttl: Duration) -> Self {
        self.endpoint_ttls.insert(endpoint.into(), ttl);
        self
    }

    /// Resolves the TTL for `endpoint`, falling back to the default.
    pub fn ttl_for(&self, endpoint: &str) -> Duration {
        self.endpoint_ttls
            .get(endpoint)
            .copied()
            .unwrap_or(self.default_ttl)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_TTL)
            // Movers change quickly during market hours
            .with_endpoint_ttl("TOP_GAINERS_LOSERS", Duration::from_secs(5 * 60))
            .with_endpoint_ttl("COMPANY_OVERVIEW", Duration::from_secs(60 * 60))
            .with_endpoint_ttl("SYMBOL_SEARCH", Duration::from_secs(30 * 60))
    }
}

// == Config ==
/// Application configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached responses
    pub max_entries: usize,
    /// Default TTL in seconds for endpoints without a dedicated TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Maintenance sweep interval in seconds
    pub cleanup_interval: u64,
    /// Market data API key
    pub api_key: String,
    /// Market data API base URL
    pub api_base_url: String,
    /// Remote request timeout in milliseconds
    pub api_timeout_ms: u64,
    /// Location of the persistent cache store file
    pub store_path: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_SIZE` - Maximum cached responses (default: 50)
    /// - `DEFAULT_TTL_SECS` - Fallback TTL in seconds (default: 900)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL_SECS` - Maintenance sweep frequency (default: 300)
    /// - `API_KEY` - Market data API key (default: "demo")
    /// - `API_BASE_URL` - Market data API root (default: Alpha Vantage)
    /// - `API_TIMEOUT_MS` - Remote request timeout (default: 5000)
    /// - `CACHE_STORE_PATH` - Store file (default: platform data dir)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_env("MAX_CACHE_SIZE").unwrap_or(defaults.max_entries),
            default_ttl: parse_env("DEFAULT_TTL_SECS").unwrap_or(defaults.default_ttl),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_env("CLEANUP_INTERVAL_SECS")
                .unwrap_or(defaults.cleanup_interval),
            api_key: env::var("API_KEY").unwrap_or(defaults.api_key),
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            api_timeout_ms: parse_env("API_TIMEOUT_MS").unwrap_or(defaults.api_timeout_ms),
            store_path: env::var("CACHE_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
        }
    }

    /// Builds the cache retention policy from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.max_entries,
            default_ttl: Duration::from_secs(self.default_ttl),
            ..CacheConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL.as_secs(),
            server_port: 3000,
            cleanup_interval: 300,
            api_key: "demo".to_string(),
            api_base_url: "https://www.alphavantage.co".to_string(),
            api_timeout_ms: 5000,
            store_path: default_store_path(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// `<data dir>/stockwatch/cache_store.json`, or the working directory when
/// no home directory can be resolved.
fn default_store_path() -> PathBuf {
    ProjectDirs::from("", "", "stockwatch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cache_store.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.default_ttl, 900);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.api_key, "demo");
        assert_eq!(config.api_timeout_ms, 5000);
        assert!(config.store_path.ends_with("cache_store.json"));
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("MAX_CACHE_SIZE");
        env::remove_var("DEFAULT_TTL_SECS");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL_SECS");

        let config = Config::from_env();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.default_ttl, 900);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 300);
    }

    #[test]
    fn test_endpoint_ttls() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_for("TOP_GAINERS_LOSERS"), Duration::from_secs(300));
        assert_eq!(config.ttl_for("COMPANY_OVERVIEW"), Duration::from_secs(3600));
        assert_eq!(config.ttl_for("SYMBOL_SEARCH"), Duration::from_secs(1800));
    }

    #[test]
    fn test_unknown_endpoint_uses_default_ttl() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_for("TIME_SERIES_DAILY"), DEFAULT_TTL);
        assert_eq!(config.ttl_for("SOMETHING_ELSE"), DEFAULT_TTL);
    }

    #[test]
    fn test_cache_config_from_app_config() {
        let config = Config {
            max_entries: 10,
            default_ttl: 60,
            ..Config::default()
        };
        let cache = config.cache_config();
        assert_eq!(cache.max_entries, 10);
        assert_eq!(cache.default_ttl, Duration::from_secs(60));
        assert_eq!(cache.ttl_for("COMPANY_OVERVIEW"), Duration::from_secs(3600));
    }
}
