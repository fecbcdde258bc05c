// ABOUTME: Process-level configuration for the replay engine — endpoint, cache dir, API key
// ABOUTME: An explicit value built with a builder or loaded from the environment, never a singleton
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://exchange-replay.example.com/api";
const DEFAULT_CACHE_DIR_NAME: &str = ".exchange-replay-cache";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// The fetch worker's bound on concurrent in-flight HTTP downloads (§4.4
/// backpressure requirement).
const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Replay engine configuration, built once and handed to `replay`/`stream`.
///
/// The original source treats this as process-wide init state that cannot
/// be changed after first call; this crate instead threads an explicit
/// value through, tying its lifecycle to the replay/stream call that uses
/// it (see the "process-wide configuration singleton" design note). An
/// application that wants process-wide behavior can still build one
/// `ReplayConfig` at startup and clone/share it — nothing here prevents
/// that, it's just no longer forced.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Base HTTP URL for the slice/metadata endpoints.
    pub endpoint: String,
    /// Absolute directory path used as the on-disk slice cache.
    pub cache_dir: PathBuf,
    /// Bearer token; empty string for unauthenticated access to free data.
    pub api_key: String,
    /// Per-request HTTP timeout for the fetch worker and external readers.
    pub http_timeout: Duration,
    /// Upper bound on concurrent in-flight slice downloads.
    pub max_concurrent_fetches: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            cache_dir: default_cache_dir(),
            api_key: String::new(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// The platform cache directory (`$XDG_CACHE_HOME`, `~/Library/Caches`, ...)
/// joined with our subdirectory name, falling back to the OS temp directory
/// if the platform cache directory can't be resolved (e.g. `$HOME` unset).
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join(DEFAULT_CACHE_DIR_NAME)
}

impl ReplayConfig {
    #[must_use]
    pub fn builder() -> ReplayConfigBuilder {
        ReplayConfigBuilder::default()
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset:
    ///
    /// - `EXCHANGE_REPLAY_ENDPOINT`
    /// - `EXCHANGE_REPLAY_CACHE_DIR`
    /// - `EXCHANGE_REPLAY_API_KEY`
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = env::var("EXCHANGE_REPLAY_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(cache_dir) = env::var("EXCHANGE_REPLAY_CACHE_DIR") {
            config.cache_dir = PathBuf::from(cache_dir);
        }
        if let Ok(api_key) = env::var("EXCHANGE_REPLAY_API_KEY") {
            config.api_key = api_key;
        }
        config
    }
}

/// Builder for [`ReplayConfig`], following the teacher's builder
/// conventions (see `ReplayConfig::builder`).
#[derive(Debug, Default)]
pub struct ReplayConfigBuilder {
    inner: ReplayConfigOverrides,
}

#[derive(Debug, Default)]
struct ReplayConfigOverrides {
    endpoint: Option<String>,
    cache_dir: Option<PathBuf>,
    api_key: Option<String>,
    http_timeout: Option<Duration>,
    max_concurrent_fetches: Option<usize>,
}

impl ReplayConfigBuilder {
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.inner.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.inner.cache_dir = Some(cache_dir.into());
        self
    }

    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.inner.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.inner.http_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn max_concurrent_fetches(mut self, max: usize) -> Self {
        self.inner.max_concurrent_fetches = Some(max);
        self
    }

    #[must_use]
    pub fn build(self) -> ReplayConfig {
        let default = ReplayConfig::default();
        ReplayConfig {
            endpoint: self.inner.endpoint.unwrap_or(default.endpoint),
            cache_dir: self.inner.cache_dir.unwrap_or(default.cache_dir),
            api_key: self.inner.api_key.unwrap_or(default.api_key),
            http_timeout: self.inner.http_timeout.unwrap_or(default.http_timeout),
            max_concurrent_fetches: self
                .inner
                .max_concurrent_fetches
                .unwrap_or(default.max_concurrent_fetches),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ReplayConfig::builder()
            .endpoint("https://custom.example.com")
            .api_key("secret")
            .build();
        assert_eq!(config.endpoint, "https://custom.example.com");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.max_concurrent_fetches, DEFAULT_MAX_CONCURRENT_FETCHES);
    }

    #[test]
    fn default_cache_dir_is_named_consistently() {
        let config = ReplayConfig::default();
        assert_eq!(
            config.cache_dir.file_name().and_then(|name| name.to_str()),
            Some(DEFAULT_CACHE_DIR_NAME)
        );
    }
}
