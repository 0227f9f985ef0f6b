//! Store configuration
//!
//! A [`StoreConfig`] names a store and describes the fetcher layers wrapped
//! around its fetcher: timeout, rate limiting and retries. It can be built in
//! code or loaded from YAML/JSON:
//!
//! ```yaml
//! name: timeline
//! timeout_ms: 5000
//! retry:
//!   max_retries: 3
//!   backoff: exponential
//!   initial_backoff_ms: 200
//! rate_limit:
//!   requests_per_second: 5
//!   burst_size: 2
//! ```

use crate::error::{Error, Result};
use crate::fetch::{
    RateLimitedFetcher, RateLimiterConfig, RetryConfig, RetryFetcher, SharedFetcher,
    TimeoutFetcher,
};
use crate::types::{PageCursor, PageItem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Store Config
// ============================================================================

/// Configuration for a page store and its fetcher layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name used in log output
    pub name: String,

    /// Retry policy for failed fetches
    pub retry: RetryConfig,

    /// Optional rate limit applied to every fetch attempt
    pub rate_limit: Option<RateLimiterConfig>,

    /// Optional per-attempt timeout, in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            retry: RetryConfig::default(),
            rate_limit: None,
            timeout_ms: None,
        }
    }
}

fn default_name() -> String {
    "pagestore".to_string()
}

impl StoreConfig {
    /// Create a new store config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the rate limit
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimiterConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Set the per-attempt timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Per-attempt timeout as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Parse a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_value("name", "must not be empty"));
        }

        if self.timeout_ms == Some(0) {
            return Err(Error::invalid_value("timeout_ms", "must be greater than zero"));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(Error::invalid_value(
                "retry.initial_backoff_ms",
                format!(
                    "{} exceeds retry.max_backoff_ms ({})",
                    self.retry.initial_backoff_ms, self.retry.max_backoff_ms
                ),
            ));
        }

        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "rate_limit.requests_per_second",
                    "must be greater than zero",
                ));
            }
            if rate_limit.burst_size == 0 {
                return Err(Error::invalid_value(
                    "rate_limit.burst_size",
                    "must be greater than zero",
                ));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Layering
    // ========================================================================

    /// Wrap `fetcher` in the layers this config enables
    ///
    /// Order from the inside out: timeout, rate limit, retry. Each retry
    /// attempt therefore waits for the rate limiter and gets its own deadline.
    pub fn layer<I: PageItem, C: PageCursor>(
        &self,
        fetcher: SharedFetcher<I, C>,
    ) -> SharedFetcher<I, C> {
        let mut fetcher = fetcher;

        if let Some(timeout) = self.timeout() {
            fetcher = Arc::new(TimeoutFetcher::new(fetcher, timeout));
        }

        if let Some(rate_limit) = &self.rate_limit {
            fetcher = Arc::new(RateLimitedFetcher::new(fetcher, rate_limit));
        }

        if self.retry.is_enabled() {
            fetcher = Arc::new(RetryFetcher::new(fetcher, self.retry.clone()));
        }

        fetcher
    }
}
