//! Retry layer with configurable backoff

use super::fetcher::{Fetcher, SharedFetcher};
use crate::error::FetchError;
use crate::types::{BackoffType, PageCursor, PageItem, PageResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Configuration for fetch retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Initial delay for backoff, in milliseconds
    pub initial_backoff_ms: u64,
    /// Maximum delay for backoff, in milliseconds
    pub max_backoff_ms: u64,
    /// Type of backoff strategy
    pub backoff: BackoffType,
    /// Retry every failure, not only those marked transient
    pub retry_all: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 100,
            max_backoff_ms: 10_000,
            backoff: BackoffType::Exponential,
            retry_all: false,
        }
    }
}

impl RetryConfig {
    /// Create a retry config with `max_retries` and default backoff
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Set backoff configuration
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType, initial: Duration, max: Duration) -> Self {
        self.backoff = backoff;
        self.initial_backoff_ms = initial.as_millis() as u64;
        self.max_backoff_ms = max.as_millis() as u64;
        self
    }

    /// Retry non-transient failures too
    #[must_use]
    pub fn with_retry_all(mut self, retry_all: bool) -> Self {
        self.retry_all = retry_all;
        self
    }

    /// Whether retries are enabled at all
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Whether `err` qualifies for another attempt
    pub fn should_retry(&self, err: &FetchError) -> bool {
        self.retry_all || err.is_retryable()
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let initial = Duration::from_millis(self.initial_backoff_ms);
        let delay = match self.backoff {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => initial.saturating_mul(2u32.saturating_pow(attempt)),
        };

        std::cmp::min(delay, Duration::from_millis(self.max_backoff_ms))
    }
}

/// Fetcher layer that retries failed fetches
pub struct RetryFetcher<I, C> {
    inner: SharedFetcher<I, C>,
    config: RetryConfig,
}

impl<I: PageItem, C: PageCursor> RetryFetcher<I, C> {
    /// Wrap `inner` with the given retry policy
    pub fn new(inner: SharedFetcher<I, C>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// The retry policy in use
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[async_trait]
impl<I: PageItem, C: PageCursor> Fetcher<I, C> for RetryFetcher<I, C> {
    async fn fetch_page(&self, cursor: C) -> Result<PageResult<I, C>, FetchError> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match self.inner.fetch_page(cursor.clone()).await {
                Ok(page) => return Ok(page),
                Err(err) if attempt < max_retries && self.config.should_retry(&err) => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        "Fetch at {:?} failed ({}), attempt {}/{}, retrying in {:?}",
                        cursor,
                        err,
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if attempt > 0 => {
                    return Err(err.context(format!("after {} attempts", attempt + 1)));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
