//! Per-fetch timeout layer

use super::fetcher::{Fetcher, SharedFetcher};
use crate::error::{Error, FetchError};
use crate::types::{PageCursor, PageItem, PageResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Fetcher layer that fails a fetch once `timeout` elapses
///
/// The resulting error is transient, so a retry layer above it retries timeouts.
pub struct TimeoutFetcher<I, C> {
    inner: SharedFetcher<I, C>,
    timeout: Duration,
}

impl<I: PageItem, C: PageCursor> TimeoutFetcher<I, C> {
    /// Wrap `inner` with a deadline per fetch
    pub fn new(inner: SharedFetcher<I, C>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The deadline applied to each fetch
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<I: PageItem, C: PageCursor> Fetcher<I, C> for TimeoutFetcher<I, C> {
    async fn fetch_page(&self, cursor: C) -> Result<PageResult<I, C>, FetchError> {
        let label = format!("{cursor:?}");
        match tokio::time::timeout(self.timeout, self.inner.fetch_page(cursor)).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!("Fetch at {} timed out after {}ms", label, timeout_ms);
                Err(FetchError::from(Error::timeout(timeout_ms)))
            }
        }
    }
}
