//! Fetch module
//!
//! The single collaborator a store depends on: something that maps a cursor
//! to a page.
//!
//! # Features
//!
//! - **Fetcher trait**: Async, object-safe, implemented by any type or by a closure via [`fetch_fn`]
//! - **Automatic Retries**: Configurable retry layer with constant, linear or exponential backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Timeouts**: Per-fetch deadline, since the store itself never times out

mod fetcher;
mod rate_limit;
mod retry;
mod timeout;

pub use fetcher::{fetch_fn, FnFetcher, Fetcher, SharedFetcher};
pub use rate_limit::{RateLimitedFetcher, RateLimiter, RateLimiterConfig};
pub use retry::{RetryConfig, RetryFetcher};
pub use timeout::TimeoutFetcher;
