//! Fetcher trait and closure adapter

use crate::error::{BoxError, FetchError};
use crate::types::{PageCursor, PageItem, PageResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Source of pages for a store
///
/// Implementations may be called repeatedly and concurrently. A store may drop
/// the returned future before it resolves; nothing else is assumed about
/// cancellation.
#[async_trait]
pub trait Fetcher<I, C>: Send + Sync {
    /// Fetch the page at `cursor`
    async fn fetch_page(&self, cursor: C) -> Result<PageResult<I, C>, FetchError>;
}

/// Type-erased fetcher shared between a store and its layers
pub type SharedFetcher<I, C> = Arc<dyn Fetcher<I, C>>;

/// Fetcher backed by an async closure
///
/// Created with [`fetch_fn`].
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

/// Turn an async closure into a [`Fetcher`]
///
/// Any error type convertible into a boxed error is accepted and normalized
/// into a [`FetchError`].
///
/// ```rust,ignore
/// let fetcher = fetch_fn(|page: u32| async move {
///     Ok::<_, FetchError>(PageResult::with_next(vec![page], page + 1))
/// });
/// ```
pub fn fetch_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher { f }
}

#[async_trait]
impl<I, C, F, Fut, E> Fetcher<I, C> for FnFetcher<F>
where
    I: PageItem,
    C: PageCursor,
    F: Fn(C) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult<I, C>, E>> + Send,
    E: Into<BoxError> + Send + 'static,
{
    async fn fetch_page(&self, cursor: C) -> Result<PageResult<I, C>, FetchError> {
        (self.f)(cursor)
            .await
            .map_err(|e| FetchError::from_boxed(e.into()))
    }
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish()
    }
}
