//! Snapshot of a store's published state

use super::view::{LoadMoreState, ViewState};
use crate::error::FetchError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Immutable copy of a store's state after one transition
///
/// Items are shared behind an `Arc`, so cloning a snapshot never copies the list.
#[derive(Debug, Clone)]
pub struct Snapshot<I, C> {
    /// Overall list lifecycle
    pub view_state: ViewState,
    /// Accumulated items, in page order
    pub items: Arc<Vec<I>>,
    /// Trailing pagination state
    pub load_more_state: LoadMoreState,
    /// A refresh is in flight while prior data is shown
    pub is_refreshing: bool,
    /// Cursor of the most recently applied page
    pub current_cursor: C,
    /// Cursor of the next page, absent once pagination ended
    pub next_cursor: Option<C>,
    /// Operation generation this snapshot belongs to
    pub generation: u64,
    /// When a page was last applied successfully
    pub last_loaded_at: Option<DateTime<Utc>>,
}

impl<I, C> Snapshot<I, C> {
    /// The state of a freshly constructed store
    pub fn initial(cursor: C) -> Self {
        Self {
            view_state: ViewState::Idle,
            items: Arc::new(Vec::new()),
            load_more_state: LoadMoreState::Idle,
            is_refreshing: false,
            current_cursor: cursor,
            next_cursor: None,
            generation: 0,
            last_loaded_at: None,
        }
    }

    /// Whether another page can be requested
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Number of accumulated items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are held
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an initial load is in flight
    pub fn is_loading(&self) -> bool {
        self.view_state.is_loading()
    }

    /// Whether any fetch is in flight
    pub fn is_busy(&self) -> bool {
        self.view_state.is_loading()
            || self.is_refreshing
            || self.load_more_state == LoadMoreState::Loading
    }

    /// The blocking failure, if the view is failed
    pub fn error(&self) -> Option<&FetchError> {
        self.view_state.error()
    }

    /// Items as a slice
    pub fn items(&self) -> &[I] {
        &self.items
    }
}

/// Counters kept by a store over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Pages fetched and applied
    pub pages_fetched: usize,
    /// Items received across applied pages
    pub items_loaded: usize,
    /// Fetches that failed and were applied as failures
    pub failures: usize,
    /// Results discarded because a newer operation had started
    pub stale_dropped: usize,
    /// In-flight operations aborted by a newer one
    pub superseded: usize,
}

impl StoreStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied page
    pub fn add_page(&mut self, items: usize) {
        self.pages_fetched += 1;
        self.items_loaded += items;
    }

    /// Record an applied failure
    pub fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Record a dropped stale result
    pub fn add_stale(&mut self) {
        self.stale_dropped += 1;
    }

    /// Record a superseded operation
    pub fn add_superseded(&mut self) {
        self.superseded += 1;
    }
}
