//! Common types used throughout pagestore
//!
//! This module contains the page value returned by fetchers, the bounds
//! placed on item and cursor types, and small shared enums.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// ============================================================================
// Item / Cursor Bounds
// ============================================================================

/// Bound for list items held by a store
///
/// Items are never inspected; they only need to be cloneable and shareable
/// across the task that runs the fetch.
pub trait PageItem: Clone + Send + Sync + 'static {}

impl<T> PageItem for T where T: Clone + Send + Sync + 'static {}

/// Bound for pagination cursors
///
/// Cursors are opaque. The store threads them between fetches and only
/// checks whether a next cursor is present.
pub trait PageCursor: Clone + Debug + Send + Sync + 'static {}

impl<T> PageCursor for T where T: Clone + Debug + Send + Sync + 'static {}

// ============================================================================
// Page Result
// ============================================================================

/// One page returned by a fetcher
///
/// An absent `next_cursor` is the only end-of-data signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<I, C> {
    /// Items of this page, in page order
    pub items: Vec<I>,
    /// Cursor of the following page
    pub next_cursor: Option<C>,
}

impl<I, C> PageResult<I, C> {
    /// Create a page with an optional continuation
    pub fn new(items: Vec<I>, next_cursor: Option<C>) -> Self {
        Self { items, next_cursor }
    }

    /// Create a page that is followed by `next`
    pub fn with_next(items: Vec<I>, next: C) -> Self {
        Self::new(items, Some(next))
    }

    /// Create the final page
    pub fn last(items: Vec<I>) -> Self {
        Self::new(items, None)
    }

    /// Whether another page follows
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Number of items in this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy between fetch retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level accepted by the CLI and configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
