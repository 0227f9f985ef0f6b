//! View and load-more state enums

use crate::error::FetchError;
use std::fmt;

/// Overall loading lifecycle of a paged list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Constructed, nothing attempted yet
    #[default]
    Idle,
    /// Initial load (or refresh with no data) in flight
    Loading,
    /// Last successful load returned zero items
    Empty,
    /// Last initial load (or refresh with no data) failed
    Failed(FetchError),
    /// Last successful load returned at least one item
    Loaded,
}

impl ViewState {
    /// Check if an initial load is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the list is loaded with items
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Check if the last load failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Short lowercase name, used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Empty => "empty",
            Self::Failed(_) => "failed",
            Self::Loaded => "loaded",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(err) => write!(f, "failed({err})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// State of the trailing load-more cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMoreState {
    /// Nothing in flight; more data may be available
    #[default]
    Idle,
    /// A load-more fetch is in flight
    Loading,
    /// The data source reported no further pages
    NoMoreData,
    /// The last load-more attempt failed
    Failed,
}

impl LoadMoreState {
    /// Short camelCase name, used in logs and CLI output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::NoMoreData => "noMoreData",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LoadMoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
