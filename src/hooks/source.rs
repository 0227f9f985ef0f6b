//! Action surface shared by stores and decorators

use crate::error::Error;
use crate::state::Snapshot;
use crate::store::{PageStore, Subscription};
use crate::types::{PageCursor, PageItem};
use std::fmt;
use std::str::FromStr;

/// An action a consumer can invoke on a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LoadInitial,
    Refresh,
    LoadMore,
    Retry,
}

impl Action {
    /// Short name, used in logs and CLI scripts
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadInitial => "load",
            Self::Refresh => "refresh",
            Self::LoadMore => "more",
            Self::Retry => "retry",
        }
    }

    /// Invoke this action on `source`
    pub fn apply<I, C, S>(self, source: &S)
    where
        S: PageSource<I, C> + ?Sized,
    {
        match self {
            Self::LoadInitial => source.load_initial(),
            Self::Refresh => source.refresh(),
            Self::LoadMore => source.load_more(),
            Self::Retry => source.retry(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "load" | "initial" | "load_initial" | "load-initial" => Ok(Self::LoadInitial),
            "refresh" => Ok(Self::Refresh),
            "more" | "load_more" | "load-more" => Ok(Self::LoadMore),
            "retry" => Ok(Self::Retry),
            other => Err(Error::invalid_value(
                "action",
                format!("unknown action '{other}' (expected load, refresh, more or retry)"),
            )),
        }
    }
}

/// Fire-and-forget action surface of a paged list
pub trait PageSource<I, C>: Send + Sync {
    /// Reset and fetch the first page
    fn load_initial(&self);

    /// Fetch the first page again, keeping current items visible
    fn refresh(&self);

    /// Append the next page
    fn load_more(&self);

    /// Re-run the operation that failed
    fn retry(&self);

    /// Copy of the current state
    fn snapshot(&self) -> Snapshot<I, C>;

    /// Register a listener for every future snapshot
    fn subscribe(&self, listener: Box<dyn Fn(&Snapshot<I, C>) + Send + Sync>) -> Subscription;
}

impl<I: PageItem, C: PageCursor> PageSource<I, C> for PageStore<I, C> {
    fn load_initial(&self) {
        PageStore::load_initial(self);
    }

    fn refresh(&self) {
        PageStore::refresh(self);
    }

    fn load_more(&self) {
        PageStore::load_more(self);
    }

    fn retry(&self) {
        PageStore::retry(self);
    }

    fn snapshot(&self) -> Snapshot<I, C> {
        PageStore::snapshot(self)
    }

    fn subscribe(&self, listener: Box<dyn Fn(&Snapshot<I, C>) + Send + Sync>) -> Subscription {
        PageStore::subscribe(self, listener)
    }
}
