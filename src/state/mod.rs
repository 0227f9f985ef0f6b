//! Published store state
//!
//! Everything an observer of a [`PageStore`](crate::store::PageStore) can see.
//!
//! # Overview
//!
//! The state module provides:
//! - `ViewState` - Lifecycle of the list as a whole (idle, loading, empty, failed, loaded)
//! - `LoadMoreState` - Lifecycle of the trailing load-more cursor
//! - `Snapshot` - Immutable copy of the full state, delivered after every transition
//! - `StoreStats` - Counters for fetches, failures and dropped results

mod snapshot;
mod view;

pub use snapshot::{Snapshot, StoreStats};
pub use view::{LoadMoreState, ViewState};

#[cfg(test)]
mod tests;
