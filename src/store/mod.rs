//! Page store module
//!
//! The pagination state machine.
//!
//! # Overview
//!
//! A [`PageStore`] owns one paged list: its cursor, accumulated items and
//! loading states. Callers drive it with four fire-and-forget actions:
//!
//! - `load_initial` - reset and fetch the first page (no-op while loading)
//! - `refresh` - fetch the first page again, keeping current items visible
//! - `load_more` - append the next page (only when loaded, with more data, and idle)
//! - `retry` - re-run whichever operation last failed
//!
//! Every action bumps a generation counter. A fetch result is applied only if
//! its generation is still current, so a slow superseded fetch can never
//! overwrite newer state. Failures are absorbed into the published state and
//! never returned to the caller.
//!
//! Observers either register a listener with [`PageStore::subscribe`]
//! (synchronous, ordered delivery of every snapshot) or take a
//! `tokio::sync::watch` receiver with [`PageStore::watch`].

mod page_store;
mod subscription;

pub use page_store::PageStore;
pub use subscription::{Listener, Subscription};
