// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # PageStore
//!
//! A state machine for paginated lists: load the first page, refresh it,
//! append further pages and retry failures, with every in-flight fetch
//! cancelled as soon as a newer operation supersedes it.
//!
//! ## Features
//!
//! - **Observable state**: View state, load-more state, accumulated items and cursors as one snapshot
//! - **Supersession**: A newer operation aborts the previous fetch; late results are dropped
//! - **Listeners**: Ordered, synchronous delivery of every transition, plus `watch`/`Stream` access
//! - **Fetch layers**: Retry with backoff, rate limiting and timeouts around any fetcher
//! - **Decorators**: Hooks around actions and transitions, composed from the outside
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagestore::{fetch::fetch_fn, store::PageStore, PageResult};
//!
//! #[tokio::main]
//! async fn main() -> pagestore::Result<()> {
//!     let fetcher = fetch_fn(|page: u32| async move {
//!         let items = api::list_users(page).await?;
//!         let next = (!items.is_empty()).then_some(page + 1);
//!         Ok::<_, anyhow::Error>(PageResult::new(items, next))
//!     });
//!
//!     let store = PageStore::new(1, fetcher)?;
//!     let _subscription = store.subscribe(|snapshot| {
//!         println!("{} - {} items", snapshot.view_state, snapshot.len());
//!     });
//!
//!     store.load_initial();
//!     store.settled().await;
//!     store.load_more();
//!     store.settled().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         PageStore                             │
//! │  load_initial()  refresh()  load_more()  retry()  cancel()    │
//! │  snapshot()  subscribe()  watch()  updates()  settled()       │
//! └───────────────────────────────────────────────────────────────┘
//!          │                     │                      │
//! ┌────────┴────────┬────────────┴──────────┬───────────┴─────────┐
//! │      State      │        Fetch          │        Hooks        │
//! ├─────────────────┼───────────────────────┼─────────────────────┤
//! │ ViewState       │ Fetcher / fetch_fn    │ PageSource          │
//! │ LoadMoreState   │ Retry + Backoff       │ StoreHooks          │
//! │ Snapshot        │ Rate Limit            │ ObservedStore       │
//! │ StoreStats      │ Timeout               │ TracingHooks        │
//! └─────────────────┴───────────────────────┴─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for pagestore
pub mod error;

/// Common types and type aliases
pub mod types;

/// Snapshot and state enums
pub mod state;

/// Page fetchers and fetch layers
pub mod fetch;

/// The paginated list state machine
pub mod store;

/// Store decorators
pub mod hooks;

/// Store configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FetchError, Result};
pub use types::*;

// Re-export commonly used types
pub use config::StoreConfig;
pub use fetch::{fetch_fn, Fetcher};
pub use state::{LoadMoreState, Snapshot, ViewState};
pub use store::{PageStore, Subscription};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
