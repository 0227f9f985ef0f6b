//! Store decoration
//!
//! Adds logging, filtering or analytics around a store by composition.
//!
//! # Overview
//!
//! - `PageSource` - The action surface shared by [`PageStore`](crate::store::PageStore) and its decorators
//! - `StoreHooks` - Callbacks run before/after each action and on every snapshot
//! - `ObservedStore` - Decorator wiring a `StoreHooks` implementation around any `PageSource`
//! - `TracingHooks` - Hooks that log actions and transitions with `tracing`

mod observed;
mod source;

pub use observed::{ObservedStore, StoreHooks, TracingHooks};
pub use source::{Action, PageSource};
