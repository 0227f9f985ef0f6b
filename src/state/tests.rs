//! Tests for state module

use super::*;
use crate::error::FetchError;
use std::sync::Arc;

// ============================================================================
// ViewState Tests
// ============================================================================

#[test]
fn test_view_state_default() {
    let state = ViewState::default();
    assert_eq!(state, ViewState::Idle);
    assert!(!state.is_loading());
    assert!(state.error().is_none());
}

#[test]
fn test_view_state_failed() {
    let state = ViewState::Failed(FetchError::new("offline"));
    assert!(state.is_failed());
    assert!(!state.is_loaded());
    assert_eq!(state.error().map(FetchError::message), Some("offline"));
    assert_eq!(state.to_string(), "failed(offline)");
    assert_eq!(state.as_str(), "failed");
}

#[test]
fn test_view_state_names() {
    assert_eq!(ViewState::Idle.to_string(), "idle");
    assert_eq!(ViewState::Loading.to_string(), "loading");
    assert_eq!(ViewState::Empty.to_string(), "empty");
    assert_eq!(ViewState::Loaded.to_string(), "loaded");
}

// ============================================================================
// LoadMoreState Tests
// ============================================================================

#[test]
fn test_load_more_state_names() {
    assert_eq!(LoadMoreState::default(), LoadMoreState::Idle);
    assert_eq!(LoadMoreState::NoMoreData.to_string(), "noMoreData");
    assert_eq!(LoadMoreState::Failed.as_str(), "failed");
}

// ============================================================================
// Snapshot Tests
// ============================================================================

#[test]
fn test_snapshot_initial() {
    let snapshot: Snapshot<String, u32> = Snapshot::initial(0);
    assert_eq!(snapshot.view_state, ViewState::Idle);
    assert!(snapshot.is_empty());
    assert!(!snapshot.has_more());
    assert!(!snapshot.is_busy());
    assert_eq!(snapshot.current_cursor, 0);
    assert_eq!(snapshot.generation, 0);
    assert!(snapshot.last_loaded_at.is_none());
}

#[test]
fn test_snapshot_busy_flags() {
    let mut snapshot: Snapshot<String, u32> = Snapshot::initial(0);

    snapshot.view_state = ViewState::Loading;
    assert!(snapshot.is_busy());
    assert!(snapshot.is_loading());

    snapshot.view_state = ViewState::Loaded;
    snapshot.is_refreshing = true;
    assert!(snapshot.is_busy());
    assert!(!snapshot.is_loading());

    snapshot.is_refreshing = false;
    snapshot.load_more_state = LoadMoreState::Loading;
    assert!(snapshot.is_busy());

    snapshot.load_more_state = LoadMoreState::Failed;
    assert!(!snapshot.is_busy());
}

#[test]
fn test_snapshot_clone_shares_items() {
    let mut snapshot: Snapshot<&str, u32> = Snapshot::initial(0);
    snapshot.items = Arc::new(vec!["a", "b"]);
    snapshot.next_cursor = Some(1);

    let copy = snapshot.clone();
    assert!(Arc::ptr_eq(&copy.items, &snapshot.items));
    assert_eq!(copy.items(), &["a", "b"]);
    assert_eq!(copy.len(), 2);
    assert!(copy.has_more());
}

// ============================================================================
// StoreStats Tests
// ============================================================================

#[test]
fn test_store_stats_counters() {
    let mut stats = StoreStats::new();
    stats.add_page(3);
    stats.add_page(2);
    stats.add_failure();
    stats.add_stale();
    stats.add_superseded();

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.items_loaded, 5);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.stale_dropped, 1);
    assert_eq!(stats.superseded, 1);
}
