//! PageStore implementation

use super::subscription::{Listener, Subscription};
use crate::config::StoreConfig;
use crate::error::{Error, FetchError, Result};
use crate::fetch::{Fetcher, SharedFetcher};
use crate::state::{LoadMoreState, Snapshot, StoreStats, ViewState};
use crate::types::{PageCursor, PageItem, PageResult};
use chrono::Utc;
use futures::stream::{self, Stream};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Kind of fetch an operation runs
///
/// A refresh that starts with no items runs as `Initial`, since its failure
/// semantics are those of an initial load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FetchKind {
    Initial,
    Refresh,
    LoadMore,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::Refresh => "refresh",
            Self::LoadMore => "load-more",
        })
    }
}

struct InFlight {
    generation: u64,
    kind: FetchKind,
    abort: AbortHandle,
}

/// Mutable store state, guarded by a single lock
pub(super) struct Core<I, C> {
    state: Snapshot<I, C>,
    generation: u64,
    in_flight: Option<InFlight>,
    stats: StoreStats,
    /// Committed snapshots not yet delivered to listeners
    pending: VecDeque<Snapshot<I, C>>,
    dispatching: bool,
}

struct Listeners<I, C> {
    next_id: u64,
    entries: BTreeMap<u64, Listener<I, C>>,
}

pub(super) struct Inner<I, C> {
    name: String,
    initial_cursor: C,
    fetcher: SharedFetcher<I, C>,
    runtime: Handle,
    core: Mutex<Core<I, C>>,
    listeners: Mutex<Listeners<I, C>>,
    updates: watch::Sender<Snapshot<I, C>>,
}

/// Paginated list state machine
///
/// Cloning a `PageStore` yields another handle to the same store. When the
/// last handle is dropped, any in-flight fetch is aborted.
pub struct PageStore<I, C> {
    pub(super) inner: Arc<Inner<I, C>>,
}

impl<I, C> Clone for PageStore<I, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: PageItem, C: PageCursor> PageStore<I, C> {
    /// Create a store on the current tokio runtime
    pub fn new(initial_cursor: C, fetcher: impl Fetcher<I, C> + 'static) -> Result<Self> {
        Self::from_shared(initial_cursor, Arc::new(fetcher), "pagestore")
    }

    /// Create a store whose fetcher is wrapped in the layers `config` asks for
    pub fn with_config(
        initial_cursor: C,
        fetcher: impl Fetcher<I, C> + 'static,
        config: &StoreConfig,
    ) -> Result<Self> {
        config.validate()?;
        let fetcher: SharedFetcher<I, C> = Arc::new(fetcher);
        Self::from_shared(initial_cursor, config.layer(fetcher), config.name.clone())
    }

    /// Create a store from an already shared fetcher
    pub fn from_shared(
        initial_cursor: C,
        fetcher: SharedFetcher<I, C>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::NoRuntime {
            message: e.to_string(),
        })?;
        Ok(Self::with_handle(initial_cursor, fetcher, name, runtime))
    }

    /// Create a store that spawns its fetches on `runtime`
    pub fn with_handle(
        initial_cursor: C,
        fetcher: SharedFetcher<I, C>,
        name: impl Into<String>,
        runtime: Handle,
    ) -> Self {
        let initial = Snapshot::initial(initial_cursor.clone());
        let (updates, _) = watch::channel(initial.clone());

        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                initial_cursor,
                fetcher,
                runtime,
                core: Mutex::new(Core {
                    state: initial,
                    generation: 0,
                    in_flight: None,
                    stats: StoreStats::default(),
                    pending: VecDeque::new(),
                    dispatching: false,
                }),
                listeners: Mutex::new(Listeners {
                    next_id: 0,
                    entries: BTreeMap::new(),
                }),
                updates,
            }),
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Reset and fetch the first page
    ///
    /// Ignored while an initial load is already in flight.
    pub fn load_initial(&self) {
        self.run("load_initial", Inner::try_load_initial);
    }

    /// Fetch the first page again
    ///
    /// With items present they stay visible and `is_refreshing` is set; a
    /// failure then leaves them untouched. Without items this is a full
    /// initial load.
    pub fn refresh(&self) {
        self.run("refresh", Inner::try_refresh);
    }

    /// Append the next page
    ///
    /// Ignored unless the view is loaded, a next cursor exists and no
    /// load-more is in flight.
    pub fn load_more(&self) {
        self.run("load_more", Inner::try_load_more);
    }

    /// Re-run the operation that failed
    ///
    /// A failed view reloads from the start; otherwise a failed load-more is
    /// retried. Ignored when nothing failed.
    pub fn retry(&self) {
        self.run("retry", Inner::try_retry);
    }

    /// Abort the in-flight operation without starting another
    ///
    /// Pending flags revert: an initial load goes back to idle, a refresh
    /// clears `is_refreshing`, a load-more returns to idle.
    pub fn cancel(&self) {
        self.run("cancel", |inner, core| {
            if inner.supersede(core).is_none() {
                return false;
            }
            core.generation += 1;
            inner.commit(core);
            true
        });
    }

    /// Abort any in-flight operation and return to the constructed state
    pub fn reset(&self) {
        self.run("reset", |inner, core| {
            inner.supersede(core);
            core.generation += 1;
            core.state = Snapshot::initial(inner.initial_cursor.clone());
            inner.commit(core);
            true
        });
    }

    fn run(
        &self,
        action: &'static str,
        op: impl FnOnce(&Arc<Inner<I, C>>, &mut Core<I, C>) -> bool,
    ) {
        let changed = {
            let mut core = self.inner.lock_core();
            op(&self.inner, &mut *core)
        };

        if changed {
            self.inner.dispatch();
        } else {
            debug!("[{}] {} ignored in current state", self.inner.name, action);
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Register a listener for every future snapshot
    ///
    /// Snapshots are delivered synchronously, in transition order, one at a
    /// time. A listener may call actions on the store; the snapshots those
    /// produce are delivered after the current one.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Snapshot<I, C>) + Send + Sync + 'static,
    {
        let id = {
            let mut listeners = self.inner.lock_listeners();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.insert(id, Arc::new(listener));
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock_listeners().entries.remove(&id);
            }
        })
    }

    /// Receiver that always holds the latest snapshot
    pub fn watch(&self) -> watch::Receiver<Snapshot<I, C>> {
        self.inner.updates.subscribe()
    }

    /// Stream of snapshots published after this call
    ///
    /// Intermediate snapshots may be skipped if the consumer lags; use
    /// [`PageStore::subscribe`] to see every transition.
    pub fn updates(&self) -> impl Stream<Item = Snapshot<I, C>> + Send + 'static {
        stream::unfold(self.watch(), |mut rx| async move {
            rx.changed().await.ok()?;
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, rx))
        })
    }

    /// Wait until no fetch is in flight and return the state at that point
    pub async fn settled(&self) -> Snapshot<I, C> {
        let mut rx = self.watch();
        let settled = rx.wait_for(|s| !s.is_busy()).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Copy of the current state
    pub fn snapshot(&self) -> Snapshot<I, C> {
        self.inner.lock_core().state.clone()
    }

    /// Current view state
    pub fn view_state(&self) -> ViewState {
        self.inner.lock_core().state.view_state.clone()
    }

    /// Current load-more state
    pub fn load_more_state(&self) -> LoadMoreState {
        self.inner.lock_core().state.load_more_state
    }

    /// Accumulated items
    pub fn items(&self) -> Arc<Vec<I>> {
        Arc::clone(&self.inner.lock_core().state.items)
    }

    /// Whether a refresh is in flight over existing items
    pub fn is_refreshing(&self) -> bool {
        self.inner.lock_core().state.is_refreshing
    }

    /// Whether a next page exists
    pub fn has_more(&self) -> bool {
        self.inner.lock_core().state.has_more()
    }

    /// Cursor of the most recently applied page
    pub fn current_cursor(&self) -> C {
        self.inner.lock_core().state.current_cursor.clone()
    }

    /// Cursor of the next page
    pub fn next_cursor(&self) -> Option<C> {
        self.inner.lock_core().state.next_cursor.clone()
    }

    /// Counters collected so far
    pub fn stats(&self) -> StoreStats {
        self.inner.lock_core().stats
    }

    /// Name used in log output
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Cursor every initial load and refresh starts from
    pub fn initial_cursor(&self) -> &C {
        &self.inner.initial_cursor
    }
}

impl<I, C> fmt::Debug for PageStore<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageStore")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Transitions
// ============================================================================

impl<I: PageItem, C: PageCursor> Inner<I, C> {
    fn lock_core(&self) -> MutexGuard<'_, Core<I, C>> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners<I, C>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_load_initial(self: &Arc<Self>, core: &mut Core<I, C>) -> bool {
        if core.state.view_state.is_loading() {
            return false;
        }
        self.supersede(core);
        self.start_initial(core);
        true
    }

    fn try_refresh(self: &Arc<Self>, core: &mut Core<I, C>) -> bool {
        self.supersede(core);
        if core.state.items.is_empty() {
            self.start_initial(core);
            return true;
        }

        core.state.is_refreshing = true;
        self.start_fetch(core, FetchKind::Refresh, self.initial_cursor.clone());
        self.commit(core);
        true
    }

    fn try_load_more(self: &Arc<Self>, core: &mut Core<I, C>) -> bool {
        let state = &core.state;
        if !state.view_state.is_loaded() || state.load_more_state == LoadMoreState::Loading {
            return false;
        }
        let Some(cursor) = state.next_cursor.clone() else {
            return false;
        };

        self.supersede(core);
        core.state.load_more_state = LoadMoreState::Loading;
        self.start_fetch(core, FetchKind::LoadMore, cursor);
        self.commit(core);
        true
    }

    fn try_retry(self: &Arc<Self>, core: &mut Core<I, C>) -> bool {
        if core.state.view_state.is_failed() {
            self.try_load_initial(core)
        } else if core.state.load_more_state == LoadMoreState::Failed {
            self.try_load_more(core)
        } else {
            false
        }
    }

    fn start_initial(self: &Arc<Self>, core: &mut Core<I, C>) {
        let state = &mut core.state;
        state.view_state = ViewState::Loading;
        state.items = Arc::new(Vec::new());
        state.current_cursor = self.initial_cursor.clone();
        state.next_cursor = None;
        state.load_more_state = LoadMoreState::Idle;
        state.is_refreshing = false;

        self.start_fetch(core, FetchKind::Initial, self.initial_cursor.clone());
        self.commit(core);
    }

    /// Abort the in-flight operation and revert the flag it had set
    fn supersede(&self, core: &mut Core<I, C>) -> Option<FetchKind> {
        let previous = core.in_flight.take()?;
        previous.abort.abort();
        core.stats.add_superseded();
        debug!(
            "[{}] superseding {} fetch (generation {})",
            self.name, previous.kind, previous.generation
        );

        let state = &mut core.state;
        match previous.kind {
            FetchKind::Initial => {
                if state.view_state.is_loading() {
                    state.view_state = ViewState::Idle;
                }
            }
            FetchKind::Refresh => state.is_refreshing = false,
            FetchKind::LoadMore => {
                if state.load_more_state == LoadMoreState::Loading {
                    state.load_more_state = LoadMoreState::Idle;
                }
            }
        }
        Some(previous.kind)
    }

    fn start_fetch(self: &Arc<Self>, core: &mut Core<I, C>, kind: FetchKind, cursor: C) {
        core.generation += 1;
        let generation = core.generation;
        debug!(
            "[{}] starting {} fetch at {:?} (generation {})",
            self.name, kind, cursor, generation
        );

        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::downgrade(self);
        let task = self.runtime.spawn(async move {
            let result = fetcher.fetch_page(cursor.clone()).await;
            if let Some(inner) = store.upgrade() {
                inner.complete(generation, kind, cursor, result);
            }
        });

        core.in_flight = Some(InFlight {
            generation,
            kind,
            abort: task.abort_handle(),
        });
    }

    /// Apply a finished fetch, unless a newer operation has started since
    pub(super) fn complete(
        &self,
        generation: u64,
        kind: FetchKind,
        cursor: C,
        result: std::result::Result<PageResult<I, C>, FetchError>,
    ) {
        {
            let mut core = self.lock_core();
            if core.generation != generation {
                core.stats.add_stale();
                debug!(
                    "[{}] dropping stale {} result (generation {}, current {})",
                    self.name, kind, generation, core.generation
                );
                return;
            }

            core.in_flight = None;
            match result {
                Ok(page) => self.apply_page(&mut core, kind, cursor, page),
                Err(err) => self.apply_failure(&mut core, kind, err),
            }
            self.commit(&mut core);
        }
        self.dispatch();
    }

    fn apply_page(&self, core: &mut Core<I, C>, kind: FetchKind, cursor: C, page: PageResult<I, C>) {
        let PageResult { items, next_cursor } = page;
        core.stats.add_page(items.len());

        let state = &mut core.state;
        match kind {
            FetchKind::Initial | FetchKind::Refresh => {
                state.view_state = if items.is_empty() {
                    ViewState::Empty
                } else {
                    ViewState::Loaded
                };
                state.items = Arc::new(items);
                state.is_refreshing = false;
            }
            FetchKind::LoadMore => {
                Arc::make_mut(&mut state.items).extend(items);
            }
        }

        state.load_more_state = if next_cursor.is_some() {
            LoadMoreState::Idle
        } else {
            LoadMoreState::NoMoreData
        };
        state.current_cursor = cursor;
        state.next_cursor = next_cursor;
        state.last_loaded_at = Some(Utc::now());

        debug!(
            "[{}] {} fetch applied: {} with {} items, load-more {}",
            self.name,
            kind,
            state.view_state,
            state.items.len(),
            state.load_more_state
        );
    }

    fn apply_failure(&self, core: &mut Core<I, C>, kind: FetchKind, err: FetchError) {
        core.stats.add_failure();

        let state = &mut core.state;
        match kind {
            FetchKind::Initial => {
                warn!("[{}] initial load failed: {}", self.name, err);
                state.view_state = ViewState::Failed(err);
                state.load_more_state = LoadMoreState::Idle;
                state.is_refreshing = false;
            }
            FetchKind::Refresh => {
                // Existing items stay visible; the failure is not published.
                warn!("[{}] refresh failed, keeping current items: {}", self.name, err);
                state.is_refreshing = false;
            }
            FetchKind::LoadMore => {
                warn!("[{}] load more failed: {}", self.name, err);
                state.load_more_state = LoadMoreState::Failed;
            }
        }
    }

    /// Publish the current state to the watch channel and queue it for listeners
    fn commit(&self, core: &mut Core<I, C>) {
        core.state.generation = core.generation;
        let snapshot = core.state.clone();
        self.updates.send_replace(snapshot.clone());
        core.pending.push_back(snapshot);
    }

    /// Deliver queued snapshots to listeners
    ///
    /// Only one caller drains the queue at a time. Snapshots committed while a
    /// delivery is running, including by listeners themselves, are picked up
    /// by the running loop.
    /// A listener that panics is logged and skipped for that snapshot.
    fn dispatch(&self) {
        {
            let mut core = self.lock_core();
            if core.dispatching {
                return;
            }
            core.dispatching = true;
        }

        loop {
            let snapshot = {
                let mut core = self.lock_core();
                match core.pending.pop_front() {
                    Some(snapshot) => snapshot,
                    None => {
                        core.dispatching = false;
                        return;
                    }
                }
            };

            let listeners: Vec<Listener<I, C>> =
                self.lock_listeners().entries.values().cloned().collect();
            for listener in &listeners {
                // A panicking listener must not stall delivery to the others.
                if panic::catch_unwind(AssertUnwindSafe(|| listener(&snapshot))).is_err() {
                    warn!(
                        "[{}] listener panicked on generation {}; continuing delivery",
                        self.name, snapshot.generation
                    );
                }
            }
        }
    }

    #[cfg(test)]
    pub(super) fn generation(&self) -> u64 {
        self.lock_core().generation
    }

    #[cfg(test)]
    pub(super) fn pending_is_empty(&self) -> bool {
        let core = self.lock_core();
        core.pending.is_empty() && !core.dispatching
    }
}

impl<I, C> Drop for Inner<I, C> {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(in_flight) = core.in_flight.take() {
            in_flight.abort.abort();
        }
    }
}
