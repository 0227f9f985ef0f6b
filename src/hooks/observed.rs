//! Hook-based store decorator

use super::source::{Action, PageSource};
use crate::state::Snapshot;
use crate::store::Subscription;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// Callbacks around a store's actions and transitions
///
/// All methods have no-op defaults.
pub trait StoreHooks<I, C>: Send + Sync {
    /// Called before an action reaches the store; returning `false` drops it
    fn before_action(&self, _action: Action, _snapshot: &Snapshot<I, C>) -> bool {
        true
    }

    /// Called after the store accepted (or ignored) an action
    fn after_action(&self, _action: Action, _snapshot: &Snapshot<I, C>) {}

    /// Called with every snapshot the store publishes
    fn on_snapshot(&self, _snapshot: &Snapshot<I, C>) {}
}

/// Store decorated with [`StoreHooks`]
///
/// The decorator subscribes to the inner store for its whole lifetime and
/// forwards every snapshot to [`StoreHooks::on_snapshot`].
pub struct ObservedStore<S, H, I, C> {
    inner: S,
    hooks: Arc<H>,
    _subscription: Subscription,
    _marker: PhantomData<fn() -> (I, C)>,
}

impl<S, H, I, C> ObservedStore<S, H, I, C>
where
    S: PageSource<I, C>,
    H: StoreHooks<I, C> + 'static,
    I: 'static,
    C: 'static,
{
    /// Wrap `inner` with `hooks`
    pub fn new(inner: S, hooks: H) -> Self {
        let hooks = Arc::new(hooks);
        let forward = Arc::clone(&hooks);
        let subscription = inner.subscribe(Box::new(move |snapshot: &Snapshot<I, C>| {
            forward.on_snapshot(snapshot);
        }));

        Self {
            inner,
            hooks,
            _subscription: subscription,
            _marker: PhantomData,
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The installed hooks
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    fn intercept(&self, action: Action) {
        if !self.hooks.before_action(action, &self.inner.snapshot()) {
            debug!("{} vetoed by hooks", action);
            return;
        }
        action.apply(&self.inner);
        self.hooks.after_action(action, &self.inner.snapshot());
    }
}

impl<S, H, I, C> PageSource<I, C> for ObservedStore<S, H, I, C>
where
    S: PageSource<I, C>,
    H: StoreHooks<I, C> + 'static,
    I: 'static,
    C: 'static,
{
    fn load_initial(&self) {
        self.intercept(Action::LoadInitial);
    }

    fn refresh(&self) {
        self.intercept(Action::Refresh);
    }

    fn load_more(&self) {
        self.intercept(Action::LoadMore);
    }

    fn retry(&self) {
        self.intercept(Action::Retry);
    }

    fn snapshot(&self) -> Snapshot<I, C> {
        self.inner.snapshot()
    }

    fn subscribe(&self, listener: Box<dyn Fn(&Snapshot<I, C>) + Send + Sync>) -> Subscription {
        self.inner.subscribe(listener)
    }
}

// ============================================================================
// Tracing Hooks
// ============================================================================

/// Hooks that log every action and transition
#[derive(Debug, Clone)]
pub struct TracingHooks {
    name: String,
}

impl TracingHooks {
    /// Create hooks that tag log lines with `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name used in log lines
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<I, C> StoreHooks<I, C> for TracingHooks {
    fn before_action(&self, action: Action, snapshot: &Snapshot<I, C>) -> bool {
        info!(
            "[{}] {} requested (view {}, {} items)",
            self.name,
            action,
            snapshot.view_state,
            snapshot.len()
        );
        true
    }

    fn on_snapshot(&self, snapshot: &Snapshot<I, C>) {
        debug!(
            "[{}] generation {}: view {}, load-more {}, refreshing {}, {} items",
            self.name,
            snapshot.generation,
            snapshot.view_state,
            snapshot.load_more_state,
            snapshot.is_refreshing,
            snapshot.len()
        );
    }
}
