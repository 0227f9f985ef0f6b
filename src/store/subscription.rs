//! Listener registration handle

use crate::state::Snapshot;
use std::sync::Arc;

/// Callback invoked with every published snapshot
pub type Listener<I, C> = Arc<dyn Fn(&Snapshot<I, C>) + Send + Sync>;

/// Active listener registration
///
/// Dropping the handle unregisters the listener. Use [`Subscription::detach`]
/// to keep the listener for the lifetime of the store instead.
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Keep the listener registered until the store is dropped
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }

    /// Unregister the listener now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
