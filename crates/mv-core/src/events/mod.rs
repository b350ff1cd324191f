//! Typed event emitters
//!
//! Every observable in the system (object states, dataset lifecycle, view
//! lifecycle, flash messages) owns an [`EventEmitter`] for exactly one event
//! type. Subscribing returns a [`Subscription`] guard that removes the
//! handler when dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use parking_lot::RwLock;

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;
type HandlerList<E> = RwLock<Vec<(u64, Handler<E>)>>;

/// Event source for a single event type
pub struct EventEmitter<E> {
    handlers: Arc<HandlerList<E>>,
    next_id: AtomicU64,
}

impl<E: 'static> EventEmitter<E> {
    /// Create an emitter with no handlers
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler. It stays registered until the returned guard is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.write().push((id, Arc::new(handler)));

        let handlers: Weak<HandlerList<E>> = Arc::downgrade(&self.handlers);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(handlers) = handlers.upgrade() {
                    handlers.write().retain(|(handler_id, _)| *handler_id != id);
                }
            })),
        }
    }

    /// Deliver an event to every handler, in subscription order.
    ///
    /// The handler list is snapshotted first, so handlers may subscribe,
    /// unsubscribe or emit again without deadlocking.
    pub fn emit(&self, event: &E) -> usize {
        let handlers: Vec<Handler<E>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of live handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

/// Guard for a registered handler
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the handler registered for as long as the emitter lives.
    pub fn forget(mut self) {
        self.unsubscribe = None;
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

/// Lifecycle signal sent to a sub-view when navigation shows or hides it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLifecycle {
    Show,
    Hide,
}
