//! Event wiring with scoped subscriptions.
//!
//! Components register handlers on an [`EventBus`] and keep the returned
//! [`Subscription`]. Dropping the subscription removes the handler, so a
//! component that is mounted repeatedly never accumulates stale listeners.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use atelier_shared::ThemeMode;

use crate::routes::Page;

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Synchronous publish/subscribe channel for one event type.
pub struct EventBus<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Register `handler`. It stays registered for as long as the returned
    /// [`Subscription`] lives.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, Arc::new(handler)));
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).handlers.retain(|(h, _)| *h != id);
                }
            })),
        }
    }

    /// Deliver `event` to every current handler. Handlers run outside the
    /// registry lock, so they may subscribe or unsubscribe themselves.
    pub fn publish(&self, event: &E) {
        let handlers: Vec<Handler<E>> = lock(&self.registry)
            .handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).handlers.len()
    }
}

/// Handle for a registered handler. Unsubscribes on drop.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Unsubscribe now instead of at drop time.
    pub fn cancel(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
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

/// Route-change signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationSignal {
    Started { to: Page },
    Completed { at: Page },
}

/// Pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChanged {
    pub mode: ThemeMode,
}
