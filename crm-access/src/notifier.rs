//! Synchronous publish/subscribe used to push session and tenancy changes
//! to dependent views.
//!
//! [`Notifier::publish`] runs every listener inline, in subscription order,
//! before it returns. The listener list is snapshotted before iterating, so
//! listeners may subscribe or unsubscribe re-entrantly. A listener that is
//! unsubscribed while a publish is in progress is skipped for the remainder
//! of that publish.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E> {
    id: u64,
    active: Arc<AtomicBool>,
    listener: Listener<E>,
}

struct Registry<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<E>>>,
}

impl<E> Registry<E> {
    fn entries(&self) -> MutexGuard<'_, Vec<Entry<E>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<E> Detach for Registry<E> {
    fn detach(&self, id: u64) {
        let removed = {
            let mut entries = self.entries();
            let index = entries.iter().position(|entry| entry.id == id);
            index.map(|index| entries.remove(index))
        };
        // Dropped outside the lock: the listener may own other subscriptions.
        drop(removed);
    }
}

/// Broadcast hub for events of type `E`.
pub struct Notifier<E> {
    registry: Arc<Registry<E>>,
}

impl<E: 'static> Notifier<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register `listener`. It stays registered until the returned
    /// [`Subscription`] is dropped or explicitly unsubscribed.
    #[must_use = "dropping the Subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));

        self.registry.entries().push(Entry {
            id,
            active: active.clone(),
            listener: Arc::new(listener),
        });

        let registry: Weak<dyn Detach> = Arc::downgrade(&self.registry) as Weak<dyn Detach>;
        Subscription {
            id,
            active,
            registry,
        }
    }

    /// Deliver `event` to every currently subscribed listener.
    pub fn publish(&self, event: &E) {
        let snapshot: Vec<(Arc<AtomicBool>, Listener<E>)> = self
            .registry
            .entries()
            .iter()
            .map(|entry| (entry.active.clone(), entry.listener.clone()))
            .collect();

        for (active, listener) in snapshot {
            if active.load(Ordering::Acquire) {
                listener(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.entries().len()
    }
}

impl<E: 'static> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`Notifier::subscribe`]. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
