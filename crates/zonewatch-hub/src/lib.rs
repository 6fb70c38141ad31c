//! zonewatch-hub: subscriber fan-out.
//!
//! One-to-many delivery of state-change events to independently
//! lifecycled subscribers. Each subscriber gets its own unbounded
//! channel, so:
//!
//! - `publish` only enqueues; it never awaits subscriber IO, and a
//!   slow or blocked subscriber cannot delay the publisher or any
//!   other subscriber;
//! - events arrive per-subscriber in publish order (FIFO);
//! - a subscriber whose receiver is gone is pruned on the next
//!   delivery attempt, never surfacing an error to the publisher.
//!
//! The registry lock is a plain mutex, never held across `.await`.
//! Each `publish` sees a consistent snapshot of the subscriber set: a
//! subscriber added concurrently receives all events published after
//! its registration completes.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;

// ─── Handles ──────────────────────────────────────────────────────

/// Opaque identity of one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberHandle {
    id: u64,
}

/// A live subscription: the handle plus the receiving end of the
/// event channel. Dropping the receiver is enough to get cleaned up;
/// `unsubscribe` merely makes removal prompt.
pub struct Subscription<T> {
    pub handle: SubscriberHandle,
    pub events: mpsc::UnboundedReceiver<T>,
}

// ─── Hub ──────────────────────────────────────────────────────────

struct Registry<T> {
    next_id: u64,
    subscribers: HashMap<u64, mpsc::UnboundedSender<T>>,
}

/// Fan-out hub over events of type `T`.
pub struct EventHub<T> {
    inner: Mutex<Registry<T>>,
}

impl<T: Clone> EventHub<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Registry {
                next_id: 1,
                subscribers: HashMap::new(),
            }),
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.inner.lock().expect("hub registry poisoned");
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, tx);
        tracing::debug!(subscriber = id, "hub: subscribed");
        Subscription {
            handle: SubscriberHandle { id },
            events: rx,
        }
    }

    /// Remove a subscriber. Its channel closes; no further events are
    /// delivered after this returns.
    pub fn unsubscribe(&self, handle: SubscriberHandle) {
        let mut registry = self.inner.lock().expect("hub registry poisoned");
        if registry.subscribers.remove(&handle.id).is_some() {
            tracing::debug!(subscriber = handle.id, "hub: unsubscribed");
        }
    }

    /// Deliver an event to every currently registered subscriber.
    ///
    /// Returns the number of subscribers reached. Subscribers whose
    /// receiver has been dropped are removed here.
    pub fn publish(&self, event: T) -> usize {
        let mut registry = self.inner.lock().expect("hub registry poisoned");

        let mut dead = Vec::new();
        let mut delivered = 0usize;
        for (&id, tx) in &registry.subscribers {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(id);
            }
        }

        for id in dead {
            registry.subscribers.remove(&id);
            tracing::debug!(subscriber = id, "hub: pruned dead subscriber");
        }

        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .expect("hub registry poisoned")
            .subscribers
            .len()
    }
}

impl<T: Clone> Default for EventHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────
