//! Multicast, non-replaying broadcast of failure messages.
//!
//! # Invariants
//!
//! 1. `publish` delivers synchronously to every observer attached at the time
//!    of the call, in attachment order.
//! 2. Nothing is buffered: an observer attached after a publish never sees it.
//! 3. After `unsubscribe` returns, the observer receives nothing further.
//! 4. Unsubscribing twice, or with a handle from another bus, is a no-op.
//!
//! # Reentrancy
//!
//! `publish` snapshots the observer list and releases the lock before calling
//! anyone, so an observer may subscribe or unsubscribe (itself or others)
//! from inside its callback. Such changes take effect from the next publish.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ApiError;

/// A failure message. Only the human-readable text survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub message: String,
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&ApiError> for ErrorEvent {
    fn from(err: &ApiError) -> Self {
        Self::new(err.to_string())
    }
}

type Observer = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Handle returned by [`ErrorBus::subscribe`].
///
/// Carries the identity of the bus that issued it, so it cannot detach an
/// observer from a different bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    bus: u64,
    id: u64,
}

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

struct Observers {
    next_id: u64,
    entries: Vec<(u64, Observer)>,
}

/// Shared error channel. Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct ErrorBus {
    id: u64,
    observers: Arc<Mutex<Observers>>,
}

impl ErrorBus {
    pub fn new() -> Self {
        Self {
            id: NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed),
            observers: Arc::new(Mutex::new(Observers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        let mut observers = self.lock();
        let id = observers.next_id;
        observers.next_id += 1;
        observers.entries.push((id, Arc::new(observer)));
        Subscription { bus: self.id, id }
    }

    /// Detach the observer behind `handle`. Returns whether one was removed.
    pub fn unsubscribe(&self, handle: Subscription) -> bool {
        if handle.bus != self.id {
            return false;
        }
        let mut observers = self.lock();
        let before = observers.entries.len();
        observers.entries.retain(|(id, _)| *id != handle.id);
        observers.entries.len() != before
    }

    pub fn publish(&self, event: ErrorEvent) {
        let snapshot: Vec<Observer> = self
            .lock()
            .entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in snapshot {
            observer(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, Observers> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ErrorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorBus")
            .field("id", &self.id)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
