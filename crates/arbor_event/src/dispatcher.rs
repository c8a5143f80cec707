//! Event dispatch queue and dispatch lock

use crate::{NodeEvent, Priority};
use arbor_core::Tag;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock serializing event dispatch with mount-state transitions
///
/// The commit engine holds it while updating `mounted` flags; the
/// dispatcher holds it while enqueuing. No event is ever queued for a node
/// that is halfway through a mount transition.
#[derive(Clone, Default)]
pub struct DispatchLock(Arc<Mutex<()>>);

impl DispatchLock {
    /// Create a new, independent lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is acquired
    pub fn lock(&self) -> DispatchGuard<'_> {
        DispatchGuard {
            lock: self,
            _guard: self.0.lock(),
        }
    }

    /// Check if both handles refer to the same underlying lock
    pub fn same_lock(&self, other: &DispatchLock) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for DispatchLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchLock")
            .field("locked", &self.0.is_locked())
            .finish()
    }
}

/// Proof that the dispatch lock is held
///
/// Operations that must run under the lock take `&DispatchGuard`.
pub struct DispatchGuard<'a> {
    lock: &'a DispatchLock,
    _guard: MutexGuard<'a, ()>,
}

impl DispatchGuard<'_> {
    /// Check if this guard was taken on `lock`
    pub fn holds(&self, lock: &DispatchLock) -> bool {
        self.lock.same_lock(lock)
    }
}

/// A queued event with routing metadata
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    /// Node the event is about
    pub target: Tag,
    /// The event itself
    pub event: NodeEvent,
    /// Priority
    pub priority: Priority,
    /// Enqueue order, unique per dispatcher
    pub sequence: u64,
}

/// Queue of node events waiting for delivery
pub struct EventDispatcher {
    lock: DispatchLock,
    sender: Sender<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
    sequence: AtomicU64,
}

impl EventDispatcher {
    /// Create a dispatcher with its own dispatch lock
    pub fn new() -> Self {
        Self::with_lock(DispatchLock::new())
    }

    /// Create a dispatcher sharing an existing dispatch lock
    pub fn with_lock(lock: DispatchLock) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            lock,
            sender,
            receiver,
            sequence: AtomicU64::new(0),
        }
    }

    /// The lock every enqueue takes
    pub fn dispatch_lock(&self) -> &DispatchLock {
        &self.lock
    }

    /// Enqueue an event
    pub fn dispatch(&self, target: Tag, event: NodeEvent, priority: Priority) {
        let guard = self.lock.lock();
        self.dispatch_locked(&guard, target, event, priority);
    }

    /// Enqueue an event while already holding the dispatch lock
    ///
    /// # Panics
    ///
    /// Panics if `guard` belongs to another lock.
    pub fn dispatch_locked(
        &self,
        guard: &DispatchGuard<'_>,
        target: Tag,
        event: NodeEvent,
        priority: Priority,
    ) {
        assert!(guard.holds(&self.lock), "dispatch guard taken on a foreign lock");
        let envelope = EventEnvelope {
            target,
            event,
            priority,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        log::trace!("Dispatching '{}' to {}", envelope.event.name(), target);
        if self.sender.send(envelope).is_err() {
            log::warn!("Event queue disconnected, dropping event for {}", target);
        }
    }

    /// Take all pending events, highest priority first
    ///
    /// Events of equal priority keep their enqueue order.
    pub fn drain(&self) -> Vec<EventEnvelope> {
        let mut events: Vec<EventEnvelope> = self.receiver.try_iter().collect();
        events.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.sequence.cmp(&b.sequence)));
        events
    }

    /// Number of queued events
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Check if there are pending events
    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
