//! Concrete event emitters

use crate::{EventDispatcher, EventEmitter, NodeEvent, Priority};
use arbor_core::Tag;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Weak};

/// Emitter that queues events on an [`EventDispatcher`]
///
/// Holds the dispatcher weakly; once the dispatcher is gone, events are
/// silently discarded.
pub struct ViewEventEmitter {
    tag: Tag,
    dispatcher: Weak<EventDispatcher>,
    enable_count: AtomicI32,
}

impl ViewEventEmitter {
    /// Create a disabled emitter for `tag`
    pub fn new(tag: Tag, dispatcher: &Arc<EventDispatcher>) -> Self {
        Self {
            tag,
            dispatcher: Arc::downgrade(dispatcher),
            enable_count: AtomicI32::new(0),
        }
    }

    /// Create a shared, disabled emitter for `tag`
    pub fn shared(tag: Tag, dispatcher: &Arc<EventDispatcher>) -> Arc<Self> {
        Arc::new(Self::new(tag, dispatcher))
    }

    /// Dispatch a component-defined event
    pub fn dispatch_custom(&self, name: impl Into<String>, payload: serde_json::Value) {
        self.dispatch(NodeEvent::Custom { name: name.into(), payload }, Priority::Normal);
    }
}

impl EventEmitter for ViewEventEmitter {
    fn tag(&self) -> Tag {
        self.tag
    }

    fn set_enabled(&self, enabled: bool) {
        let delta = if enabled { 1 } else { -1 };
        let count = self.enable_count.fetch_add(delta, Ordering::AcqRel) + delta;
        debug_assert!(count >= 0, "unbalanced set_enabled(false) on {}", self.tag);
    }

    fn is_enabled(&self) -> bool {
        self.enable_count.load(Ordering::Acquire) > 0
    }

    fn dispatch(&self, event: NodeEvent, priority: Priority) {
        let Some(dispatcher) = self.dispatcher.upgrade() else {
            return;
        };

        // Mount transitions hold this lock, so the check and the enqueue
        // cannot straddle an unmount
        let guard = dispatcher.dispatch_lock().lock();
        if !self.is_enabled() {
            log::trace!("Dropping '{}' for unmounted {}", event.name(), self.tag);
            return;
        }
        dispatcher.dispatch_locked(&guard, self.tag, event, priority);
    }
}

impl std::fmt::Debug for ViewEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewEventEmitter")
            .field("tag", &self.tag)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Emitter that drops everything, used by tree roots
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn tag(&self) -> Tag {
        Tag::invalid()
    }

    fn set_enabled(&self, _enabled: bool) {}

    fn is_enabled(&self) -> bool {
        false
    }

    fn dispatch(&self, _event: NodeEvent, _priority: Priority) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::LayoutMetrics;

    #[test]
    fn test_disabled_emitter_drops_events() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let emitter = ViewEventEmitter::new(Tag::new(7), &dispatcher);

        emitter.on_layout(&LayoutMetrics::EMPTY);
        assert_eq!(dispatcher.pending_count(), 0);

        emitter.set_enabled(true);
        emitter.on_layout(&LayoutMetrics::EMPTY);
        let events = dispatcher.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, Tag::new(7));
    }

    #[test]
    fn test_enable_count_survives_remount() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let emitter = ViewEventEmitter::new(Tag::new(1), &dispatcher);

        emitter.set_enabled(true);
        // New snapshot mounts before the old one unmounts
        emitter.set_enabled(true);
        emitter.set_enabled(false);
        assert!(emitter.is_enabled());

        emitter.set_enabled(false);
        assert!(!emitter.is_enabled());
    }

    #[test]
    fn test_dispatcher_dropped() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let emitter = ViewEventEmitter::new(Tag::new(1), &dispatcher);
        emitter.set_enabled(true);
        drop(dispatcher);
        emitter.dispatch_custom("press", serde_json::Value::Null);
    }

    #[test]
    fn test_unmount_while_dispatch_waits_drops_event() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let emitter = ViewEventEmitter::shared(Tag::new(4), &dispatcher);
        emitter.set_enabled(true);

        let guard = dispatcher.dispatch_lock().lock();
        let worker = {
            let emitter = emitter.clone();
            std::thread::spawn(move || emitter.dispatch_custom("press", serde_json::Value::Null))
        };

        std::thread::sleep(std::time::Duration::from_millis(50));
        emitter.set_enabled(false);
        drop(guard);
        worker.join().unwrap();

        assert_eq!(dispatcher.pending_count(), 0);
    }
}
