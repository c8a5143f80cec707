//! # arbor_event - Node Event Plumbing
//!
//! Events about tree nodes (layout changes, custom events) are produced by
//! per-family emitters and queued on an [`EventDispatcher`]. Delivery to
//! listeners is the consumer's business; this crate only defines:
//! - The [`EventEmitter`] contract and its enable counter semantics
//! - The dispatch queue with priority ordering
//! - The [`DispatchLock`] serializing event dispatch with mount-state updates
//!
//! An emitter is live only while at least one snapshot of its node family
//! is mounted. Events sent through a disabled emitter are dropped.

pub mod dispatcher;
pub mod emitter;

pub use dispatcher::{DispatchGuard, DispatchLock, EventDispatcher, EventEnvelope};
pub use emitter::{NoopEventEmitter, ViewEventEmitter};

use arbor_core::{LayoutMetrics, Tag};
use std::sync::Arc;

/// Event priority
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// An event about a single node
#[derive(Clone, Debug, PartialEq)]
pub enum NodeEvent {
    /// The node's geometry changed in the latest commit
    Layout(LayoutMetrics),
    /// Component-defined event
    Custom {
        name: String,
        payload: serde_json::Value,
    },
}

impl NodeEvent {
    /// Event name as seen by listeners
    pub fn name(&self) -> &str {
        match self {
            NodeEvent::Layout(_) => "layout",
            NodeEvent::Custom { name, .. } => name,
        }
    }

    /// JSON payload as seen by listeners
    pub fn payload(&self) -> serde_json::Value {
        match self {
            NodeEvent::Layout(metrics) => serde_json::json!({
                "layout": serde_json::to_value(metrics.frame).unwrap_or_default(),
            }),
            NodeEvent::Custom { payload, .. } => payload.clone(),
        }
    }
}

/// Handle for dispatching events about one node family
///
/// Enabling is counted: every `set_enabled(true)` must be balanced by a
/// `set_enabled(false)`, and the emitter is enabled while the count is
/// positive. Mounting the new snapshot of a family before unmounting the
/// old one therefore never lets the count touch zero.
pub trait EventEmitter: Send + Sync {
    /// Tag of the node this emitter speaks for
    fn tag(&self) -> Tag;

    /// Increment (`true`) or decrement (`false`) the enable count
    fn set_enabled(&self, enabled: bool);

    /// Whether events are currently delivered
    fn is_enabled(&self) -> bool;

    /// Dispatch an event about this node
    fn dispatch(&self, event: NodeEvent, priority: Priority);

    /// Dispatch a layout event carrying the node's current metrics
    fn on_layout(&self, metrics: &LayoutMetrics) {
        self.dispatch(NodeEvent::Layout(*metrics), Priority::Normal);
    }
}

/// Shared emitter handle, one per node family
pub type SharedEventEmitter = Arc<dyn EventEmitter>;

/// Prelude
pub mod prelude {
    pub use crate::{
        DispatchGuard, DispatchLock, EventDispatcher, EventEmitter, EventEnvelope, NodeEvent,
        NoopEventEmitter, Priority, SharedEventEmitter, ViewEventEmitter,
    };
}
