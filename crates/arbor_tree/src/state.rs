//! Node state containers
//!
//! State lives outside the immutable props and is versioned on its own.
//! When a node holding state gets mounted, the container is told which
//! node instance it is now committed against.

use crate::node::ShadowNode;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// Independently versioned state attached to a node
pub trait StateContainer: Send + Sync + fmt::Debug {
    /// Version of this state value, increasing with every update
    fn revision(&self) -> u64;

    /// Record that this state is now committed against `node`
    ///
    /// Called while the dispatch lock is held, so implementations must be
    /// quick, idempotent and must not dispatch events.
    fn commit(&self, node: &Arc<ShadowNode>);
}

/// Shared state handle
pub type SharedState = Arc<dyn StateContainer>;

/// Immutable state value with a revision and a commit record
pub struct VersionedState<T> {
    data: T,
    revision: u64,
    committed: Mutex<Option<Weak<ShadowNode>>>,
}

impl<T: Send + Sync + fmt::Debug + 'static> VersionedState<T> {
    /// First revision of a state value
    pub fn new(data: T) -> Self {
        Self::with_revision(data, 1)
    }

    /// Successor of this state holding `data`
    pub fn updated(&self, data: T) -> Self {
        Self::with_revision(data, self.revision + 1)
    }

    fn with_revision(data: T, revision: u64) -> Self {
        Self {
            data,
            revision,
            committed: Mutex::new(None),
        }
    }

    /// Share as a node state handle
    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    /// The state value
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The node this state was last committed against, if still alive
    pub fn committed_node(&self) -> Option<Arc<ShadowNode>> {
        self.committed.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Whether this state was ever committed
    pub fn is_committed(&self) -> bool {
        self.committed.lock().is_some()
    }
}

impl<T: Send + Sync + fmt::Debug + 'static> StateContainer for VersionedState<T> {
    fn revision(&self) -> u64 {
        self.revision
    }

    fn commit(&self, node: &Arc<ShadowNode>) {
        *self.committed.lock() = Some(Arc::downgrade(node));
    }
}

impl<T: fmt::Debug> fmt::Debug for VersionedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedState")
            .field("revision", &self.revision)
            .field("data", &self.data)
            .finish()
    }
}
