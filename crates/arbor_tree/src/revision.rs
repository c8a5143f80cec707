//! Published tree revisions

use crate::root::RootNode;
use crate::telemetry::MountingTelemetry;
use std::fmt;
use std::sync::Arc;

/// Per-tree revision counter value
///
/// Starts at 0 for the initial tree and grows by exactly one per
/// successful commit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RevisionNumber(u64);

impl RevisionNumber {
    /// Revision of a freshly created tree
    pub const INITIAL: RevisionNumber = RevisionNumber(0);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RevisionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for RevisionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable `(root, number, telemetry)` snapshot handed to consumers
#[derive(Clone)]
pub struct ShadowTreeRevision {
    root: Arc<RootNode>,
    number: RevisionNumber,
    telemetry: MountingTelemetry,
}

impl ShadowTreeRevision {
    pub fn new(root: Arc<RootNode>, number: RevisionNumber, telemetry: MountingTelemetry) -> Self {
        debug_assert!(root.is_sealed(), "revisions must hold sealed trees");
        Self { root, number, telemetry }
    }

    pub fn root(&self) -> &Arc<RootNode> {
        &self.root
    }

    pub fn number(&self) -> RevisionNumber {
        self.number
    }

    pub fn telemetry(&self) -> &MountingTelemetry {
        &self.telemetry
    }
}

impl fmt::Debug for ShadowTreeRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowTreeRevision")
            .field("number", &self.number)
            .field("surface_id", &self.root.surface_id())
            .field("nodes", &self.root.subtree_size())
            .finish()
    }
}
