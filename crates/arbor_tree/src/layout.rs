//! Layout collaborator contract

use crate::node::ShadowNode;
use crate::props::SharedProps;
use crate::root::RootNode;
use arbor_core::{FamilyId, LayoutMetrics, Tag};
use arbor_event::SharedEventEmitter;

/// Detached record of a node whose geometry changed during layout
///
/// Captured before sealing so layout events can be emitted after the
/// commit without touching the tree again.
#[derive(Clone)]
pub struct AffectedNode {
    pub family_id: FamilyId,
    pub tag: Tag,
    pub props: SharedProps,
    pub event_emitter: SharedEventEmitter,
    pub layout_metrics: LayoutMetrics,
}

impl AffectedNode {
    /// Capture the node's current props, emitter and metrics
    pub fn from_node(node: &ShadowNode) -> Self {
        Self {
            family_id: node.family_id(),
            tag: node.tag(),
            props: node.props().clone(),
            event_emitter: node.event_emitter().clone(),
            layout_metrics: *node.layout_metrics(),
        }
    }
}

impl std::fmt::Debug for AffectedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffectedNode")
            .field("tag", &self.tag)
            .field("layout_metrics", &self.layout_metrics)
            .finish()
    }
}

/// Computes geometry for a candidate tree before it is sealed
pub trait LayoutEngine: Send + Sync {
    /// Lay out `root` in place, pushing every node whose metrics changed
    /// onto `affected`
    ///
    /// Use [`ShadowNode::child_mut`] to reach children; shared children are
    /// cloned on write so the current tree stays untouched.
    fn layout(&self, root: &mut RootNode, affected: &mut Vec<AffectedNode>);
}

/// Layout engine that leaves geometry alone
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLayoutEngine;

impl LayoutEngine for NoopLayoutEngine {
    fn layout(&self, _root: &mut RootNode, _affected: &mut Vec<AffectedNode>) {}
}
