//! Persistent shadow nodes
//!
//! A [`ShadowNode`] is an immutable snapshot of one UI element. Changing a
//! tree never edits a published node: a new node is built from the old one
//! plus a [`ShadowNodeFragment`], reusing every unchanged child by
//! reference. Nodes of one logical element across revisions share a
//! [`ShadowNodeFamily`].
//!
//! Two pieces of per-node bookkeeping break strict immutability:
//! - `sealed`, set once by [`ShadowNode::seal_recursive`] before a tree is
//!   published. Every mutating method panics on a sealed node.
//! - `mounted`, the only field ever written after sealing. It is written
//!   exclusively by the liveness diff, which must hold the dispatch lock.

use crate::props::{SharedProps, ViewProps};
use crate::state::SharedState;
use arbor_core::{FamilyId, LayoutMetrics, SurfaceId, Tag};
use arbor_event::{DispatchGuard, SharedEventEmitter};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared node handle
pub type SharedShadowNode = Arc<ShadowNode>;

/// Shared, copy-on-write list of children
pub type SharedChildren = Arc<Vec<SharedShadowNode>>;

/// A fresh, empty children list
pub fn empty_children() -> SharedChildren {
    Arc::new(Vec::new())
}

/// Identity shared by every snapshot of one logical node
pub struct ShadowNodeFamily {
    id: FamilyId,
    tag: Tag,
    surface_id: SurfaceId,
    component_name: &'static str,
    event_emitter: SharedEventEmitter,
}

impl ShadowNodeFamily {
    pub fn id(&self) -> FamilyId {
        self.id
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    pub fn component_name(&self) -> &'static str {
        self.component_name
    }

    pub fn event_emitter(&self) -> &SharedEventEmitter {
        &self.event_emitter
    }
}

impl fmt::Debug for ShadowNodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNodeFamily")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("surface_id", &self.surface_id)
            .field("component_name", &self.component_name)
            .finish()
    }
}

/// Fields that define a new node family
pub struct ShadowNodeFamilyFragment {
    pub tag: Tag,
    pub surface_id: SurfaceId,
    pub component_name: &'static str,
    pub event_emitter: SharedEventEmitter,
}

/// Field delta for creating or cloning a node
///
/// `None` means "keep the source node's value" when cloning and "use the
/// default" when creating.
#[derive(Default, Clone)]
pub struct ShadowNodeFragment {
    pub props: Option<SharedProps>,
    pub children: Option<SharedChildren>,
    pub state: Option<SharedState>,
}

impl ShadowNodeFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn props(mut self, props: SharedProps) -> Self {
        self.props = Some(props);
        self
    }

    pub fn children(mut self, children: SharedChildren) -> Self {
        self.children = Some(children);
        self
    }

    /// Children from an iterator of shared nodes
    pub fn child_list(self, children: impl IntoIterator<Item = SharedShadowNode>) -> Self {
        self.children(Arc::new(children.into_iter().collect()))
    }

    pub fn state(mut self, state: SharedState) -> Self {
        self.state = Some(state);
        self
    }
}

/// Immutable snapshot of a node in a shadow tree
pub struct ShadowNode {
    family: Arc<ShadowNodeFamily>,
    props: SharedProps,
    children: SharedChildren,
    state: Option<SharedState>,
    layout_metrics: LayoutMetrics,
    sealed: AtomicBool,
    mounted: AtomicBool,
}

impl ShadowNode {
    /// Create the first node of a new family
    pub fn new(family: ShadowNodeFamilyFragment, fragment: ShadowNodeFragment) -> Self {
        let family = Arc::new(ShadowNodeFamily {
            id: FamilyId::next(),
            tag: family.tag,
            surface_id: family.surface_id,
            component_name: family.component_name,
            event_emitter: family.event_emitter,
        });

        Self {
            family,
            props: fragment.props.unwrap_or_else(|| Arc::new(ViewProps::default())),
            children: fragment.children.unwrap_or_else(empty_children),
            state: fragment.state,
            layout_metrics: LayoutMetrics::EMPTY,
            sealed: AtomicBool::new(false),
            mounted: AtomicBool::new(false),
        }
    }

    /// Create a new snapshot of this node's family
    ///
    /// Unspecified fields are shared with `self`. The clone is unsealed and
    /// unmounted.
    pub fn clone_with(&self, fragment: ShadowNodeFragment) -> Self {
        Self {
            family: self.family.clone(),
            props: fragment.props.unwrap_or_else(|| self.props.clone()),
            children: fragment.children.unwrap_or_else(|| self.children.clone()),
            state: fragment.state.or_else(|| self.state.clone()),
            layout_metrics: self.layout_metrics,
            sealed: AtomicBool::new(false),
            mounted: AtomicBool::new(false),
        }
    }

    /// Whether both snapshots belong to the same logical node
    #[inline]
    pub fn same_family(&self, other: &ShadowNode) -> bool {
        self.family.id == other.family.id
    }

    pub fn family(&self) -> &ShadowNodeFamily {
        &self.family
    }

    #[inline]
    pub fn family_id(&self) -> FamilyId {
        self.family.id
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.family.tag
    }

    #[inline]
    pub fn surface_id(&self) -> SurfaceId {
        self.family.surface_id
    }

    pub fn component_name(&self) -> &'static str {
        self.family.component_name
    }

    pub fn event_emitter(&self) -> &SharedEventEmitter {
        &self.family.event_emitter
    }

    pub fn props(&self) -> &SharedProps {
        &self.props
    }

    pub fn children(&self) -> &[SharedShadowNode] {
        &self.children
    }

    /// The children list itself, for sharing with a clone
    pub fn shared_children(&self) -> &SharedChildren {
        &self.children
    }

    pub fn state(&self) -> Option<&SharedState> {
        self.state.as_ref()
    }

    pub fn layout_metrics(&self) -> &LayoutMetrics {
        &self.layout_metrics
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(|child| child.subtree_size()).sum::<usize>()
    }

    /// Set computed geometry, returning whether it changed
    pub fn set_layout_metrics(&mut self, layout_metrics: LayoutMetrics) -> bool {
        self.ensure_unsealed();
        if self.layout_metrics == layout_metrics {
            return false;
        }
        self.layout_metrics = layout_metrics;
        true
    }

    /// Replace the child at `index`, returning the previous one
    pub fn replace_child(
        &mut self,
        index: usize,
        child: SharedShadowNode,
    ) -> Option<SharedShadowNode> {
        self.ensure_unsealed();
        let children = Arc::make_mut(&mut self.children);
        let slot = children.get_mut(index)?;
        Some(std::mem::replace(slot, child))
    }

    pub fn append_child(&mut self, child: SharedShadowNode) {
        self.ensure_unsealed();
        Arc::make_mut(&mut self.children).push(child);
    }

    /// Mutable access to the child at `index`
    ///
    /// Children that are sealed or shared with another tree are replaced by
    /// a fresh clone first, so the previous tree is never touched.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut ShadowNode> {
        self.ensure_unsealed();
        if index >= self.children.len() {
            return None;
        }

        let slot = &mut Arc::make_mut(&mut self.children)[index];
        if slot.is_sealed() || Arc::get_mut(slot).is_none() {
            *slot = Arc::new(slot.clone_with(ShadowNodeFragment::default()));
        }
        Arc::get_mut(slot)
    }

    /// Permanently freeze this node and its whole subtree
    pub fn seal_recursive(&self) {
        // A sealed node's subtree is always sealed already
        if self.sealed.swap(true, Ordering::AcqRel) {
            return;
        }
        for child in self.children.iter() {
            child.seal_recursive();
        }
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Whether this snapshot is part of the current tree of its surface
    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Flip the liveness flag and the family's emitter enable count
    pub(crate) fn set_mounted(&self, mounted: bool, _guard: &DispatchGuard<'_>) {
        self.mounted.store(mounted, Ordering::Release);
        self.family.event_emitter.set_enabled(mounted);
    }

    fn ensure_unsealed(&self) {
        assert!(
            !self.is_sealed(),
            "attempt to mutate sealed node {} ({})",
            self.family.tag,
            self.family.component_name
        );
    }
}

impl fmt::Debug for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNode")
            .field("tag", &self.family.tag)
            .field("family", &self.family.id)
            .field("component", &self.family.component_name)
            .field("props", &self.props)
            .field("children", &self.children.len())
            .field("sealed", &self.is_sealed())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::Rect;
    use arbor_event::NoopEventEmitter;

    fn leaf(tag: i32) -> ShadowNode {
        ShadowNode::new(
            ShadowNodeFamilyFragment {
                tag: Tag::new(tag),
                surface_id: SurfaceId::new(1),
                component_name: "View",
                event_emitter: Arc::new(NoopEventEmitter),
            },
            ShadowNodeFragment::new(),
        )
    }

    #[test]
    fn test_clone_keeps_family_and_shares_children() {
        let child = Arc::new(leaf(2));
        let parent = leaf(1).clone_with(ShadowNodeFragment::new().child_list([child.clone()]));
        let clone = parent.clone_with(ShadowNodeFragment::new());

        assert!(clone.same_family(&parent));
        assert!(!clone.same_family(&leaf(1)));
        assert!(Arc::ptr_eq(clone.shared_children(), parent.shared_children()));
        assert!(Arc::ptr_eq(&clone.children()[0], &child));
    }

    #[test]
    fn test_seal_recursive() {
        let parent = leaf(1).clone_with(ShadowNodeFragment::new().child_list([Arc::new(leaf(2))]));
        parent.seal_recursive();
        assert!(parent.is_sealed());
        assert!(parent.children()[0].is_sealed());
        assert!(!parent.clone_with(ShadowNodeFragment::new()).is_sealed());
    }

    #[test]
    #[should_panic(expected = "sealed")]
    fn test_sealed_node_rejects_mutation() {
        let mut node = leaf(1);
        node.seal_recursive();
        node.set_layout_metrics(LayoutMetrics::with_frame(Rect::from_xywh(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_child_mut_copies_on_write() {
        let old = leaf(1).clone_with(ShadowNodeFragment::new().child_list([Arc::new(leaf(2))]));
        old.seal_recursive();
        let old_child = old.children()[0].clone();

        let mut new = old.clone_with(ShadowNodeFragment::new());
        let frame = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let child = new.child_mut(0).unwrap();
        assert!(child.set_layout_metrics(LayoutMetrics::with_frame(frame)));

        assert!(!Arc::ptr_eq(&new.children()[0], &old_child));
        assert!(new.children()[0].same_family(&old_child));
        assert_eq!(old_child.layout_metrics().frame, Rect::ZERO);
        assert_eq!(new.children()[0].layout_metrics().frame, frame);
        assert!(new.child_mut(5).is_none());
    }

    #[test]
    fn test_replace_and_append() {
        let mut node = leaf(1);
        node.append_child(Arc::new(leaf(2)));
        let replaced = node.replace_child(0, Arc::new(leaf(3))).unwrap();
        assert_eq!(replaced.tag(), Tag::new(2));
        assert_eq!(node.children()[0].tag(), Tag::new(3));
        assert!(node.replace_child(4, Arc::new(leaf(4))).is_none());
        assert_eq!(node.subtree_size(), 2);
    }
}
