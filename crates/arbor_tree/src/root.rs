//! Root nodes
//!
//! The root of every shadow tree is an ordinary [`ShadowNode`] whose props
//! are [`RootProps`]. [`RootNode`] keeps a typed handle to those props next
//! to the node so the layout constraints stay reachable without downcasts.

use crate::node::{
    ShadowNode, ShadowNodeFamilyFragment, ShadowNodeFragment, SharedChildren, SharedShadowNode,
};
use crate::props::{RootProps, SharedProps};
use arbor_core::{LayoutConstraints, LayoutContext};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Root node of a shadow tree
pub struct RootNode {
    node: ShadowNode,
    props: Arc<RootProps>,
}

impl RootNode {
    pub const COMPONENT_NAME: &'static str = "RootView";

    /// Create the first root of a surface
    pub fn new(
        family: ShadowNodeFamilyFragment,
        props: Arc<RootProps>,
        children: SharedChildren,
    ) -> Self {
        let shared: SharedProps = props.clone();
        let fragment = ShadowNodeFragment::new().props(shared).children(children);
        let node = ShadowNode::new(family, fragment);
        Self { node, props }
    }

    /// New root snapshot with different children
    pub fn clone_with_children(&self, children: SharedChildren) -> Self {
        self.clone_with(self.props.clone(), ShadowNodeFragment::new().children(children))
    }

    /// New root snapshot with different root props
    pub fn clone_with_props(&self, props: Arc<RootProps>) -> Self {
        self.clone_with(props, ShadowNodeFragment::new())
    }

    /// New root snapshot laid out within new constraints
    pub fn clone_with_layout(
        &self,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> Self {
        let props = RootProps::new(&self.props, layout_constraints, layout_context);
        self.clone_with_props(Arc::new(props))
    }

    /// New root snapshot with one child replaced
    pub fn clone_with_child(&self, index: usize, child: SharedShadowNode) -> Option<Self> {
        if index >= self.node.children().len() {
            return None;
        }
        let mut children = self.node.children().to_vec();
        children[index] = child;
        Some(self.clone_with_children(Arc::new(children)))
    }

    fn clone_with(&self, props: Arc<RootProps>, fragment: ShadowNodeFragment) -> Self {
        let shared: SharedProps = props.clone();
        let node = self.node.clone_with(ShadowNodeFragment { props: Some(shared), ..fragment });
        Self { node, props }
    }

    pub fn root_props(&self) -> &RootProps {
        &self.props
    }

    pub fn layout_constraints(&self) -> &LayoutConstraints {
        &self.props.layout_constraints
    }

    pub fn layout_context(&self) -> &LayoutContext {
        &self.props.layout_context
    }

    /// The underlying node
    pub fn node(&self) -> &ShadowNode {
        &self.node
    }
}

impl Deref for RootNode {
    type Target = ShadowNode;

    fn deref(&self) -> &ShadowNode {
        &self.node
    }
}

impl DerefMut for RootNode {
    fn deref_mut(&mut self) -> &mut ShadowNode {
        &mut self.node
    }
}

impl fmt::Debug for RootNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootNode")
            .field("node", &self.node)
            .field("layout_constraints", &self.props.layout_constraints)
            .finish()
    }
}

/// Creates the initial root node of a tree
pub trait RootNodeFactory {
    fn create_root_node(&self, family: ShadowNodeFamilyFragment, props: Arc<RootProps>) -> RootNode;
}

/// Factory producing a childless root
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRootNodeFactory;

impl RootNodeFactory for DefaultRootNodeFactory {
    fn create_root_node(
        &self,
        family: ShadowNodeFamilyFragment,
        props: Arc<RootProps>,
    ) -> RootNode {
        RootNode::new(family, props, crate::node::empty_children())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{Size, SurfaceId};
    use arbor_event::NoopEventEmitter;

    fn root() -> RootNode {
        let surface_id = SurfaceId::new(3);
        DefaultRootNodeFactory.create_root_node(
            ShadowNodeFamilyFragment {
                tag: surface_id.root_tag(),
                surface_id,
                component_name: RootNode::COMPONENT_NAME,
                event_emitter: Arc::new(NoopEventEmitter),
            },
            Arc::new(RootProps::default()),
        )
    }

    #[test]
    fn test_clone_with_layout() {
        let root = root();
        let constraints = LayoutConstraints::exact(Size::new(100.0, 200.0));
        let clone = root.clone_with_layout(constraints, LayoutContext::default());

        assert!(clone.same_family(&root));
        assert_eq!(*clone.layout_constraints(), constraints);
        assert_eq!(*root.layout_constraints(), LayoutConstraints::default());
        assert!(Arc::ptr_eq(clone.shared_children(), root.shared_children()));
        assert!(clone.props().as_any().downcast_ref::<RootProps>().is_some());
    }

    #[test]
    fn test_clone_with_child_out_of_range() {
        let root = root();
        let other = Arc::new(root.node().clone_with(ShadowNodeFragment::new()));
        assert!(root.clone_with_child(0, other).is_none());
    }
}
