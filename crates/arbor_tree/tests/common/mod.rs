//! Shared fixtures for shadow tree integration tests

#![allow(dead_code)]

use arbor_core::{LayoutMetrics, Rect, SurfaceId, Tag};
use arbor_event::{EventDispatcher, EventEmitter, NodeEvent, Priority, ViewEventEmitter};
use arbor_tree::prelude::*;
use arbor_tree::{AffectedNode, ShadowNodeFragment, ViewProps};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const ROW_HEIGHT: f32 = 10.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every `set_enabled` call, in order
pub type Journal = Arc<Mutex<Vec<(Tag, bool)>>>;

/// View emitter that also journals enable/disable calls
pub struct JournalEmitter {
    inner: ViewEventEmitter,
    journal: Journal,
}

impl EventEmitter for JournalEmitter {
    fn tag(&self) -> Tag {
        self.inner.tag()
    }

    fn set_enabled(&self, enabled: bool) {
        self.journal.lock().push((self.inner.tag(), enabled));
        self.inner.set_enabled(enabled);
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn dispatch(&self, event: NodeEvent, priority: Priority) {
        self.inner.dispatch(event, priority);
    }
}

/// Delegate counting notifications and remembering the revisions it saw
#[derive(Default)]
pub struct RecordingDelegate {
    pub calls: AtomicUsize,
    pub revisions: Mutex<Vec<RevisionNumber>>,
}

impl ShadowTreeDelegate for RecordingDelegate {
    fn shadow_tree_did_finish_transaction(
        &self,
        _shadow_tree: &ShadowTree,
        mounting_coordinator: &Arc<MountingCoordinator>,
    ) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.revisions.lock().push(mounting_coordinator.latest_revision_number());
    }
}

/// Stacks the root's children vertically, one row each
pub struct StackLayout;

impl StackLayout {
    pub fn row_frame(root: &RootNode, index: usize) -> Rect {
        let max_width = root.layout_constraints().maximum_size.width;
        let width = if max_width.is_finite() { max_width } else { 100.0 };
        Rect::from_xywh(0.0, ROW_HEIGHT * index as f32, width, ROW_HEIGHT)
    }
}

impl LayoutEngine for StackLayout {
    fn layout(&self, root: &mut RootNode, affected: &mut Vec<AffectedNode>) {
        for index in 0..root.children().len() {
            let metrics = LayoutMetrics::with_frame(Self::row_frame(root, index));
            if *root.children()[index].layout_metrics() == metrics {
                continue;
            }
            if let Some(child) = root.child_mut(index) {
                child.set_layout_metrics(metrics);
                affected.push(AffectedNode::from_node(child));
            }
        }
    }
}

/// Dispatcher, journal and delegate shared by a test's trees and nodes
pub struct Fixture {
    pub dispatcher: Arc<EventDispatcher>,
    pub journal: Journal,
    pub delegate: Arc<RecordingDelegate>,
}

impl Fixture {
    pub fn new() -> Self {
        init_logging();
        Self {
            dispatcher: Arc::new(EventDispatcher::new()),
            journal: Journal::default(),
            delegate: Arc::new(RecordingDelegate::default()),
        }
    }

    pub fn builder(&self, surface_id: i32) -> ShadowTreeBuilder {
        ShadowTree::builder(SurfaceId::new(surface_id))
            .dispatch_lock(self.dispatcher.dispatch_lock().clone())
            .layout_engine(Arc::new(StackLayout))
    }

    pub fn tree(&self, surface_id: i32) -> ShadowTree {
        self.builder(surface_id).build(&DefaultRootNodeFactory, self.delegate.clone())
    }

    /// A brand-new view family
    pub fn view(
        &self,
        tag: i32,
        props: ViewProps,
        children: Vec<SharedShadowNode>,
    ) -> SharedShadowNode {
        let emitter = JournalEmitter {
            inner: ViewEventEmitter::new(Tag::new(tag), &self.dispatcher),
            journal: self.journal.clone(),
        };
        Arc::new(ShadowNode::new(
            ShadowNodeFamilyFragment {
                tag: Tag::new(tag),
                surface_id: SurfaceId::new(1),
                component_name: "View",
                event_emitter: Arc::new(emitter),
            },
            ShadowNodeFragment::new()
                .props(Arc::new(props))
                .child_list(children),
        ))
    }

    pub fn leaf(&self, tag: i32) -> SharedShadowNode {
        self.view(tag, ViewProps::default(), Vec::new())
    }

    pub fn journal(&self) -> Vec<(Tag, bool)> {
        self.journal.lock().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }
}

/// Transaction replacing the root's children with `children`
pub fn set_children(
    children: Vec<SharedShadowNode>,
) -> impl Fn(&Arc<RootNode>) -> Option<RootNode> {
    let children = Arc::new(children);
    move |root: &Arc<RootNode>| Some(root.clone_with_children(children.clone()))
}

/// Transaction appending `child` to the root
pub fn append_child(child: SharedShadowNode) -> impl Fn(&Arc<RootNode>) -> Option<RootNode> {
    move |root: &Arc<RootNode>| {
        let mut children = root.children().to_vec();
        children.push(child.clone());
        Some(root.clone_with_children(Arc::new(children)))
    }
}
