//! Shadow tree - the commit engine of one surface
//!
//! A [`ShadowTree`] owns the current root of a surface and replaces it
//! through transactions: pure functions from the current root to a
//! candidate root. Commits are optimistic. The root is snapshotted under a
//! read lock, the candidate is built, laid out and sealed without any lock,
//! and the swap only happens if nobody else swapped in the meantime.
//! Losing the race (or a declining transaction) simply retries.
//!
//! ## Commit pipeline
//!
//! ```text
//! snapshot root ──► transaction ──► layout ──► seal ──► validate & swap
//!                                                           │
//!                     liveness diff (under dispatch lock) ◄─┘
//!                                   │
//!   layout events ──► publish revision ──► notify delegate
//! ```
//!
//! ## Invariants
//!
//! 1. The root only changes under the write lock, and only from the root
//!    the winning transaction started from
//! 2. Revision numbers grow by exactly one per successful commit
//! 3. Only sealed trees are ever published
//! 4. `mounted` flags change only under the dispatch lock

use crate::config::ShadowTreeConfig;
use crate::coordinator::MountingCoordinator;
use crate::layout::{AffectedNode, LayoutEngine, NoopLayoutEngine};
use crate::mounting::update_mounted_flag;
use crate::node::{empty_children, ShadowNodeFamilyFragment};
use crate::props::RootProps;
use crate::revision::{RevisionNumber, ShadowTreeRevision};
use crate::root::{RootNode, RootNodeFactory};
use crate::telemetry::MountingTelemetry;
use arbor_core::{FamilyId, LayoutConstraints, LayoutContext, SurfaceId};
use arbor_event::{DispatchLock, NoopEventEmitter};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Receives a notification after every successful commit
pub trait ShadowTreeDelegate: Send + Sync {
    fn shadow_tree_did_finish_transaction(
        &self,
        shadow_tree: &ShadowTree,
        mounting_coordinator: &Arc<MountingCoordinator>,
    );
}

/// Outcome of a single commit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// The candidate was swapped in as this revision
    Committed(RevisionNumber),
    /// The transaction returned no candidate
    Declined,
    /// Another commit replaced the root first
    Conflicted,
}

impl CommitStatus {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitStatus::Committed(_))
    }
}

/// State guarded by the commit lock
struct CommitState {
    root: Arc<RootNode>,
    revision_number: RevisionNumber,
}

/// Builder for [`ShadowTree`]
pub struct ShadowTreeBuilder {
    surface_id: SurfaceId,
    layout_constraints: LayoutConstraints,
    layout_context: LayoutContext,
    layout_engine: Arc<dyn LayoutEngine>,
    dispatch_lock: Option<DispatchLock>,
    config: ShadowTreeConfig,
}

impl ShadowTreeBuilder {
    pub fn new(surface_id: SurfaceId) -> Self {
        Self {
            surface_id,
            layout_constraints: LayoutConstraints::default(),
            layout_context: LayoutContext::default(),
            layout_engine: Arc::new(NoopLayoutEngine),
            dispatch_lock: None,
            config: ShadowTreeConfig::default(),
        }
    }

    pub fn layout_constraints(mut self, layout_constraints: LayoutConstraints) -> Self {
        self.layout_constraints = layout_constraints;
        self
    }

    pub fn layout_context(mut self, layout_context: LayoutContext) -> Self {
        self.layout_context = layout_context;
        self
    }

    pub fn layout_engine(mut self, layout_engine: Arc<dyn LayoutEngine>) -> Self {
        self.layout_engine = layout_engine;
        self
    }

    /// Share the dispatch lock of the event system delivering this
    /// surface's events
    pub fn dispatch_lock(mut self, dispatch_lock: DispatchLock) -> Self {
        self.dispatch_lock = Some(dispatch_lock);
        self
    }

    pub fn config(mut self, config: ShadowTreeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the tree with its initial, childless root at revision 0
    pub fn build(
        self,
        root_factory: &dyn RootNodeFactory,
        delegate: Arc<dyn ShadowTreeDelegate>,
    ) -> ShadowTree {
        let props =
            RootProps::new(&RootProps::default(), self.layout_constraints, self.layout_context);
        let root = root_factory.create_root_node(
            ShadowNodeFamilyFragment {
                tag: self.surface_id.root_tag(),
                surface_id: self.surface_id,
                component_name: RootNode::COMPONENT_NAME,
                event_emitter: Arc::new(NoopEventEmitter),
            },
            Arc::new(props),
        );
        root.seal_recursive();
        let root = Arc::new(root);

        let mounting_coordinator = Arc::new(MountingCoordinator::new(ShadowTreeRevision::new(
            root.clone(),
            RevisionNumber::INITIAL,
            MountingTelemetry::default(),
        )));

        log::debug!("Created shadow tree for surface {}", self.surface_id);

        ShadowTree {
            surface_id: self.surface_id,
            config: self.config,
            state: RwLock::new(CommitState {
                root,
                revision_number: RevisionNumber::INITIAL,
            }),
            dispatch_lock: self.dispatch_lock.unwrap_or_default(),
            layout_engine: self.layout_engine,
            delegate,
            mounting_coordinator,
        }
    }
}

/// Commit engine owning the current tree of one surface
pub struct ShadowTree {
    surface_id: SurfaceId,
    config: ShadowTreeConfig,
    state: RwLock<CommitState>,
    dispatch_lock: DispatchLock,
    layout_engine: Arc<dyn LayoutEngine>,
    delegate: Arc<dyn ShadowTreeDelegate>,
    mounting_coordinator: Arc<MountingCoordinator>,
}

impl ShadowTree {
    /// Create a tree with default configuration and no layout
    pub fn new(
        surface_id: SurfaceId,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
        root_factory: &dyn RootNodeFactory,
        delegate: Arc<dyn ShadowTreeDelegate>,
    ) -> Self {
        ShadowTreeBuilder::new(surface_id)
            .layout_constraints(layout_constraints)
            .layout_context(layout_context)
            .build(root_factory, delegate)
    }

    pub fn builder(surface_id: SurfaceId) -> ShadowTreeBuilder {
        ShadowTreeBuilder::new(surface_id)
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    pub fn config(&self) -> &ShadowTreeConfig {
        &self.config
    }

    pub fn dispatch_lock(&self) -> &DispatchLock {
        &self.dispatch_lock
    }

    pub fn mounting_coordinator(&self) -> &Arc<MountingCoordinator> {
        &self.mounting_coordinator
    }

    /// Snapshot of the current root
    pub fn current_root(&self) -> Arc<RootNode> {
        self.state.read().root.clone()
    }

    /// Number of the current revision
    pub fn revision_number(&self) -> RevisionNumber {
        self.state.read().revision_number
    }

    /// Apply `transaction`, retrying until it commits
    ///
    /// # Panics
    ///
    /// Panics after `max_commit_attempts` failed attempts. Contention is
    /// always transient; a transaction that can never land means the tree
    /// or the transaction is broken.
    pub fn commit<F>(&self, transaction: F) -> RevisionNumber
    where
        F: Fn(&Arc<RootNode>) -> Option<RootNode>,
    {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.try_commit(&transaction) {
                CommitStatus::Committed(revision_number) => {
                    if attempts > 1 {
                        log::debug!(
                            "Surface {}: revision {} committed after {} attempts",
                            self.surface_id,
                            revision_number,
                            attempts
                        );
                    }
                    return revision_number;
                }
                status => {
                    log::trace!(
                        "Surface {}: commit attempt {} {:?}",
                        self.surface_id,
                        attempts,
                        status
                    );
                }
            }

            if attempts >= self.config.max_commit_attempts {
                log::error!(
                    "Surface {}: transaction failed to commit after {} attempts",
                    self.surface_id,
                    attempts
                );
                panic!(
                    "shadow tree for surface {} failed to commit after {} attempts",
                    self.surface_id, attempts
                );
            }
        }
    }

    /// Make a single commit attempt
    pub fn try_commit(
        &self,
        transaction: &dyn Fn(&Arc<RootNode>) -> Option<RootNode>,
    ) -> CommitStatus {
        let mut telemetry = MountingTelemetry::new();
        telemetry.will_commit();

        let old_root = self.state.read().root.clone();

        let Some(mut new_root) = transaction(&old_root) else {
            return CommitStatus::Declined;
        };

        let mut affected_nodes = Vec::with_capacity(self.config.affected_nodes_capacity);
        telemetry.will_layout();
        self.layout_engine.layout(&mut new_root, &mut affected_nodes);
        telemetry.did_layout();

        new_root.seal_recursive();
        let new_root = Arc::new(new_root);

        let revision_number = {
            let mut state = self.state.write();
            if !Arc::ptr_eq(&state.root, &old_root) {
                return CommitStatus::Conflicted;
            }

            state.root = new_root.clone();
            {
                let guard = self.dispatch_lock.lock();
                update_mounted_flag(old_root.children(), new_root.children(), &guard);
            }

            state.revision_number = state.revision_number.next();
            state.revision_number
        };

        self.emit_layout_events(&affected_nodes);

        telemetry.did_commit();
        if self.config.log_commits {
            log::debug!(
                "Surface {}: committed revision {} ({} nodes, {} laid out, {:?})",
                self.surface_id,
                revision_number,
                new_root.subtree_size(),
                affected_nodes.len(),
                telemetry.commit_duration().unwrap_or_default()
            );
        }

        self.mounting_coordinator
            .push(ShadowTreeRevision::new(new_root, revision_number, telemetry));
        self.delegate
            .shadow_tree_did_finish_transaction(self, &self.mounting_coordinator);

        CommitStatus::Committed(revision_number)
    }

    /// Commit a childless clone of the current root
    ///
    /// Unmounts everything on the surface while keeping the tree usable.
    pub fn commit_empty_tree(&self) -> RevisionNumber {
        log::debug!("Surface {}: committing empty tree", self.surface_id);
        self.commit(|old_root| Some(old_root.clone_with_children(empty_children())))
    }

    /// Commit a root clone laid out within new constraints
    pub fn constrain_layout(
        &self,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> RevisionNumber {
        self.commit(|old_root| {
            Some(old_root.clone_with_layout(layout_constraints, layout_context))
        })
    }

    /// Dispatch one layout event per affected node that asked for it
    ///
    /// A family recorded more than once gets the metrics of its last record.
    fn emit_layout_events(&self, affected_nodes: &[AffectedNode]) {
        let mut latest: HashMap<FamilyId, usize> = HashMap::with_capacity(affected_nodes.len());
        for (index, node) in affected_nodes.iter().enumerate() {
            latest.insert(node.family_id, index);
        }

        for (index, node) in affected_nodes.iter().enumerate() {
            if latest.get(&node.family_id) != Some(&index) {
                continue;
            }
            if !node.props.wants_layout_events() {
                continue;
            }
            node.event_emitter.on_layout(&node.layout_metrics);
        }
    }
}

impl Drop for ShadowTree {
    fn drop(&mut self) {
        self.mounting_coordinator.revoke();
        log::debug!("Destroyed shadow tree for surface {}", self.surface_id);
    }
}

impl std::fmt::Debug for ShadowTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowTree")
            .field("surface_id", &self.surface_id)
            .field("revision_number", &self.revision_number())
            .finish()
    }
}
