//! Mounting coordinator - hands published revisions to the mounting layer
//!
//! The coordinator keeps only the newest revision not yet pulled. A
//! consumer that falls behind skips intermediate revisions rather than
//! replaying them; it always diffs its base revision against the latest.
//!
//! Once revoked (the owning tree was torn down), pushes are discarded and
//! nothing new becomes observable.

use crate::revision::{RevisionNumber, ShadowTreeRevision};
use arbor_core::SurfaceId;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

struct CoordinatorState {
    /// Revision the consumer last pulled (initially the tree's first root)
    base_revision: ShadowTreeRevision,
    /// Newest pushed revision not pulled yet
    last_revision: Option<ShadowTreeRevision>,
    revoked: bool,
}

/// Revision channel between a shadow tree and its mounting consumer
pub struct MountingCoordinator {
    surface_id: SurfaceId,
    state: Mutex<CoordinatorState>,
    signal: Condvar,
}

impl MountingCoordinator {
    /// Create a coordinator whose consumer starts from `base_revision`
    pub fn new(base_revision: ShadowTreeRevision) -> Self {
        Self {
            surface_id: base_revision.root().surface_id(),
            state: Mutex::new(CoordinatorState {
                base_revision,
                last_revision: None,
                revoked: false,
            }),
            signal: Condvar::new(),
        }
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Publish a revision
    ///
    /// Revisions older than what the consumer can already see are dropped;
    /// concurrent committers may push out of order.
    pub fn push(&self, revision: ShadowTreeRevision) {
        let mut state = self.state.lock();

        if state.revoked {
            log::debug!(
                "Surface {}: dropping revision {} pushed after revoke",
                self.surface_id,
                revision.number()
            );
            return;
        }

        let latest = state
            .last_revision
            .as_ref()
            .map_or(state.base_revision.number(), ShadowTreeRevision::number);
        if revision.number() <= latest {
            log::trace!(
                "Surface {}: dropping stale revision {} (latest {})",
                self.surface_id,
                revision.number(),
                latest
            );
            return;
        }

        state.last_revision = Some(revision);
        drop(state);
        self.signal.notify_all();
    }

    /// Take the newest unpulled revision, making it the new base
    pub fn pull_revision(&self) -> Option<ShadowTreeRevision> {
        let mut state = self.state.lock();
        let revision = state.last_revision.take()?;
        state.base_revision = revision.clone();
        Some(revision)
    }

    /// Block until an unpulled revision is available or `timeout` elapses
    ///
    /// Returns whether a revision is available. Returns `false` right away
    /// once revoked.
    pub fn wait_for_revision(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        while state.last_revision.is_none() && !state.revoked {
            if self.signal.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.last_revision.is_some()
    }

    /// Stop publishing; wakes every waiter
    pub fn revoke(&self) {
        let mut state = self.state.lock();
        if state.revoked {
            return;
        }
        state.revoked = true;
        state.last_revision = None;
        drop(state);

        log::debug!("Surface {}: mounting coordinator revoked", self.surface_id);
        self.signal.notify_all();
    }

    pub fn is_revoked(&self) -> bool {
        self.state.lock().revoked
    }

    /// The revision the consumer last pulled
    pub fn base_revision(&self) -> ShadowTreeRevision {
        self.state.lock().base_revision.clone()
    }

    /// Number of the newest revision known to the coordinator
    pub fn latest_revision_number(&self) -> RevisionNumber {
        let state = self.state.lock();
        state
            .last_revision
            .as_ref()
            .map_or(state.base_revision.number(), ShadowTreeRevision::number)
    }

    /// Whether an unpulled revision is waiting
    pub fn has_pending_revision(&self) -> bool {
        self.state.lock().last_revision.is_some()
    }
}

impl std::fmt::Debug for MountingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MountingCoordinator")
            .field("surface_id", &self.surface_id)
            .field("base_revision", &state.base_revision.number())
            .field("pending", &state.last_revision.as_ref().map(ShadowTreeRevision::number))
            .field("revoked", &state.revoked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ShadowNodeFamilyFragment;
    use crate::props::RootProps;
    use crate::root::{DefaultRootNodeFactory, RootNode, RootNodeFactory};
    use crate::telemetry::MountingTelemetry;
    use arbor_event::NoopEventEmitter;
    use std::sync::Arc;

    fn revision(number: u64) -> ShadowTreeRevision {
        let surface_id = SurfaceId::new(1);
        let root = DefaultRootNodeFactory.create_root_node(
            ShadowNodeFamilyFragment {
                tag: surface_id.root_tag(),
                surface_id,
                component_name: RootNode::COMPONENT_NAME,
                event_emitter: Arc::new(NoopEventEmitter),
            },
            Arc::new(RootProps::default()),
        );
        root.seal_recursive();
        ShadowTreeRevision::new(
            Arc::new(root),
            RevisionNumber::new(number),
            MountingTelemetry::default(),
        )
    }

    #[test]
    fn test_keeps_only_latest() {
        let coordinator = MountingCoordinator::new(revision(0));
        assert!(coordinator.pull_revision().is_none());

        coordinator.push(revision(1));
        coordinator.push(revision(2));
        assert_eq!(coordinator.latest_revision_number(), RevisionNumber::new(2));

        let pulled = coordinator.pull_revision().unwrap();
        assert_eq!(pulled.number(), RevisionNumber::new(2));
        assert_eq!(coordinator.base_revision().number(), RevisionNumber::new(2));
        assert!(coordinator.pull_revision().is_none());
    }

    #[test]
    fn test_stale_push_is_dropped() {
        let coordinator = MountingCoordinator::new(revision(0));
        coordinator.push(revision(2));
        coordinator.push(revision(1));
        assert_eq!(coordinator.pull_revision().unwrap().number(), RevisionNumber::new(2));

        coordinator.push(revision(2));
        assert!(!coordinator.has_pending_revision());
    }

    #[test]
    fn test_revoke_hides_revisions() {
        let coordinator = MountingCoordinator::new(revision(0));
        coordinator.push(revision(1));
        coordinator.revoke();

        assert!(coordinator.is_revoked());
        assert!(coordinator.pull_revision().is_none());

        coordinator.push(revision(2));
        assert!(coordinator.pull_revision().is_none());
        assert!(!coordinator.wait_for_revision(Duration::from_millis(5)));
    }

    #[test]
    fn test_wait_for_revision() {
        let coordinator = Arc::new(MountingCoordinator::new(revision(0)));
        assert!(!coordinator.wait_for_revision(Duration::from_millis(5)));

        let pusher = {
            let coordinator = coordinator.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                coordinator.push(revision(1));
            })
        };

        assert!(coordinator.wait_for_revision(Duration::from_secs(5)));
        pusher.join().unwrap();
        assert_eq!(coordinator.pull_revision().unwrap().number(), RevisionNumber::new(1));
    }
}
