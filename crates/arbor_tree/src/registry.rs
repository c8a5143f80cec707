//! Shadow tree registry - one tree per running surface

use crate::error::{RegistryError, RegistryResult};
use crate::shadow_tree::ShadowTree;
use arbor_core::SurfaceId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Thread-safe map from surface to its shadow tree
///
/// Callbacks passed to [`visit`](Self::visit) and
/// [`enumerate`](Self::enumerate) run without the registry lock held, so
/// they may commit or even add and remove surfaces.
#[derive(Default)]
pub struct ShadowTreeRegistry {
    trees: RwLock<HashMap<SurfaceId, Arc<ShadowTree>>>,
}

impl ShadowTreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tree under its surface id
    pub fn add(&self, shadow_tree: ShadowTree) -> RegistryResult<Arc<ShadowTree>> {
        let surface_id = shadow_tree.surface_id();
        let mut trees = self.trees.write();
        if trees.contains_key(&surface_id) {
            return Err(RegistryError::DuplicateSurface(surface_id));
        }

        let shadow_tree = Arc::new(shadow_tree);
        trees.insert(surface_id, shadow_tree.clone());
        log::debug!("Registered shadow tree for surface {}", surface_id);
        Ok(shadow_tree)
    }

    /// Unregister a tree, handing back the registry's reference
    pub fn remove(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        let removed = self.trees.write().remove(&surface_id);
        if removed.is_some() {
            log::debug!("Unregistered shadow tree for surface {}", surface_id);
        }
        removed
    }

    pub fn get(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        self.trees.read().get(&surface_id).cloned()
    }

    /// Run `f` on the tree of `surface_id`, if registered
    pub fn visit<R>(&self, surface_id: SurfaceId, f: impl FnOnce(&ShadowTree) -> R) -> Option<R> {
        let shadow_tree = self.get(surface_id)?;
        Some(f(&shadow_tree))
    }

    /// Run `f` on every registered tree, in surface id order
    pub fn enumerate(&self, mut f: impl FnMut(&ShadowTree)) {
        let mut trees: Vec<Arc<ShadowTree>> = self.trees.read().values().cloned().collect();
        trees.sort_by_key(|tree| tree.surface_id());
        for tree in &trees {
            f(tree);
        }
    }

    /// Registered surface ids, sorted
    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        let mut ids: Vec<SurfaceId> = self.trees.read().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }

    /// Tear a surface down: unmount everything, then unregister its tree
    ///
    /// The tree's revisions stop being published once the last reference
    /// to it is dropped.
    pub fn stop_surface(&self, surface_id: SurfaceId) -> RegistryResult<Arc<ShadowTree>> {
        let shadow_tree = self
            .get(surface_id)
            .ok_or(RegistryError::UnknownSurface(surface_id))?;
        shadow_tree.commit_empty_tree();
        self.remove(surface_id);
        Ok(shadow_tree)
    }
}

impl std::fmt::Debug for ShadowTreeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowTreeRegistry")
            .field("surfaces", &self.surface_ids())
            .finish()
    }
}
