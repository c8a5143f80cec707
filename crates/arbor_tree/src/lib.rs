//! # arbor_tree - Revisioned Shadow Trees
//!
//! A shadow tree is the immutable, persistent description of what one
//! surface should display. This crate commits new versions of that tree:
//!
//! ```text
//! Producer A ──┐
//!              ├──► ShadowTree::commit ──► MountingCoordinator ──► Mounting layer
//! Producer B ──┘          │
//!                         └──► layout events ──► EventDispatcher
//! ```
//!
//! ## Key Concepts
//!
//! - **ShadowNode**: Copy-on-write snapshot of a node; clones share
//!   unchanged children and keep their family identity
//! - **Transaction**: Pure function from the current root to a candidate
//! - **Commit**: Optimistic swap of the root, retried on contention
//! - **Liveness diff**: Positional walk maintaining `mounted` flags
//! - **Revision**: Numbered, sealed snapshot handed to the mounting layer

pub mod config;
pub mod coordinator;
pub mod error;
pub mod layout;
mod mounting;
pub mod node;
pub mod props;
pub mod registry;
pub mod revision;
pub mod root;
pub mod shadow_tree;
pub mod state;
pub mod telemetry;

pub use config::ShadowTreeConfig;
pub use coordinator::MountingCoordinator;
pub use error::{ConfigError, ConfigResult, RegistryError, RegistryResult};
pub use layout::{AffectedNode, LayoutEngine, NoopLayoutEngine};
pub use node::{
    empty_children, ShadowNode, ShadowNodeFamily, ShadowNodeFamilyFragment, ShadowNodeFragment,
    SharedChildren, SharedShadowNode,
};
pub use props::{Props, RootProps, SharedProps, ViewProps};
pub use registry::ShadowTreeRegistry;
pub use revision::{RevisionNumber, ShadowTreeRevision};
pub use root::{DefaultRootNodeFactory, RootNode, RootNodeFactory};
pub use shadow_tree::{CommitStatus, ShadowTree, ShadowTreeBuilder, ShadowTreeDelegate};
pub use state::{SharedState, StateContainer, VersionedState};
pub use telemetry::MountingTelemetry;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        CommitStatus, DefaultRootNodeFactory, LayoutEngine, MountingCoordinator, RevisionNumber,
        RootNode, ShadowNode, ShadowNodeFamilyFragment, ShadowNodeFragment, ShadowTree,
        ShadowTreeBuilder, ShadowTreeConfig, ShadowTreeDelegate, ShadowTreeRegistry,
        ShadowTreeRevision, SharedShadowNode,
    };
    pub use arbor_core::prelude::*;
}
