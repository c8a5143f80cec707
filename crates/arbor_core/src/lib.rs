//! # arbor_core - Arbor Core Primitives
//!
//! Small, dependency-light building blocks shared by every Arbor crate:
//! - **Identifiers**: view tags, surface ids and node family ids
//! - **Layout primitives**: geometry, layout metrics, constraints and context
//!
//! Nothing in here knows about trees or commits; it only describes how a
//! node is addressed and where it sits on screen.

pub mod id;
pub mod layout;

pub use id::*;
pub use layout::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::{FamilyId, SurfaceId, Tag};
    pub use crate::layout::{
        DisplayType, EdgeInsets, LayoutConstraints, LayoutContext, LayoutDirection,
        LayoutMetrics, Point, Rect, Size,
    };
}
