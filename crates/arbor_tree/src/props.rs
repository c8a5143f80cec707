//! Node properties
//!
//! Props are owned by component implementations; the tree only needs to
//! know whether a node asked for layout events. Root props additionally
//! carry the constraints the whole tree is laid out within.

use arbor_core::{LayoutConstraints, LayoutContext};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Immutable, component-defined properties of a node
pub trait Props: Any + Send + Sync + fmt::Debug {
    /// Whether a layout event should be dispatched when the node's
    /// geometry changes
    fn wants_layout_events(&self) -> bool {
        false
    }

    /// Downcast support
    fn as_any(&self) -> &dyn Any;
}

/// Shared props handle
pub type SharedProps = Arc<dyn Props>;

/// Props common to every view-like node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewProps {
    /// Dispatch a layout event whenever the frame changes
    pub on_layout: bool,
    /// Identifier for tests and tooling
    pub native_id: Option<String>,
}

impl ViewProps {
    /// Props requesting layout events
    pub fn with_on_layout() -> Self {
        Self { on_layout: true, ..Self::default() }
    }
}

impl Props for ViewProps {
    fn wants_layout_events(&self) -> bool {
        self.on_layout
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Props of a tree's root node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootProps {
    pub view: ViewProps,
    pub layout_constraints: LayoutConstraints,
    pub layout_context: LayoutContext,
}

impl RootProps {
    /// Derive root props from `source` with new constraints and context
    pub fn new(
        source: &RootProps,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> Self {
        Self {
            view: source.view.clone(),
            layout_constraints,
            layout_context,
        }
    }
}

impl Props for RootProps {
    fn wants_layout_events(&self) -> bool {
        self.view.on_layout
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
