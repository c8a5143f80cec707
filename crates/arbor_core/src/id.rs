//! Identifiers for addressing nodes and surfaces

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Platform view tag of a node
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag(i32);

impl Tag {
    /// Create a tag from its raw value
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Tag used by nodes that are never addressed by the platform
    #[inline]
    pub const fn invalid() -> Self {
        Self(-1)
    }

    /// Check if this tag addresses a real view
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 >= 0
    }

    /// Get the raw value
    #[inline]
    pub const fn raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Tag {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

/// Identifier of a rendering surface (one tree per surface)
///
/// The root node of a surface uses the surface id as its own tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceId(i32);

impl SurfaceId {
    /// Create a surface id from its raw value
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw value
    #[inline]
    pub const fn raw(&self) -> i32 {
        self.0
    }

    /// The tag of this surface's root node
    #[inline]
    pub const fn root_tag(&self) -> Tag {
        Tag::new(self.0)
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SurfaceId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

/// Persistent logical identity of a node across tree revisions
///
/// Every clone of a node keeps its family id; only brand-new nodes get a
/// fresh one. Two snapshots are "the same node" iff their family ids match,
/// whatever their content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FamilyId(u64);

impl FamilyId {
    /// Allocate a new unique family id
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FamilyId({})", self.0)
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}
