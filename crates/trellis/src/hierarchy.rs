//! The seam between the layout engine and the host element tree.
//!
//! The engine never owns elements. It reads children, participation and
//! box sizes through [`Hierarchy`] and writes back positions and sizes of
//! existing elements; it never adds, removes or reorders them.

use std::fmt;

use trellis_core::geometry::{Axis, Point, Size};

use crate::node::LayoutNode;

/// Generational handle to an element of a host hierarchy.
///
/// A handle stays valid until its element is destroyed. Slots are reused
/// with a bumped generation, so a stale handle never resolves to the
/// element that took its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Creates a handle from a slot index and generation.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of this handle.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Host element tree as seen by the layout engine.
///
/// Implementations must return children in a stable order. Every query on
/// a handle that is no longer alive must answer as if the element does not
/// exist (`false`, `None`, empty slice, or a no-op for writes).
pub trait Hierarchy {
    /// Returns `true` while `node` refers to a live element.
    fn contains(&self, node: NodeId) -> bool;

    /// Current children of `node` in stable order.
    fn children(&self, node: NodeId) -> &[NodeId];

    /// Returns `true` if `node` is active in the hierarchy and not excluded
    /// from layout.
    fn participates(&self, node: NodeId) -> bool;

    /// Current box size of `node`.
    fn size(&self, node: NodeId) -> Option<Size>;

    /// Current position of `node` relative to its parent.
    fn position(&self, node: NodeId) -> Option<Point>;

    fn set_position(&mut self, node: NodeId, position: Point);

    fn set_size(&mut self, node: NodeId, size: Size);

    /// Resize a leaf to its preferred content extent along `axis`.
    ///
    /// Called right before a leaf is measured by a stacking parent. The
    /// default implementation leaves the element untouched.
    fn fit_content(&mut self, _node: NodeId, _axis: Axis) {}

    /// Layout configuration and results if `node` is a layout container.
    fn layout(&self, node: NodeId) -> Option<&LayoutNode>;

    fn layout_mut(&mut self, node: NodeId) -> Option<&mut LayoutNode>;
}
