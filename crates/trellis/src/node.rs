//! Layout containers: configuration and cached results.
//!
//! A [`LayoutNode`] annotates one element of the host hierarchy. It holds the
//! container's [`LayoutConfig`] and the results of its last pass. It never
//! owns its children; those are read from the hierarchy on every pass.

use serde::Deserialize;

use trellis_core::geometry::{Axis, Padding, Point, Size};

use crate::hierarchy::NodeId;

/// Stacking configuration of a container.
///
/// Values are taken verbatim. Negative spacing or padding is a legitimate
/// way to make children overlap and is never clamped.
///
/// # Examples
///
/// ```
/// # use trellis::node::LayoutConfig;
/// # use trellis_core::geometry::{Axis, Padding, Size};
/// let config = LayoutConfig::new(Axis::Vertical)
///     .with_spacing(5.0)
///     .with_padding(Padding::uniform(8.0))
///     .with_minimum_size(Size::new(0.0, 40.0));
/// assert_eq!(config.axis(), Axis::Vertical);
/// assert_eq!(config.spacing(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    axis: Axis,
    padding: Padding,
    spacing: f32,
    minimum_size: Size,
}

impl LayoutConfig {
    /// Creates a configuration stacking along `axis` with no padding,
    /// spacing or minimum size.
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            ..Self::default()
        }
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_minimum_size(mut self, minimum_size: Size) -> Self {
        self.minimum_size = minimum_size;
        self
    }

    /// Stacking direction
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Gap between consecutive participating children
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Floor applied to the computed size before it is published
    pub fn minimum_size(&self) -> Size {
        self.minimum_size
    }
}

/// Where one child ended up during its parent's last pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    node: NodeId,
    position: Point,
    size: Size,
    is_last: bool,
}

impl Placement {
    pub fn new(node: NodeId, position: Point, size: Size, is_last: bool) -> Self {
        Self {
            node,
            position,
            size,
            is_last,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Size the child was measured with
    pub fn size(&self) -> Size {
        self.size
    }

    /// Whether no later sibling participated, so no trailing spacing was added
    pub fn is_last(&self) -> bool {
        self.is_last
    }
}

/// Layout state attached to a container element.
///
/// `computed_size` is the value a parent reads when it measures this node.
/// Only the update coordinator publishes it, and always as a whole, at the
/// end of the node's pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    config: LayoutConfig,
    computed_size: Size,
    placements: Vec<Placement>,
}

impl LayoutNode {
    /// Creates a layout node. `initial_size` seeds `computed_size`, whose
    /// cross-axis component is carried over by every stacking pass.
    pub fn new(config: LayoutConfig, initial_size: Size) -> Self {
        Self {
            config,
            computed_size: initial_size,
            placements: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Last published size.
    pub fn computed_size(&self) -> Size {
        self.computed_size
    }

    /// Children placed by the last pass, in snapshot order.
    ///
    /// A cancelled pass only records the children it reached.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub(crate) fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    pub(crate) fn publish(&mut self, size: Size, placements: Vec<Placement>) {
        self.computed_size = size;
        self.placements = placements;
    }
}
