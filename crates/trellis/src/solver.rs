//! Stack positioning math.
//!
//! The solver is pure: it never touches a hierarchy. The coordinator feeds
//! it one child at a time as a pass advances, and [`LayoutSolver::solve`]
//! runs the same math over a whole snapshot at once.
//!
//! For a stacking axis and `N` participating children with extents `s1..sN`:
//!
//! ```text
//! position(k) = padding.min + s1 + ... + s(k-1) + spacing * (k - 1)
//! size        = padding.min + s1 + ... + sN + spacing * (N - 1) + padding.max
//! ```
//!
//! The cross-axis size is carried over from the previous computed size and
//! both axes are floored by `minimum_size`.

use trellis_core::geometry::{Axis, Point, Size};

use crate::{
    node::{LayoutConfig, Placement},
    snapshot::{ChildEntry, ChildSnapshot},
};

/// Running position along a stacking axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackCursor {
    axis: Axis,
    spacing: f32,
    trailing: f32,
    cursor: f32,
    content_cross: f32,
}

impl StackCursor {
    /// Starts a cursor at the leading padding of `config`.
    pub fn new(config: &LayoutConfig) -> Self {
        let axis = config.axis();
        let padding = config.padding();
        Self {
            axis,
            spacing: config.spacing(),
            trailing: padding.trailing(axis),
            cursor: padding.leading(axis),
            content_cross: 0.0,
        }
    }

    /// Offset the next child will be placed at.
    pub fn offset(&self) -> f32 {
        self.cursor
    }

    /// Largest cross-axis extent seen so far.
    pub fn content_cross(&self) -> f32 {
        self.content_cross
    }

    /// Places a child and advances past it.
    ///
    /// Returns `position` with its stack-axis coordinate replaced by the
    /// cursor. Spacing is added after every child except the last one.
    pub fn place(&mut self, position: Point, size: Size, is_last: bool) -> Point {
        let placed = position.with_along(self.axis, self.cursor);

        self.cursor += size.along(self.axis);
        if !is_last {
            self.cursor += self.spacing;
        }
        self.content_cross = self.content_cross.max(size.across(self.axis));

        placed
    }

    /// Final size: stack extent plus trailing padding, cross extent taken
    /// from `previous`, floored by `minimum`.
    pub fn finish(&self, previous: Size, minimum: Size) -> Size {
        previous
            .with_along(self.axis, self.cursor + self.trailing)
            .max(minimum)
    }
}

/// Result of laying out one container.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    placements: Vec<Placement>,
    size: Size,
    content_cross: f32,
}

impl Solution {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Size to publish as the container's `computed_size`
    pub fn size(&self) -> Size {
        self.size
    }

    /// Largest cross-axis extent among placed children.
    ///
    /// Informational only; the published cross size is never derived from it.
    pub fn content_cross(&self) -> f32 {
        self.content_cross
    }

    pub fn into_parts(self) -> (Size, Vec<Placement>) {
        (self.size, self.placements)
    }
}

/// Incremental solver for a single container pass.
#[derive(Debug, Clone)]
pub struct LayoutSolver {
    config: LayoutConfig,
    cursor: StackCursor,
    placements: Vec<Placement>,
}

impl LayoutSolver {
    /// Creates a solver for one pass. `config` is copied, so later edits of
    /// the node's configuration do not affect this pass.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            cursor: StackCursor::new(&config),
            config,
            placements: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn axis(&self) -> Axis {
        self.config.axis()
    }

    /// Places a participating child measured at `size`.
    ///
    /// With [`Axis::None`] the child keeps its captured position.
    pub fn place(&mut self, entry: &ChildEntry, size: Size) -> Point {
        let position = if self.axis().is_stacking() {
            self.cursor.place(entry.position(), size, entry.is_last())
        } else {
            entry.position()
        };

        self.placements.push(Placement::new(
            entry.handle(),
            position,
            size,
            entry.is_last(),
        ));
        position
    }

    /// Closes the pass and computes the container size.
    pub fn finish(self, previous: Size) -> Solution {
        let minimum = self.config.minimum_size();
        let size = if self.axis().is_stacking() {
            self.cursor.finish(previous, minimum)
        } else {
            previous.max(minimum)
        };

        Solution {
            size,
            content_cross: self.cursor.content_cross(),
            placements: self.placements,
        }
    }

    /// Lays out a flat snapshot using each entry's captured size.
    pub fn solve(config: LayoutConfig, snapshot: &ChildSnapshot, previous: Size) -> Solution {
        let mut solver = Self::new(config);
        for entry in snapshot.participating() {
            solver.place(entry, entry.size());
        }
        solver.finish(previous)
    }
}
