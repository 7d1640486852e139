//! Geometric primitives for container layout.
//!
//! This module provides the geometric types used throughout Trellis to
//! describe where an element sits inside its parent and how large it is.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate (or vector) in container space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Axis`] - The stacking direction of a container
//! - [`Padding`] - Leading (`min`) and trailing (`max`) insets of a container
//!
//! # Coordinate System
//!
//! Positions are relative to the parent's top-left corner:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! An element's position is the position of its own top-left corner.

use serde::Deserialize;

/// A 2D point representing a position (or offset) in container space.
///
/// # Examples
///
/// ```
/// # use trellis_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Returns the coordinate lying on `axis`.
    ///
    /// [`Axis::None`] has no coordinate and yields `0.0`.
    pub fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
            Axis::None => 0.0,
        }
    }

    /// Returns a copy of this point with the coordinate on `axis` replaced.
    ///
    /// The other coordinate is left untouched. [`Axis::None`] returns the
    /// point unchanged.
    pub fn with_along(self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::Horizontal => Self { x: value, ..self },
            Axis::Vertical => Self { y: value, ..self },
            Axis::None => self,
        }
    }

    /// Converts a top-left point and a size into a bounds rectangle
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_top_left(self, size)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns the extent along the stacking direction `axis`.
    ///
    /// [`Axis::None`] has no stacking direction and yields `0.0`.
    pub fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
            Axis::None => 0.0,
        }
    }

    /// Returns the extent perpendicular to `axis`.
    ///
    /// [`Axis::None`] has no cross direction and yields `0.0`.
    pub fn across(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.height,
            Axis::Vertical => self.width,
            Axis::None => 0.0,
        }
    }

    /// Returns a copy of this size with the extent on `axis` replaced.
    ///
    /// [`Axis::None`] returns the size unchanged.
    pub fn with_along(self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::Horizontal => Self {
                width: value,
                ..self
            },
            Axis::Vertical => Self {
                height: value,
                ..self
            },
            Axis::None => self,
        }
    }
}

impl From<[f32; 2]> for Size {
    fn from([width, height]: [f32; 2]) -> Self {
        Self::new(width, height)
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Merges two bounds to create a larger bounds that contains both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use trellis_core::geometry::{Bounds, Point, Size};
    /// let header = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let content = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let combined = header.merge(&content);
    /// assert_eq!(combined.width(), 130.0);
    /// assert_eq!(combined.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Stacking direction of a layout container.
///
/// [`Axis::None`] containers never reposition their children; they only
/// drive nested containers and keep their own size bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    None,
    Vertical,
    Horizontal,
}

impl Axis {
    /// Returns `true` for [`Axis::Vertical`] and [`Axis::Horizontal`].
    pub fn is_stacking(self) -> bool {
        !matches!(self, Axis::None)
    }
}

/// Container insets expressed as two vectors.
///
/// `min` is the leading inset and `max` the trailing inset: on the stack
/// axis the first child starts at `min` and the container ends `max` after
/// the last child. Negative values are legal and produce overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Padding {
    #[serde(default)]
    min: Point,
    #[serde(default)]
    max: Point,
}

impl Padding {
    /// Creates padding from its leading and trailing vectors
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates padding with the same inset on every side
    pub fn uniform(value: f32) -> Self {
        Self {
            min: Point::new(value, value),
            max: Point::new(value, value),
        }
    }

    /// Returns the leading inset vector
    pub fn min(self) -> Point {
        self.min
    }

    /// Returns the trailing inset vector
    pub fn max(self) -> Point {
        self.max
    }

    /// Leading inset projected on `axis`
    pub fn leading(self, axis: Axis) -> f32 {
        self.min.along(axis)
    }

    /// Trailing inset projected on `axis`
    pub fn trailing(self, axis: Axis) -> f32 {
        self.max.along(axis)
    }
}
