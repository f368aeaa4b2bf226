//! Integer layout geometry.
//!
//! All coordinates are in layout grid units.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An enumeration of axis-aligned directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Dir {
    /// The horizontal, or x-aligned, direction.
    Horiz,
    /// The vertical, or y-aligned, direction.
    Vert,
}

/// A point in two-dimensional layout-space.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, (0, 0).
    #[inline]
    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// A horizontal and vertical rectangular dimension with no specified location.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct Dims {
    w: i64,
    h: i64,
}

impl Dims {
    /// Creates a new [`Dims`] from a width and height.
    pub fn new(w: i64, h: i64) -> Self {
        Self { w, h }
    }

    /// Creates a new [`Dims`] with width and height equal to `value`.
    pub fn square(value: i64) -> Self {
        Self { w: value, h: value }
    }

    /// Returns a mutable reference to the dimension in the specified direction.
    pub fn dim_mut(&mut self, dir: Dir) -> &mut i64 {
        match dir {
            Dir::Vert => &mut self.h,
            Dir::Horiz => &mut self.w,
        }
    }

    /// Returns the direction of the strictly longer dimension.
    ///
    /// Square dimensions report [`Dir::Vert`].
    pub fn wider_dir(&self) -> Dir {
        if self.w > self.h {
            Dir::Horiz
        } else {
            Dir::Vert
        }
    }

    /// Returns `true` if both dimensions are at least as large as those of `other`.
    pub fn covers(&self, other: Dims) -> bool {
        self.w >= other.w && self.h >= other.h
    }

    #[inline]
    pub fn w(&self) -> i64 {
        self.w
    }

    #[inline]
    pub fn h(&self) -> i64 {
        self.h
    }

    /// Converts this dimension object into a [`Rect`] anchored at the origin.
    #[inline]
    pub fn into_rect(self) -> Rect {
        Rect::with_dims(self)
    }
}

impl Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rect {
    /// The lower-left corner.
    pub p0: Point,
    /// The upper-right corner.
    pub p1: Point,
}

impl Rect {
    /// Creates a new rectangle, normalizing the corners.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// Creates a rectangle with points `(0, 0), (dims.w(), dims.h())`.
    pub fn with_dims(dims: Dims) -> Self {
        Self::new(Point::zero(), Point::new(dims.w(), dims.h()))
    }

    /// Creates a rectangle with lower-left corner `p0` and the given dimensions.
    pub fn from_corner_dims(p0: Point, dims: Dims) -> Self {
        Self::new(p0, Point::new(p0.x + dims.w(), p0.y + dims.h()))
    }

    #[inline]
    pub fn left(&self) -> i64 {
        self.p0.x
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.p0.y
    }

    #[inline]
    pub fn right(&self) -> i64 {
        self.p1.x
    }

    #[inline]
    pub fn top(&self) -> i64 {
        self.p1.y
    }

    /// Returns the rectangle shrunk by `amount` on every side.
    ///
    /// The result may be degenerate if `amount` exceeds half of either dimension.
    pub fn shrink(&self, amount: i64) -> Self {
        Self {
            p0: Point::new(self.p0.x + amount, self.p0.y + amount),
            p1: Point::new(self.p1.x - amount, self.p1.y - amount),
        }
    }

    /// Returns `true` if `other` lies entirely within this rectangle, edges included.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.p0.x <= other.p0.x
            && self.p0.y <= other.p0.y
            && other.p1.x <= self.p1.x
            && other.p1.y <= self.p1.y
    }
}
