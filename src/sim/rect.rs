//! Axis-aligned rectangle geometry
//!
//! Screen-style coordinates: `x` grows right, `y` grows down. A rectangle
//! covers the half-open ranges `[x, x + width)` and `[y, y + height)`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at `pos` with the given size
    pub fn at(pos: DVec2, width: f64, height: f64) -> Self {
        Self::new(pos.x, pos.y, width, height)
    }

    /// Top-left corner
    #[inline]
    pub fn pos(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True for zero-area (or negative) rectangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// True if every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Half-open overlap test. Empty rectangles never overlap anything.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        overlaps(self, other)
    }

    /// True if the horizontal spans intersect (ignoring y)
    #[inline]
    pub fn spans_x(&self, other: &Rect) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }

    /// True if the vertical spans intersect (ignoring x)
    #[inline]
    pub fn spans_y(&self, other: &Rect) -> bool {
        self.bottom() > other.top() && self.top() < other.bottom()
    }

    /// Move the rectangle by `delta`
    pub fn translate(&mut self, delta: DVec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Move the top-left corner to `pos`
    pub fn move_to(&mut self, pos: DVec2) {
        self.x = pos.x;
        self.y = pos.y;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

/// Half-open AABB overlap test
///
/// `a.x < b.x + b.w && a.x + a.w > b.x` and likewise for y.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.spans_x(b) && a.spans_y(b)
}
