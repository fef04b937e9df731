//! Axis-aligned rectangle geometry
//!
//! Rectangles are in map pixels with y growing downward. `right` and `bottom`
//! are exclusive edges, so two rectangles that share an edge do not overlap.

use glam::Vec2;

/// One of the two independent axes of motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Resolution order within a frame
    pub const ORDER: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Component of `v` along this axis
    #[inline]
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }

    /// Mutable component of `v` along this axis
    #[inline]
    pub fn of_mut(self, v: &mut Vec2) -> &mut f32 {
        match self {
            Axis::Horizontal => &mut v.x,
            Axis::Vertical => &mut v.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Corners in the order top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left(), self.top()),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.left(), self.bottom()),
            Vec2::new(self.right(), self.bottom()),
        ]
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Penetration depth along one axis (zero or negative when separated on it)
    pub fn penetration_on(&self, other: &Rect, axis: Axis) -> f32 {
        let (a_min, a_max, b_min, b_max) = match axis {
            Axis::Horizontal => (self.left(), self.right(), other.left(), other.right()),
            Axis::Vertical => (self.top(), self.bottom(), other.top(), other.bottom()),
        };
        a_max.min(b_max) - a_min.max(b_min)
    }

    /// Same center, every side scaled by `ratio`
    pub fn scaled(&self, ratio: f32) -> Rect {
        Rect::from_center_size(self.center(), self.size * ratio)
    }

    /// Overlap test after shrinking both rectangles about their centers
    pub fn overlaps_scaled(&self, other: &Rect, ratio: f32) -> bool {
        self.scaled(ratio).overlaps(&other.scaled(ratio))
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::from_min_size(self.min + offset, self.size)
    }
}
