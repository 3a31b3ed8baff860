//! Axis-aligned rectangles in top-left-origin raster or canvas space.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Area, zero for negative extents.
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Whether the rectangle encloses no area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    /// Area of the intersection with `other`.
    pub fn intersection_area(&self, other: &Self) -> f32 {
        let w = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let h = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);
        w * h
    }

    /// Intersection area divided by the smaller of the two areas.
    ///
    /// Returns 0.0 when either rectangle is degenerate.
    pub fn overlap_ratio(&self, other: &Self) -> f32 {
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / smaller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_ratio_uses_smaller_area() {
        let big = Rect::new(0.0, 0.0, 100.0, 100.0);
        let small = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(big.overlap_ratio(&small), 1.0);
        assert_eq!(small.overlap_ratio(&big), 1.0);
    }

    #[test]
    fn test_overlap_ratio_partial() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.overlap_ratio(&b), 0.25);
    }

    #[test]
    fn test_overlap_ratio_degenerate() {
        let a = Rect::new(0.0, 0.0, 0.0, 10.0);
        let b = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.overlap_ratio(&b), 0.0);
        assert!(a.is_degenerate());
    }
}
