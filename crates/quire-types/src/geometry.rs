//! Screen-space geometry for drop-zone resolution.
//!
//! All coordinates live in one global (screen-relative) space. Nothing here
//! knows about rendering; a rect is just the last thing the host measured.

use serde::{Deserialize, Serialize};

/// A pointer position in global coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A measured block rectangle. Always written as one value, never field by field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top edge (same as `y`).
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = LayoutRect::new(0.0, 100.0, 320.0, 50.0);
        assert_eq!(r.top(), 100.0);
        assert_eq!(r.center_y(), 125.0);
        assert_eq!(r.bottom(), 150.0);
    }

    #[test]
    fn test_rect_contains() {
        let r = LayoutRect::new(10.0, 10.0, 100.0, 20.0);
        assert!(r.contains(Point::new(10.0, 30.0)));
        assert!(!r.contains(Point::new(9.0, 15.0)));
        assert!(!r.contains(Point::new(50.0, 31.0)));
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
