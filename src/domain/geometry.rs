//! Component-space geometry shared by the controller, overlay and layers.

use serde::{Deserialize, Serialize};

/// A point in the hosting canvas's pixel coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the `(dx, dy)` displacement from `origin` to `self`, saturating
    /// at the `i32` range.
    #[must_use]
    pub const fn delta_from(self, origin: Self) -> (i32, i32) {
        (self.x.saturating_sub(origin.x), self.y.saturating_sub(origin.y))
    }
}

/// An axis-aligned rectangle with a top-left corner and non-negative extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the normalized rectangle spanned by two arbitrary corners.
    ///
    /// ```
    /// use probemap::domain::{Point, Rect};
    ///
    /// let rect = Rect::from_corners(Point::new(50, 40), Point::new(10, 10));
    /// assert_eq!(rect, Rect::new(10, 10, 40, 30));
    /// ```
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: i32::try_from(a.x.abs_diff(b.x)).unwrap_or(i32::MAX),
            height: i32::try_from(a.y.abs_diff(b.y)).unwrap_or(i32::MAX),
        }
    }

    /// True when the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x.saturating_add(self.width)
            && point.y < self.y.saturating_add(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_normalizes_any_drag_direction() {
        let expected = Rect::new(10, 10, 40, 30);
        assert_eq!(Rect::from_corners(Point::new(10, 10), Point::new(50, 40)), expected);
        assert_eq!(Rect::from_corners(Point::new(50, 10), Point::new(10, 40)), expected);
        assert_eq!(Rect::from_corners(Point::new(10, 40), Point::new(50, 10)), expected);
    }

    #[test]
    fn zero_extent_rect_is_empty() {
        let rect = Rect::from_corners(Point::new(7, 7), Point::new(7, 20));
        assert!(rect.is_empty());
        assert_eq!(rect.height, 13);
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(Point::new(-2, 0)));

        let edge = Rect::new(i32::MAX - 1, 0, 10, 1);
        assert!(edge.contains(Point::new(i32::MAX - 1, 0)));
        assert!(rect.contains(Point::new(9, 9)));
        assert!(!rect.contains(Point::new(10, 5)));
    }

    #[test]
    fn extreme_corners_saturate_instead_of_overflowing() {
        let rect = Rect::from_corners(Point::new(i32::MIN, 0), Point::new(i32::MAX, 1));
        assert_eq!(rect, Rect::new(i32::MIN, 0, i32::MAX, 1));
        assert!(rect.contains(Point::new(0, 0)));

        let far = Point::new(i32::MAX, i32::MIN);
        assert_eq!(far.delta_from(Point::new(-1, 1)), (i32::MAX, i32::MIN));
        assert_eq!(Point::new(i32::MIN, 0).delta_from(far), (i32::MIN, i32::MAX));
    }
}
