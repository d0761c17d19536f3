//! Pan/zoom transform shared by every map-anchored layer.
//!
//! The view stores where the world origin sits in canvas pixels and the
//! slippy-map zoom level. At zoom `z` one world unit spans `2^z` pixels.

use crate::domain::Point;

/// Lowest zoom level (whole world in one tile).
pub const MIN_ZOOM: u8 = 0;

/// Highest zoom level served by common tile sources.
pub const MAX_ZOOM: u8 = 19;

/// Current map transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    offset_x: f64,
    offset_y: f64,
    zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(0.0, 0.0, MIN_ZOOM)
    }
}

impl MapView {
    #[must_use]
    pub fn new(offset_x: f64, offset_y: f64, zoom: u8) -> Self {
        Self {
            offset_x,
            offset_y,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Canvas position of the world origin.
    #[must_use]
    pub const fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    #[must_use]
    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    fn scale(zoom: u8) -> f64 {
        f64::from(1_u32 << zoom)
    }

    /// Shifts the map content by a pixel delta.
    pub fn pan_by(&mut self, dx: i32, dy: i32) {
        self.offset_x += f64::from(dx);
        self.offset_y += f64::from(dy);
    }

    /// Changes the zoom level by `steps`, keeping the world point under
    /// `anchor` fixed on screen.
    ///
    /// Returns `false` when the level is already at the requested bound.
    pub fn zoom_at(&mut self, anchor: Point, steps: i32) -> bool {
        let target = i32::from(self.zoom)
            .saturating_add(steps)
            .clamp(i32::from(MIN_ZOOM), i32::from(MAX_ZOOM));
        let Ok(target) = u8::try_from(target) else {
            return false;
        };
        if target == self.zoom {
            return false;
        }

        let ax = f64::from(anchor.x);
        let ay = f64::from(anchor.y);
        let ratio = Self::scale(target) / Self::scale(self.zoom);

        self.offset_x = ax - (ax - self.offset_x) * ratio;
        self.offset_y = ay - (ay - self.offset_y) * ratio;
        self.zoom = target;
        true
    }

    /// Converts a canvas point to world coordinates at the current zoom.
    #[must_use]
    pub fn to_world(&self, point: Point) -> (f64, f64) {
        let scale = Self::scale(self.zoom);
        (
            (f64::from(point.x) - self.offset_x) / scale,
            (f64::from(point.y) - self.offset_y) / scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_moves_offset_by_delta() {
        let mut view = MapView::default();
        view.pan_by(10, -4);
        assert_eq!(view.offset(), (10.0, -4.0));
    }

    #[test]
    fn zoom_keeps_anchor_world_point_fixed() {
        let mut view = MapView::new(20.0, 30.0, 3);
        let anchor = Point::new(100, 60);
        let before = view.to_world(anchor);

        assert!(view.zoom_at(anchor, 2));
        assert_eq!(view.zoom(), 5);

        let after = view.to_world(anchor);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped_to_tile_range() {
        let mut view = MapView::new(0.0, 0.0, MAX_ZOOM);
        assert!(!view.zoom_at(Point::new(0, 0), 1));
        assert_eq!(view.zoom(), MAX_ZOOM);

        let mut view = MapView::new(0.0, 0.0, 1);
        assert!(view.zoom_at(Point::new(0, 0), -5));
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn extreme_zoom_steps_clamp() {
        let mut view = MapView::new(0.0, 0.0, 3);
        assert!(view.zoom_at(Point::new(0, 0), i32::MAX));
        assert_eq!(view.zoom(), MAX_ZOOM);
        assert!(view.zoom_at(Point::new(0, 0), i32::MIN));
        assert_eq!(view.zoom(), MIN_ZOOM);
    }
}
