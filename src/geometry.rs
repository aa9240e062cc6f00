//! Rectangle and coordinate-space arithmetic.
//!
//! This module provides the [`Rect`] type all region geometry is stored in,
//! and the [`ViewTransform`] that relates the three nested coordinate
//! spaces:
//!
//! - **native**: page-space pixels, the space every persisted rectangle
//!   lives in;
//! - **display**: the on-screen canvas, `native * display_scale`;
//! - **viewport**: what the pointer measures after magnification,
//!   `display * zoom`.
//!
//! The spaces compose multiplicatively, so pointer-derived geometry is
//! divided by `display_scale * zoom` before it is stored on a region, and
//! stored geometry is multiplied by the same factors before it is drawn.

pub use geo::Coord;
use serde::{Deserialize, Serialize};

/// Lower bound of the interactive zoom range.
pub const ZOOM_MIN: f32 = 0.25;

/// Upper bound of the interactive zoom range.
pub const ZOOM_MAX: f32 = 3.0;

/// Clamps a zoom level to the supported `[0.25, 3.0]` range.
#[inline]
#[must_use]
pub fn clamp_zoom(level: f32) -> f32 {
    level.clamp(ZOOM_MIN, ZOOM_MAX)
}

/// An axis-aligned rectangle in `f32` coordinates.
///
/// The coordinate system assumes:
/// - **X-axis**: increases from left to right
/// - **Y-axis**: increases from top to bottom (standard image coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a normalized rectangle from two opposite corners in any
    /// order, so rectangles dragged out leftward or upward come out with
    /// positive extents.
    #[must_use]
    pub fn from_corners(a: Coord<f32>, b: Coord<f32>) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Returns the maximum x coordinate (right edge).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the maximum y coordinate (bottom edge).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the center point of the rectangle.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Coord<f32> {
        Coord {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Returns this rectangle with every component multiplied by `factor`.
    #[inline]
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns this rectangle shifted by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, point: Coord<f32>) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// The native → display → viewport mapping for one rendered page.
///
/// `display_scale` is the page's layout scale (recomputed whenever the page
/// is fitted to its container); `zoom` is the interactive magnification on
/// top of it. The base canvas itself is not zoom-transformed, so conversions
/// that target it use the display factor only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub display_scale: f32,
    pub zoom: f32,
}

impl ViewTransform {
    #[inline]
    #[must_use]
    pub fn new(display_scale: f32, zoom: f32) -> Self {
        Self {
            display_scale,
            zoom,
        }
    }

    /// Combined native → viewport factor.
    #[inline]
    #[must_use]
    pub fn viewport_factor(&self) -> f32 {
        self.display_scale * self.zoom
    }

    /// Maps a native-space point to display space.
    #[inline]
    #[must_use]
    pub fn to_display(&self, point: Coord<f32>) -> Coord<f32> {
        Coord {
            x: point.x * self.display_scale,
            y: point.y * self.display_scale,
        }
    }

    /// Maps a native-space point all the way to viewport space.
    #[inline]
    #[must_use]
    pub fn to_viewport(&self, point: Coord<f32>) -> Coord<f32> {
        let factor = self.viewport_factor();
        Coord {
            x: point.x * factor,
            y: point.y * factor,
        }
    }

    /// Maps a pointer position in viewport space back to native space.
    #[inline]
    #[must_use]
    pub fn from_viewport(&self, point: Coord<f32>) -> Coord<f32> {
        let factor = self.viewport_factor();
        Coord {
            x: point.x / factor,
            y: point.y / factor,
        }
    }

    /// Maps a display-space point back to native space. Used by the base
    /// canvas, which magnification does not transform.
    #[inline]
    #[must_use]
    pub fn from_display(&self, point: Coord<f32>) -> Coord<f32> {
        Coord {
            x: point.x / self.display_scale,
            y: point.y / self.display_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_zoom_bounds() {
        assert_eq!(clamp_zoom(0.1), ZOOM_MIN);
        assert_eq!(clamp_zoom(5.0), ZOOM_MAX);
        assert_eq!(clamp_zoom(1.0), 1.0);
    }

    #[test]
    fn test_from_corners_normalizes() {
        let rect = Rect::from_corners(Coord { x: 50.0, y: 80.0 }, Coord { x: 10.0, y: 20.0 });
        assert_eq!(rect, Rect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_viewport_round_trip() {
        // displayScale = 0.5 and zoom = 2 cancel out exactly.
        let transform = ViewTransform::new(0.5, 2.0);
        let native = Coord { x: 200.0, y: 100.0 };

        let viewport = transform.to_viewport(native);
        assert!((viewport.x - 200.0).abs() < 1e-4);
        assert!((viewport.y - 100.0).abs() < 1e-4);

        let recovered = transform.from_viewport(viewport);
        assert!((recovered.x - native.x).abs() < 1e-4);
        assert!((recovered.y - native.y).abs() < 1e-4);
    }

    #[test]
    fn test_from_display_inverts_display_mapping() {
        // Magnification plays no part in the base-canvas mapping.
        let transform = ViewTransform::new(0.5, 2.0);
        let native = Coord { x: 80.0, y: 60.0 };

        let recovered = transform.from_display(transform.to_display(native));
        assert!((recovered.x - native.x).abs() < 1e-4);
        assert!((recovered.y - native.y).abs() < 1e-4);
    }

    #[test]
    fn test_display_and_viewport_compose() {
        let transform = ViewTransform::new(0.8, 1.5);
        let native = Coord { x: 100.0, y: 40.0 };

        let display = transform.to_display(native);
        let viewport = transform.to_viewport(native);
        assert!((display.x * transform.zoom - viewport.x).abs() < 1e-4);
        assert!((display.y * transform.zoom - viewport.y).abs() < 1e-4);
    }
}
