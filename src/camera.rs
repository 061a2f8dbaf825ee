//! Coordinate model: points, rectangles, and the zoom camera.
//!
//! Region geometry is stored in base space (zoom 1.0). Pointer events arrive
//! in screen space, which is base space scaled by the camera zoom. There is no
//! pan: the overlay surface origin is the page's top-left corner.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::Serialize;

use crate::consts::{ZOOM_MAX, ZOOM_MIN};

/// A point in either screen or base space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a page, surface, or image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle. Width and height may be negative while a draw
/// gesture is in flight; [`Rect::normalized`] flips the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test; both operands must share a coordinate space.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Flip a negative width/height so the rectangle grows right and down.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut r = self;
        if r.width < 0.0 {
            r.x += r.width;
            r.width = -r.width;
        }
        if r.height < 0.0 {
            r.y += r.height;
            r.height = -r.height;
        }
        r
    }

    /// Grow the rectangle by `pad` on every side.
    #[must_use]
    pub fn inflate(self, pad: f64) -> Self {
        Self::new(self.x - pad, self.y - pad, self.width + pad * 2.0, self.height + pad * 2.0)
    }
}

/// Clamp a requested zoom factor to the supported range.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

/// Scale every component of a base-space rectangle into screen space.
#[must_use]
pub fn to_screen(base: Rect, zoom: f64) -> Rect {
    Rect::new(base.x * zoom, base.y * zoom, base.width * zoom, base.height * zoom)
}

/// Inverse of [`to_screen`].
#[must_use]
pub fn to_base(screen: Rect, zoom: f64) -> Rect {
    Rect::new(screen.x / zoom, screen.y / zoom, screen.width / zoom, screen.height / zoom)
}

/// Zoom camera for the page view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        Self { zoom: clamp_zoom(zoom) }
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped. Returns `true` if the value changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let next = clamp_zoom(zoom);
        let changed = (next - self.zoom).abs() > f64::EPSILON;
        self.zoom = next;
        changed
    }

    /// Convert a screen-space point to base coordinates.
    #[must_use]
    pub fn screen_to_base(&self, screen: Point) -> Point {
        Point::new(screen.x / self.zoom, screen.y / self.zoom)
    }

    #[must_use]
    pub fn rect_to_screen(&self, base: Rect) -> Rect {
        to_screen(base, self.zoom)
    }

    #[must_use]
    pub fn rect_to_base(&self, screen: Rect) -> Rect {
        to_base(screen, self.zoom)
    }
}
