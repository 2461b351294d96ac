//! Viewport and coordinate transformation for the infinite canvas.
//!
//! Handles conversion between screen coordinates (pointer space) and canvas
//! coordinates (image layout space). Manages zoom and pan operations so that
//! the point under the cursor stays put while zooming.

use std::fmt;

use lumacanvas_core::constants::{
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use lumacanvas_core::{Point, Size, ViewportTransform};

/// Represents the viewport transformation state (zoom and pan).
///
/// Zoom is intentionally unbounded; the only guard is that it stays finite
/// and positive.
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: ViewportTransform,
    size: Size,
    drag_anchor: Option<Point>,
    wheel_zoom_in: f64,
    wheel_zoom_out: f64,
}

impl Viewport {
    /// Creates a new viewport with an identity transform.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            transform: ViewportTransform::IDENTITY,
            size: Size::new(width, height),
            drag_anchor: None,
            wheel_zoom_in: WHEEL_ZOOM_IN,
            wheel_zoom_out: WHEEL_ZOOM_OUT,
        }
    }

    /// Overrides the multipliers used by [`Viewport::wheel`].
    pub fn with_wheel_factors(mut self, zoom_in: f64, zoom_out: f64) -> Self {
        self.wheel_zoom_in = zoom_in;
        self.wheel_zoom_out = zoom_out;
        self
    }

    /// Gets the visible area size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Sets the visible area size (typically called when the host resizes).
    ///
    /// Invalid sizes are ignored.
    pub fn set_size(&mut self, size: Size) {
        if size.is_valid() {
            self.size = size;
        } else {
            tracing::warn!("Ignoring invalid viewport size {}", size);
        }
    }

    /// Gets the current transform.
    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    /// Replaces the transform wholesale, e.g. when restoring a snapshot.
    pub fn set_transform(&mut self, transform: ViewportTransform) {
        if transform.is_valid() {
            self.transform = transform;
        } else {
            tracing::warn!("Ignoring invalid viewport transform {}", transform);
        }
    }

    /// Gets the current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.transform.zoom_scale
    }

    /// Gets the pan offset.
    pub fn offset(&self) -> Point {
        self.transform.offset
    }

    /// Zooms by `factor` keeping the screen point `point` visually fixed.
    ///
    /// ```text
    /// zoom'   = zoom * factor
    /// offset' = point - (point - offset) * factor
    /// ```
    ///
    /// Returns false (and leaves the transform untouched) when the factor or
    /// the resulting transform is not finite and positive.
    pub fn zoom_at(&mut self, point: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 || !point.is_finite() {
            tracing::warn!("Rejecting zoom by {} at {}", factor, point);
            return false;
        }

        let next = ViewportTransform::new(
            self.transform.zoom_scale * factor,
            point - (point - self.transform.offset) * factor,
        );
        if !next.is_valid() {
            tracing::warn!("Zoom by {} would leave a degenerate transform", factor);
            return false;
        }

        self.transform = next;
        true
    }

    /// Mouse wheel zoom at the pointer: scrolling down zooms out, anything else zooms in.
    pub fn wheel(&mut self, point: Point, delta_y: f64) -> bool {
        let factor = if delta_y > 0.0 {
            self.wheel_zoom_out
        } else {
            self.wheel_zoom_in
        };
        self.zoom_at(point, factor)
    }

    /// Pans by a delta amount. The canvas is infinite, nothing is clamped.
    pub fn pan_by(&mut self, delta: Point) -> bool {
        let offset = self.transform.offset + delta;
        if !offset.is_finite() {
            return false;
        }
        self.transform.offset = offset;
        true
    }

    /// Resets zoom to 1.0 and the offset to the origin.
    pub fn reset(&mut self) {
        self.transform = ViewportTransform::IDENTITY;
        self.drag_anchor = None;
    }

    /// Starts a background drag at the given screen point.
    pub fn begin_drag(&mut self, screen: Point) {
        self.drag_anchor = Some(screen - self.transform.offset);
    }

    /// Moves the canvas so that the grab point follows the pointer.
    ///
    /// Returns false when no drag is in progress.
    pub fn drag_to(&mut self, screen: Point) -> bool {
        match self.drag_anchor {
            Some(anchor) => {
                let offset = screen - anchor;
                if !offset.is_finite() {
                    return false;
                }
                self.transform.offset = offset;
                true
            }
            None => false,
        }
    }

    /// Ends the drag. Returns true if one was in progress.
    pub fn end_drag(&mut self) -> bool {
        self.drag_anchor.take().is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Converts a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.transform.screen_to_canvas(screen)
    }

    /// Converts canvas coordinates to a screen point.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.transform.canvas_to_screen(canvas)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | Size: {}", self.transform, self.size)
    }
}
