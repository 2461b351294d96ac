//! Initial placement of a freshly loaded image.
//!
//! The image is fitted along its limiting dimension, enlarged if its smaller
//! side would end up below the visibility floor, capped at a maximum scale,
//! and centered in the visible area.

use lumacanvas_core::constants::{MAX_PLACEMENT_SCALE, MIN_VISIBLE_EXTENT};
use lumacanvas_core::{Point, Size};

/// Where and how large an image should appear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub scale: f64,
}

impl Placement {
    /// Returned whenever the inputs are unusable.
    pub const FALLBACK: Placement = Placement {
        position: Point::ORIGIN,
        scale: 1.0,
    };
}

/// Bounds applied by [`place_centered_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementLimits {
    /// The smaller displayed side should be at least this many logical units.
    pub min_visible_extent: f64,
    /// Placement never scales up beyond this.
    pub max_scale: f64,
}

impl PlacementLimits {
    /// Scale that maps the smaller natural side to the visibility floor.
    pub fn min_scale_for(&self, natural: Size) -> f64 {
        (self.min_visible_extent / natural.width).max(self.min_visible_extent / natural.height)
    }
}

impl Default for PlacementLimits {
    fn default() -> Self {
        Self {
            min_visible_extent: MIN_VISIBLE_EXTENT,
            max_scale: MAX_PLACEMENT_SCALE,
        }
    }
}

/// Places an image with the default limits.
pub fn place_centered(natural: Size, viewport: Size) -> Placement {
    place_centered_with(natural, viewport, &PlacementLimits::default())
}

/// Computes the centered position and scale of an image.
///
/// ```text
/// fit   = viewport.w / natural.w   if the image is wider than the viewport
///         viewport.h / natural.h   otherwise
/// scale = min(max(fit, floor), max_scale)
/// ```
pub fn place_centered_with(natural: Size, viewport: Size, limits: &PlacementLimits) -> Placement {
    if !natural.is_valid() || !viewport.is_valid() {
        tracing::debug!(
            "Unusable placement input (natural {}, viewport {})",
            natural,
            viewport
        );
        return Placement::FALLBACK;
    }

    let fit_scale = if natural.aspect_ratio() > viewport.aspect_ratio() {
        viewport.width / natural.width
    } else {
        viewport.height / natural.height
    };

    let scale = fit_scale
        .max(limits.min_scale_for(natural))
        .min(limits.max_scale);
    if !scale.is_finite() || scale <= 0.0 {
        return Placement::FALLBACK;
    }

    let displayed = natural.scaled(scale);
    let position = Point::new(
        (viewport.width - displayed.width) / 2.0,
        (viewport.height - displayed.height) / 2.0,
    );

    Placement { position, scale }
}
