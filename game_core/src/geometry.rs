//! Conversion between the resolution-independent arena space (percent of the
//! arena extent) and concrete coordinates.

use glam::DVec2;

/// Map a raw coordinate inside `[0, extent]` to a percentage of `extent`
pub fn normalize(raw: f64, extent: f64) -> f64 {
    raw * 100.0 / extent
}

/// Inverse of [`normalize`]
pub fn denormalize(percentage: f64, extent: f64) -> f64 {
    percentage * extent / 100.0
}

/// Normalize a point against a 2D extent
pub fn normalize_point(raw: DVec2, extent: DVec2) -> DVec2 {
    DVec2::new(normalize(raw.x, extent.x), normalize(raw.y, extent.y))
}

/// Denormalize a point against a 2D extent
pub fn denormalize_point(percentage: DVec2, extent: DVec2) -> DVec2 {
    DVec2::new(
        denormalize(percentage.x, extent.x),
        denormalize(percentage.y, extent.y),
    )
}

/// A concrete pixel rectangle the arena is drawn into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: DVec2,
    pub size: DVec2,
}

impl Viewport {
    pub fn new(origin: DVec2, size: DVec2) -> Self {
        Self { origin, size }
    }

    /// Square playfield fitted into a canvas: 90% of the short side,
    /// centered horizontally, with a 5% top margin.
    pub fn fit_square(canvas_width: f64, canvas_height: f64) -> Self {
        let side = canvas_width.min(canvas_height) * 0.9;
        Self {
            origin: DVec2::new(canvas_width / 2.0 - side / 2.0, 0.05 * side),
            size: DVec2::splat(side),
        }
    }

    /// Percent-space position to pixels
    pub fn to_pixels(&self, percentage: DVec2) -> DVec2 {
        self.origin + denormalize_point(percentage, self.size)
    }

    /// Pixel position to percent space
    pub fn from_pixels(&self, pixels: DVec2) -> DVec2 {
        normalize_point(pixels - self.origin, self.size)
    }

    /// Speeds scale with the viewport but ignore its origin
    pub fn speed_to_pixels(&self, percentage: DVec2) -> DVec2 {
        denormalize_point(percentage, self.size)
    }

    pub fn speed_from_pixels(&self, pixels: DVec2) -> DVec2 {
        normalize_point(pixels, self.size)
    }
}
