//! Coordinate model: percent-of-page field positions and their conversion to PDF points.
//!
//! DESIGN
//! ======
//! A field's position is stored as `top`/`left` percentages of the page height/width so
//! it survives any zoom level or render resolution. Conversion to PDF user space flips
//! the y axis (PDF origin is bottom-left) and subtracts a baseline offset, because PDF
//! text is placed by its baseline rather than by the top of its glyph box.
//!
//! Nothing here holds state; every function is safe to call from any task.

#[cfg(test)]
#[path = "coords_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

/// Lowest committed percentage on either axis.
pub const MIN_PERCENT: f64 = 0.0;

/// Highest committed percentage on either axis. Headroom keeps a field's box off the page edge.
pub const MAX_PERCENT: f64 = 95.0;

/// Cap-height-to-em approximation used to move from a box top to a text baseline.
pub const BASELINE_RATIO: f64 = 0.85;

// =============================================================================
// ERROR
// =============================================================================

/// Precondition violations on page or container geometry.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Page dimensions must be strictly positive.
    #[error("page dimensions must be positive (got {width}x{height}pt)")]
    NonPositivePage { width: f64, height: f64 },

    /// A NaN or infinite dimension was supplied.
    #[error("page dimensions must be finite (got {width}x{height}pt)")]
    NonFinite { width: f64, height: f64 },
}

// =============================================================================
// TYPES
// =============================================================================

/// A field's top-left corner in percent-of-page units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldPosition {
    /// Distance from the top edge as a percentage of page height.
    pub top: f64,
    /// Distance from the left edge as a percentage of page width.
    pub left: f64,
}

impl FieldPosition {
    #[must_use]
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// This position with both axes clamped into `[0, 95]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        clamp(self)
    }

    /// Whether both axes already satisfy the commit invariant.
    #[must_use]
    pub fn is_within_bounds(self) -> bool {
        (MIN_PERCENT..=MAX_PERCENT).contains(&self.top) && (MIN_PERCENT..=MAX_PERCENT).contains(&self.left)
    }

    /// Component-wise offset, unclamped.
    #[must_use]
    pub fn offset(self, d_top: f64, d_left: f64) -> Self {
        Self { top: self.top + d_top, left: self.left + d_left }
    }
}

/// Page size in PDF points. Construction validates the geometry precondition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    width_pt: f64,
    height_pt: f64,
}

impl PageSize {
    /// US Letter, 612x792pt.
    pub const LETTER: Self = Self { width_pt: 612.0, height_pt: 792.0 };

    /// Validate and wrap page dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] when either dimension is non-finite or not positive.
    pub fn new(width_pt: f64, height_pt: f64) -> Result<Self, GeometryError> {
        if !width_pt.is_finite() || !height_pt.is_finite() {
            return Err(GeometryError::NonFinite { width: width_pt, height: height_pt });
        }
        if width_pt <= 0.0 || height_pt <= 0.0 {
            return Err(GeometryError::NonPositivePage { width: width_pt, height: height_pt });
        }
        Ok(Self { width_pt, height_pt })
    }

    #[must_use]
    pub fn width_pt(self) -> f64 {
        self.width_pt
    }

    #[must_use]
    pub fn height_pt(self) -> f64 {
        self.height_pt
    }

    /// Absolute baseline point for text drawn at `position`.
    #[must_use]
    pub fn to_absolute(self, position: FieldPosition, font_size_pt: f64) -> AbsolutePoint {
        let x_pt = position.left / 100.0 * self.width_pt;
        let y_pt = self.height_pt - (position.top / 100.0 * self.height_pt) - baseline_offset(font_size_pt);
        AbsolutePoint { x_pt, y_pt }
    }

    /// Inverse of [`PageSize::to_absolute`]. The result is not clamped.
    #[must_use]
    pub fn to_position(self, point: AbsolutePoint, font_size_pt: f64) -> FieldPosition {
        let left = point.x_pt / self.width_pt * 100.0;
        let top = (self.height_pt - point.y_pt - baseline_offset(font_size_pt)) / self.height_pt * 100.0;
        FieldPosition { top, left }
    }
}

/// A point in PDF user space (origin bottom-left, units of 1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsolutePoint {
    pub x_pt: f64,
    pub y_pt: f64,
}

/// Pixel size of the element the page is rendered into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width_px: f64,
    pub height_px: f64,
}

impl ContainerSize {
    #[must_use]
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self { width_px, height_px }
    }

    /// Whether the container can be divided by. A zero-sized container is treated as absent.
    #[must_use]
    pub fn is_usable(self) -> bool {
        self.width_px.is_finite() && self.height_px.is_finite() && self.width_px > 0.0 && self.height_px > 0.0
    }

    /// Convert a pixel delta to a `(d_top, d_left)` percent delta.
    ///
    /// Returns `None` when the container has no usable area.
    #[must_use]
    pub fn pixel_delta_to_percent(self, dx_px: f64, dy_px: f64) -> Option<(f64, f64)> {
        if !self.is_usable() {
            return None;
        }
        Some((dy_px / self.height_px * 100.0, dx_px / self.width_px * 100.0))
    }

    /// Convert a `(d_top, d_left)` percent delta back to a pixel `(dx, dy)` translation.
    #[must_use]
    pub fn percent_delta_to_pixels(self, d_top: f64, d_left: f64) -> (f64, f64) {
        (d_left / 100.0 * self.width_px, d_top / 100.0 * self.height_px)
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

/// Vertical distance from a text box's top to its baseline.
#[must_use]
pub fn baseline_offset(font_size_pt: f64) -> f64 {
    font_size_pt * BASELINE_RATIO
}

/// Convert a percent-space position to the PDF baseline point for text of `font_size_pt`.
///
/// `x = left% * width`, `y = height - top% * height - 0.85 * font_size`. No rounding is
/// applied; callers round only when emitting operators.
///
/// # Errors
///
/// Returns [`GeometryError`] when the page dimensions are not positive and finite.
pub fn to_absolute_points(
    position: FieldPosition,
    page_width_pt: f64,
    page_height_pt: f64,
    font_size_pt: f64,
) -> Result<AbsolutePoint, GeometryError> {
    Ok(PageSize::new(page_width_pt, page_height_pt)?.to_absolute(position, font_size_pt))
}

/// Clamp both axes into `[0, 95]`. NaN collapses to 0.
#[must_use]
pub fn clamp(position: FieldPosition) -> FieldPosition {
    FieldPosition { top: clamp_percent(position.top), left: clamp_percent(position.left) }
}

/// Clamp a single percent value into `[0, 95]`. NaN collapses to 0.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_PERCENT;
    }
    value.clamp(MIN_PERCENT, MAX_PERCENT)
}
