//! Batch layout operations over a selection of fields.
//!
//! Each operation reads the committed [`PositionMap`], computes new positions for the
//! targeted keys, and returns them as a [`PositionPatch`]. Nothing is written until the
//! caller applies the patch, so an operation is all-or-nothing. Keys in the selection
//! that have no committed position are ignored. Every produced position is clamped.

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;

use tracing::debug;

use crate::coords::{FieldPosition, clamp};
use crate::field::FieldKey;
use crate::model::{PositionMap, PositionPatch};

/// Offset applied to pasted positions so they never land exactly on the source.
pub const PASTE_OFFSET: f64 = 2.0;

/// Minimum selection size for which distribution is meaningful.
pub const MIN_DISTRIBUTE_COUNT: usize = 3;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("grid size must be a positive finite number (got {0})")]
    InvalidGridSize(f64),
    #[error("scale must be a finite number (got {0})")]
    InvalidScale(f64),
    #[error("offsets must be finite (got x={x}, y={y})")]
    InvalidOffset { x: f64, y: f64 },
    #[error("layout operations are disabled while a drag is in progress")]
    DragInProgress,
}

// =============================================================================
// TYPES
// =============================================================================

/// Axis along which positions are compared or spaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left-to-right; operates on `left`.
    Horizontal,
    /// Top-to-bottom; operates on `top`.
    Vertical,
}

impl Axis {
    fn read(self, position: FieldPosition) -> f64 {
        match self {
            Self::Horizontal => position.left,
            Self::Vertical => position.top,
        }
    }

    fn write(self, position: FieldPosition, value: f64) -> FieldPosition {
        match self {
            Self::Horizontal => FieldPosition { left: value, ..position },
            Self::Vertical => FieldPosition { top: value, ..position },
        }
    }
}

/// Alignment target. Left/center/right act on `left`; top/middle/bottom act on `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl Alignment {
    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Center | Self::Right => Axis::Horizontal,
            Self::Top | Self::Middle | Self::Bottom => Axis::Vertical,
        }
    }
}

/// A toolbar transform: scale takes precedence over offsets when both are given.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    /// Added to `left` when no scale is given.
    pub offset_x: Option<f64>,
    /// Added to `top` when no scale is given.
    pub offset_y: Option<f64>,
    /// Multiplies both axes.
    pub scale: Option<f64>,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Round each targeted position to the nearest multiple of `grid_size`.
///
/// Halfway values round away from zero.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidGridSize`] for zero, negative, or non-finite sizes.
pub fn snap_to_grid(
    positions: &PositionMap,
    selection: &[FieldKey],
    grid_size: f64,
) -> Result<PositionPatch, LayoutError> {
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return Err(LayoutError::InvalidGridSize(grid_size));
    }
    let snap = |v: f64| (v / grid_size).round() * grid_size;

    let mut patch = PositionPatch::new();
    for (key, position) in selected(positions, selection) {
        patch.push(key.clone(), clamp(FieldPosition::new(snap(position.top), snap(position.left))));
    }
    Ok(patch)
}

/// Align the selection to the min, mean, or max of the relevant axis.
#[must_use]
pub fn align(positions: &PositionMap, selection: &[FieldKey], alignment: Alignment) -> PositionPatch {
    let axis = alignment.axis();
    let items = selected(positions, selection);
    let values: Vec<f64> = items.iter().map(|(_, p)| axis.read(*p)).collect();
    let Some(target) = alignment_target(&values, alignment) else {
        return PositionPatch::new();
    };

    let mut patch = PositionPatch::new();
    for (key, position) in items {
        patch.push(key.clone(), clamp(axis.write(position, target)));
    }
    patch
}

fn alignment_target(values: &[f64], alignment: Alignment) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let target = match alignment {
        Alignment::Left | Alignment::Top => values.iter().copied().fold(f64::INFINITY, f64::min),
        Alignment::Right | Alignment::Bottom => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        #[allow(clippy::cast_precision_loss)]
        Alignment::Center | Alignment::Middle => values.iter().sum::<f64>() / values.len() as f64,
    };
    Some(target)
}

/// Re-space three or more fields evenly along `axis`, keeping the endpoints fixed.
///
/// Fields keep their current order along the axis; ties keep selection order.
/// Fewer than three fields produce an empty patch.
#[must_use]
pub fn distribute(positions: &PositionMap, selection: &[FieldKey], axis: Axis) -> PositionPatch {
    let mut items = selected(positions, selection);
    if items.len() < MIN_DISTRIBUTE_COUNT {
        debug!(count = items.len(), "distribute skipped; need at least three fields");
        return PositionPatch::new();
    }
    items.sort_by(|a, b| axis.read(a.1).total_cmp(&axis.read(b.1)));

    let first = axis.read(items[0].1);
    let last = axis.read(items[items.len() - 1].1);
    #[allow(clippy::cast_precision_loss)]
    let step = (last - first) / (items.len() - 1) as f64;

    let mut patch = PositionPatch::new();
    for (i, (key, position)) in items.into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let value = first + step * i as f64;
        patch.push(key.clone(), clamp(axis.write(position, value)));
    }
    patch
}

/// Offset or scale the selection. See [`Transform`] for precedence.
///
/// # Errors
///
/// Returns [`LayoutError`] when the scale or an offset is not finite.
pub fn transform(
    positions: &PositionMap,
    selection: &[FieldKey],
    transform: Transform,
) -> Result<PositionPatch, LayoutError> {
    let apply: Box<dyn Fn(FieldPosition) -> FieldPosition> = if let Some(scale) = transform.scale {
        if !scale.is_finite() {
            return Err(LayoutError::InvalidScale(scale));
        }
        Box::new(move |p| FieldPosition::new(p.top * scale, p.left * scale))
    } else {
        let dx = transform.offset_x.unwrap_or(0.0);
        let dy = transform.offset_y.unwrap_or(0.0);
        if !dx.is_finite() || !dy.is_finite() {
            return Err(LayoutError::InvalidOffset { x: dx, y: dy });
        }
        Box::new(move |p| p.offset(dy, dx))
    };

    let mut patch = PositionPatch::new();
    for (key, position) in selected(positions, selection) {
        patch.push(key.clone(), clamp(apply(position)));
    }
    Ok(patch)
}

// =============================================================================
// CLIPBOARD
// =============================================================================

/// Snapshot of copied positions, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    entries: Vec<FieldPosition>,
}

impl Clipboard {
    /// Capture the committed positions of `selection`.
    #[must_use]
    pub fn copy(positions: &PositionMap, selection: &[FieldKey]) -> Self {
        Self { entries: selected(positions, selection).into_iter().map(|(_, p)| p).collect() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paste onto `targets`.
    ///
    /// Equal sizes map 1:1 with a fixed +2% offset on both axes. Otherwise the first
    /// copied position is broadcast to every target, staggered by +2% per target
    /// (the first target gets +2%, the second +4%, and so on).
    #[must_use]
    pub fn paste(&self, targets: &[FieldKey]) -> PositionPatch {
        let mut patch = PositionPatch::new();
        let Some(first) = self.entries.first().copied() else {
            return patch;
        };

        if self.entries.len() == targets.len() {
            for (key, source) in targets.iter().zip(&self.entries) {
                patch.push(key.clone(), clamp(source.offset(PASTE_OFFSET, PASTE_OFFSET)));
            }
        } else {
            for (i, key) in targets.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let stagger = PASTE_OFFSET * (i + 1) as f64;
                patch.push(key.clone(), clamp(first.offset(stagger, stagger)));
            }
        }
        patch
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Selected keys that have a committed position, in selection order, deduplicated.
fn selected<'a>(positions: &PositionMap, selection: &'a [FieldKey]) -> Vec<(&'a FieldKey, FieldPosition)> {
    let mut out: Vec<(&FieldKey, FieldPosition)> = Vec::with_capacity(selection.len());
    for key in selection {
        if out.iter().any(|(k, _)| *k == key) {
            continue;
        }
        if let Some(position) = positions.get(key) {
            out.push((key, position));
        }
    }
    out
}
