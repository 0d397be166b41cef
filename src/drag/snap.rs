//! Neighbour snapping and alignment guides.
//!
//! A candidate's `left` snaps to the nearest neighbour `left` strictly within the
//! threshold, and likewise for `top`. Exact distance ties go to the neighbour that
//! comes first in the map's insertion order. Each axis yields at most one guide.

use crate::coords::FieldPosition;
use crate::model::PositionMap;

/// Transient guide lines shown while a drag is near a neighbour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Guides {
    /// A vertical line at this `left` percentage.
    pub vertical: Option<f64>,
    /// A horizontal line at this `top` percentage.
    pub horizontal: Option<f64>,
}

impl Guides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }
}

/// Snap `candidate` against every field except `dragged`.
#[must_use]
pub fn snap_to_neighbours(
    candidate: FieldPosition,
    dragged: &str,
    positions: &PositionMap,
    threshold: f64,
) -> (FieldPosition, Guides) {
    let mut best_left: Option<(f64, f64)> = None;
    let mut best_top: Option<(f64, f64)> = None;

    for (key, other) in positions.iter() {
        if key == dragged {
            continue;
        }
        consider(&mut best_left, candidate.left, other.left, threshold);
        consider(&mut best_top, candidate.top, other.top, threshold);
    }

    let mut snapped = candidate;
    let mut guides = Guides::default();
    if let Some((_, left)) = best_left {
        snapped.left = left;
        guides.vertical = Some(left);
    }
    if let Some((_, top)) = best_top {
        snapped.top = top;
        guides.horizontal = Some(top);
    }
    (snapped, guides)
}

// Keeps the strictly nearest match, so the first of equally distant neighbours wins.
fn consider(best: &mut Option<(f64, f64)>, value: f64, target: f64, threshold: f64) {
    let distance = (value - target).abs();
    if distance >= threshold {
        return;
    }
    match best {
        Some((best_distance, _)) if *best_distance <= distance => {}
        _ => *best = Some((distance, target)),
    }
}
