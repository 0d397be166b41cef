//! Drag interaction engine: pointer gestures, frame coalescing, and commit on release.
//!
//! DESIGN
//! ======
//! `Idle -> Dragging -> Idle`. Pointer-down captures the start pointer and the field's
//! committed position. Pointer-moves only record the latest pointer and (re)schedule a
//! single frame; the candidate position is computed once per fired frame, so cost is
//! bounded by the display rate rather than the input rate. Each computed candidate is
//! reported as a pixel translation for a display-only surface and is never written to
//! the [`PositionMap`]. Pointer-up writes the final candidate as one whole-position
//! commit.
//!
//! CANCELLATION
//! ============
//! At most one frame is outstanding. A newer move cancels the older request, and
//! teardown cancels whatever is left, so a frame can never fire into a session that no
//! longer exists. A fired handle that does not match the live request is ignored.

pub mod frame;
pub mod snap;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use tracing::debug;

use crate::config::DEFAULT_SNAP_THRESHOLD;
use crate::coords::{ContainerSize, FieldPosition, clamp};
use crate::field::FieldKey;
use crate::model::PositionMap;

pub use frame::{FrameHandle, FrameScheduler, ManualFrames};
pub use snap::Guides;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("canvas is not in edit mode")]
    NotEditing,
    #[error("unknown field: {0}")]
    UnknownField(FieldKey),
    #[error("a drag is already in progress for {0}")]
    AlreadyDragging(FieldKey),
}

// =============================================================================
// TYPES
// =============================================================================

/// A pointer location in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
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

/// Work for the host to perform after an engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Translate the dragged field's view by this many pixels and show these guides.
    /// The committed model is untouched.
    Preview { key: FieldKey, dx_px: f64, dy_px: f64, guides: Guides },
    /// A whole position was written to the model.
    Committed { key: FieldKey, position: FieldPosition },
    /// Reset the dragged field's view transform to identity.
    ResetTransform { key: FieldKey },
    /// Hide all alignment guides.
    GuidesCleared,
    /// Screen-reader notification.
    Announce(String),
}

/// Live state for one drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Field being dragged.
    pub key: FieldKey,
    /// Pointer at pointer-down; every tick measures its delta from here.
    pub start_pointer: Point,
    /// Committed position at pointer-down.
    pub start_position: FieldPosition,
    /// Most recent pointer reported by a move.
    pub latest_pointer: Point,
    /// Most recently computed candidate, if any tick has run.
    pub candidate: Option<FieldPosition>,
    /// Guides for the most recent candidate.
    pub guides: Guides,
    /// The one outstanding frame request, if any.
    pub pending_frame: Option<FrameHandle>,
}

/// Gesture state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// A field is being dragged.
    Dragging(DragSession),
}

// =============================================================================
// ENGINE
// =============================================================================

/// The drag state machine, generic over the host's render clock.
pub struct DragEngine<S: FrameScheduler> {
    scheduler: S,
    state: DragState,
    container: Option<ContainerSize>,
    edit_mode: bool,
    snap_threshold: f64,
}

impl<S: FrameScheduler> DragEngine<S> {
    #[must_use]
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: DragState::Idle,
            container: None,
            edit_mode: false,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold;
        self
    }

    // --- Host inputs ---

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
    }

    /// Update the rendered page's pixel size. `None` means the element is gone.
    pub fn set_container(&mut self, container: Option<ContainerSize>) {
        self.container = container;
    }

    /// Begin dragging `key` from `pointer`.
    ///
    /// # Errors
    ///
    /// Fails when edit mode is off, the key has no committed position, or another drag
    /// is still live.
    pub fn pointer_down(&mut self, key: &str, pointer: Point, positions: &PositionMap) -> Result<(), DragError> {
        if !self.edit_mode {
            return Err(DragError::NotEditing);
        }
        if let DragState::Dragging(session) = &self.state {
            return Err(DragError::AlreadyDragging(session.key.clone()));
        }
        let Some(start_position) = positions.get(key) else {
            return Err(DragError::UnknownField(key.to_string()));
        };

        debug!(field = %key, "drag started");
        self.state = DragState::Dragging(DragSession {
            key: key.to_string(),
            start_pointer: pointer,
            start_position,
            latest_pointer: pointer,
            candidate: None,
            guides: Guides::default(),
            pending_frame: None,
        });
        Ok(())
    }

    /// Record a pointer move and make sure exactly one frame is scheduled for it.
    pub fn pointer_move(&mut self, pointer: Point) {
        let DragState::Dragging(session) = &mut self.state else {
            return;
        };
        session.latest_pointer = pointer;
        if let Some(stale) = session.pending_frame.take() {
            self.scheduler.cancel_frame(stale);
        }
        session.pending_frame = Some(self.scheduler.request_frame());
    }

    /// A scheduled frame fired. Computes the coalesced candidate if `handle` is current.
    pub fn on_frame(&mut self, handle: FrameHandle, positions: &PositionMap) -> Vec<Action> {
        let DragState::Dragging(session) = &mut self.state else {
            return Vec::new();
        };
        if session.pending_frame != Some(handle) {
            return Vec::new();
        }
        session.pending_frame = None;

        let Some(container) = self.container else {
            return Vec::new();
        };
        let Some((dx_px, dy_px)) = tick(session, container, positions, self.snap_threshold) else {
            return Vec::new();
        };
        vec![Action::Preview { key: session.key.clone(), dx_px, dy_px, guides: session.guides }]
    }

    /// Finish the drag and commit the final candidate into `positions`.
    ///
    /// A frame still outstanding at release is cancelled and its work done inline, so
    /// the commit reflects the last pointer the host reported. A press without any
    /// computed movement commits nothing.
    pub fn pointer_up(&mut self, positions: &mut PositionMap) -> Vec<Action> {
        let DragState::Dragging(mut session) = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        if let Some(handle) = session.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
            if let Some(container) = self.container {
                tick(&mut session, container, positions, self.snap_threshold);
            }
        }

        let mut actions = vec![Action::ResetTransform { key: session.key.clone() }, Action::GuidesCleared];
        if let Some(candidate) = session.candidate {
            let position = positions.set(session.key.clone(), candidate);
            debug!(field = %session.key, top = position.top, left = position.left, "drag committed");
            actions.push(Action::Committed { key: session.key, position });
        }
        actions
    }

    /// The owning view is going away. Drops the session and any outstanding frame
    /// without writing to the model.
    pub fn teardown(&mut self) -> Vec<Action> {
        let DragState::Dragging(mut session) = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        if let Some(handle) = session.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        debug!(field = %session.key, "drag torn down without commit");
        vec![Action::ResetTransform { key: session.key }, Action::GuidesCleared]
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    #[must_use]
    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

/// Compute the candidate for the session's latest pointer and return the view
/// translation in pixels. `None` when the container cannot be measured.
fn tick(
    session: &mut DragSession,
    container: ContainerSize,
    positions: &PositionMap,
    snap_threshold: f64,
) -> Option<(f64, f64)> {
    let dx = session.latest_pointer.x - session.start_pointer.x;
    let dy = session.latest_pointer.y - session.start_pointer.y;
    let (d_top, d_left) = container.pixel_delta_to_percent(dx, dy)?;

    let raw = clamp(session.start_position.offset(d_top, d_left));
    let (candidate, guides) = snap::snap_to_neighbours(raw, &session.key, positions, snap_threshold);
    session.candidate = Some(candidate);
    session.guides = guides;

    Some(container.percent_delta_to_pixels(
        candidate.top - session.start_position.top,
        candidate.left - session.start_position.left,
    ))
}
