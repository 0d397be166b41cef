use std::collections::HashMap;

use tracing::debug;

use crate::config::CanvasConfig;
use crate::coords::{ContainerSize, FieldPosition};
use crate::drag::{Action, DragEngine, DragError, FrameHandle, FrameScheduler, ManualFrames, Point};
use crate::field::{FieldConfig, FieldKey};
use crate::layout::{self, Alignment, Axis, Clipboard, LayoutError, Transform};
use crate::model::{PositionMap, PositionPatch};

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

/// A toolbar layout command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutOp {
    SnapToGrid(f64),
    Align(Alignment),
    Distribute(Axis),
    Transform(Transform),
}

/// Core canvas state: the committed positions, field descriptors, the drag engine,
/// and the layout clipboard.
///
/// Owns the reentrancy rule: layout operations are refused while a drag is live, so a
/// batch write can never interleave with an in-flight drag tick. State is reachable
/// read-only; every write goes through a guarded method.
pub struct EngineCore<S: FrameScheduler = ManualFrames> {
    positions: PositionMap,
    fields: HashMap<FieldKey, FieldConfig>,
    drag: DragEngine<S>,
    clipboard: Clipboard,
}

impl EngineCore<ManualFrames> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_scheduler(ManualFrames::new(), CanvasConfig::default())
    }
}

impl Default for EngineCore<ManualFrames> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FrameScheduler> EngineCore<S> {
    #[must_use]
    pub fn with_scheduler(scheduler: S, config: CanvasConfig) -> Self {
        Self {
            positions: PositionMap::new(),
            fields: HashMap::new(),
            drag: DragEngine::new(scheduler).with_snap_threshold(config.snap_threshold),
            clipboard: Clipboard::default(),
        }
    }

    // --- Data inputs ---

    /// Replace the field descriptors.
    pub fn load_fields(&mut self, fields: impl IntoIterator<Item = FieldConfig>) {
        self.fields = fields.into_iter().map(|f| (f.key.clone(), f)).collect();
    }

    /// Hydrate positions from the document store. Any live drag is torn down first.
    pub fn load_positions(&mut self, entries: impl IntoIterator<Item = (FieldKey, FieldPosition)>) {
        self.drag.teardown();
        self.positions.load(entries);
    }

    /// Programmatic whole-position write.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DragInProgress`] while a drag is live.
    pub fn set_position(&mut self, key: &str, position: FieldPosition) -> Result<Vec<Action>, LayoutError> {
        if self.drag.is_dragging() {
            return Err(LayoutError::DragInProgress);
        }
        let position = self.positions.set(key, position);
        Ok(vec![Action::Committed { key: key.to_string(), position }])
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.drag.set_edit_mode(enabled);
    }

    pub fn set_container(&mut self, container: Option<ContainerSize>) {
        self.drag.set_container(container);
    }

    // --- Pointer input ---

    /// # Errors
    ///
    /// See [`DragEngine::pointer_down`].
    pub fn on_pointer_down(&mut self, key: &str, pointer: Point) -> Result<(), DragError> {
        self.drag.pointer_down(key, pointer, &self.positions)
    }

    pub fn on_pointer_move(&mut self, pointer: Point) {
        self.drag.pointer_move(pointer);
    }

    pub fn on_frame(&mut self, handle: FrameHandle) -> Vec<Action> {
        self.drag.on_frame(handle, &self.positions)
    }

    /// Release: commit and announce the move.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        let mut actions = self.drag.pointer_up(&mut self.positions);
        let announcement = actions.iter().find_map(|a| match a {
            Action::Committed { key, .. } => Some(format!("{} repositioned", self.label(key))),
            _ => None,
        });
        if let Some(text) = announcement {
            actions.push(Action::Announce(text));
        }
        actions
    }

    /// The view owning the canvas unmounted.
    pub fn teardown(&mut self) -> Vec<Action> {
        self.drag.teardown()
    }

    // --- Layout ---

    /// Run a toolbar layout command over `selection` and commit the result.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DragInProgress`] while a drag is live, or the
    /// operation's own validation error.
    pub fn apply_layout(&mut self, op: LayoutOp, selection: &[FieldKey]) -> Result<Vec<Action>, LayoutError> {
        if self.drag.is_dragging() {
            return Err(LayoutError::DragInProgress);
        }
        let patch = match op {
            LayoutOp::SnapToGrid(grid) => layout::snap_to_grid(&self.positions, selection, grid)?,
            LayoutOp::Align(alignment) => layout::align(&self.positions, selection, alignment),
            LayoutOp::Distribute(axis) => layout::distribute(&self.positions, selection, axis),
            LayoutOp::Transform(t) => layout::transform(&self.positions, selection, t)?,
        };
        debug!(?op, count = patch.len(), "layout applied");
        Ok(self.commit_patch(&patch))
    }

    /// Snapshot `selection` into the clipboard. Returns the number of positions copied.
    pub fn copy(&mut self, selection: &[FieldKey]) -> usize {
        self.clipboard = Clipboard::copy(&self.positions, selection);
        self.clipboard.len()
    }

    /// Paste the clipboard onto `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DragInProgress`] while a drag is live.
    pub fn paste(&mut self, targets: &[FieldKey]) -> Result<Vec<Action>, LayoutError> {
        if self.drag.is_dragging() {
            return Err(LayoutError::DragInProgress);
        }
        let patch = self.clipboard.paste(targets);
        Ok(self.commit_patch(&patch))
    }

    // --- Queries ---

    #[must_use]
    pub fn position(&self, key: &str) -> Option<FieldPosition> {
        self.positions.get(key)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldConfig> {
        self.fields.get(key)
    }

    /// The committed model.
    #[must_use]
    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    #[must_use]
    pub fn drag(&self) -> &DragEngine<S> {
        &self.drag
    }

    #[must_use]
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// The host's render clock, e.g. to drain [`ManualFrames::take_due`].
    pub fn scheduler_mut(&mut self) -> &mut S {
        self.drag.scheduler_mut()
    }

    fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.fields.get(key).map_or(key, FieldConfig::display_name)
    }

    fn commit_patch(&mut self, patch: &PositionPatch) -> Vec<Action> {
        self.positions.apply(patch);
        patch
            .iter()
            .filter_map(|(key, _)| {
                self.positions
                    .get(key)
                    .map(|position| Action::Committed { key: key.clone(), position })
            })
            .collect()
    }
}
