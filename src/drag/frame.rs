//! Render-clock abstraction for frame-coalesced drag ticks.
//!
//! The host owns the real clock (a display refresh callback, a timer, or a test
//! harness). The engine only asks for "the next frame" and may cancel that request.
//! When a frame fires, the host hands its [`FrameHandle`] back to the engine.

use std::collections::VecDeque;

/// Opaque identifier for one requested frame. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Schedules at most one callback per display frame.
pub trait FrameScheduler {
    /// Request a callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a previously requested frame. Cancelling an already-fired or unknown
    /// handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A scheduler the host drives by hand: requested frames queue up until
/// [`ManualFrames::take_due`] is called, typically once per host render pass.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualFrames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain every outstanding frame, oldest first.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        self.pending.drain(..).collect()
    }

    /// Outstanding (requested, not cancelled, not yet taken) frames.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total frames ever requested.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total frames cancelled while still outstanding.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() < before {
            self.cancelled += 1;
        }
    }
}
