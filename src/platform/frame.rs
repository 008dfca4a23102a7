//! Frame pacing
//!
//! [`FixedStep`] turns variable display frame deltas into whole simulation
//! ticks. [`FrameLoop`] tracks the pending animation-frame callback so the
//! loop can be torn down without leaving a live callback behind, and
//! restarted when the page comes back from the back/forward cache.

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Fixed timestep accumulator
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame timestamp in milliseconds, get the ticks to run.
    /// The first call runs one tick.
    pub fn advance_to(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time_ms = Some(now_ms);
        self.advance(dt)
    }

    /// Add `dt` seconds and return how many ticks are due
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Hit the substep cap: forget the backlog instead of chasing it
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Forget timing history (after the page was hidden, say)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time_ms = None;
    }
}

/// Shared handle to the animation-frame loop
///
/// Clones share state, so the frame closure and the teardown handler can
/// each hold one.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    alive: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
            pending: Rc::new(Cell::new(None)),
        }
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Remember the id of the callback just requested
    pub fn set_pending(&self, id: i32) {
        self.pending.set(Some(id));
    }

    pub fn pending(&self) -> Option<i32> {
        self.pending.get()
    }

    /// Run one frame body if the loop is still alive. Returns whether it ran.
    pub fn run_frame(&self, frame: impl FnOnce()) -> bool {
        self.pending.set(None);
        if !self.alive.get() {
            return false;
        }
        frame();
        true
    }

    /// Stop the loop. Returns the pending callback id that the caller must
    /// cancel with the platform, if any.
    pub fn cancel(&self) -> Option<i32> {
        if self.alive.replace(false) {
            log::info!("Frame loop stopped");
        }
        self.pending.take()
    }

    /// Restart a stopped loop. Returns true if it was stopped, in which case
    /// the caller must request the next frame.
    pub fn resume(&self) -> bool {
        if self.alive.replace(true) {
            return false;
        }
        log::info!("Frame loop resumed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_frame_one_tick() {
        let mut step = FixedStep::new();
        assert_eq!(step.advance(SIM_DT), 1);
        assert_eq!(step.advance(SIM_DT * 2.0), 2);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut step = FixedStep::new();
        assert_eq!(step.advance(SIM_DT * 0.5), 0);
        assert_eq!(step.advance(SIM_DT * 0.75), 1);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut step = FixedStep::new();
        assert_eq!(step.advance(5.0), MAX_SUBSTEPS);
        // Backlog was dropped, so a normal frame is normal again
        assert!(step.advance(SIM_DT) <= 2);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut step = FixedStep::new();
        assert_eq!(step.advance(-1.0), 0);
        // Nothing was banked either
        assert_eq!(step.advance(SIM_DT * 0.5), 0);
    }

    #[test]
    fn test_timestamps() {
        let mut step = FixedStep::new();
        assert_eq!(step.advance_to(1000.0), 1);
        assert_eq!(step.advance_to(1040.0), 2);
        step.reset();
        assert_eq!(step.advance_to(90_000.0), 1);
    }

    #[test]
    fn test_frame_after_cancel_is_noop() {
        let frame_loop = FrameLoop::new();
        let handle = frame_loop.clone();
        frame_loop.set_pending(7);

        assert_eq!(handle.cancel(), Some(7));
        assert!(!frame_loop.is_alive());

        let mut ran = false;
        assert!(!frame_loop.run_frame(|| ran = true));
        assert!(!ran);
        assert_eq!(frame_loop.cancel(), None);
    }

    #[test]
    fn test_resume_after_cancel() {
        let frame_loop = FrameLoop::new();
        let handle = frame_loop.clone();
        frame_loop.set_pending(3);
        assert_eq!(handle.cancel(), Some(3));

        assert!(handle.resume());
        assert!(frame_loop.is_alive());
        let mut ran = false;
        assert!(frame_loop.run_frame(|| ran = true));
        assert!(ran);
    }

    #[test]
    fn test_resume_running_loop_is_noop() {
        let frame_loop = FrameLoop::new();
        // A live loop already has a callback queued; no second one
        assert!(!frame_loop.resume());
        assert!(frame_loop.is_alive());
    }

    #[test]
    fn test_frame_runs_while_alive() {
        let frame_loop = FrameLoop::new();
        frame_loop.set_pending(1);
        let mut count = 0;
        assert!(frame_loop.run_frame(|| count += 1));
        assert_eq!(count, 1);
        assert_eq!(frame_loop.pending(), None);
    }
}
