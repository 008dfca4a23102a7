//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key, pointer and touch mapping)
//! - Frame pacing and loop teardown
//!
//! Storage lives in [`crate::persistence`].

pub mod frame;
pub mod input;

pub use frame::{FixedStep, FrameLoop};
pub use input::SwipeTracker;
