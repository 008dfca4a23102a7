//! Raw input to game commands
//!
//! Browser events are reduced to plain values (key names, pointer positions)
//! before reaching this module, so all of it runs and tests natively.

use glam::Vec2;

use crate::sim::InputCommand;

/// Touch travel (pixels) that separates a tap from a swipe
pub const SWIPE_THRESHOLD: f32 = 30.0;

/// What a key does in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBinding {
    Jump,
    Boost,
}

impl KeyBinding {
    /// Binding for a `KeyboardEvent.key` value
    pub fn for_key(key: &str) -> Option<Self> {
        match key {
            " " | "ArrowUp" | "w" | "W" => Some(KeyBinding::Jump),
            "Shift" | "ArrowRight" | "d" | "D" => Some(KeyBinding::Boost),
            _ => None,
        }
    }
}

/// Command for a key press. Auto-repeat presses are ignored.
pub fn key_down(key: &str, repeat: bool) -> Option<InputCommand> {
    if repeat {
        return None;
    }
    match KeyBinding::for_key(key)? {
        KeyBinding::Jump => Some(InputCommand::Jump),
        KeyBinding::Boost => Some(InputCommand::StartBoost),
    }
}

/// Command for a key release
pub fn key_up(key: &str) -> Option<InputCommand> {
    match KeyBinding::for_key(key)? {
        KeyBinding::Jump => None,
        KeyBinding::Boost => Some(InputCommand::StopBoost),
    }
}

/// Mouse or pen press on the canvas
pub fn pointer_down() -> InputCommand {
    InputCommand::Jump
}

/// Turns a single-finger touch into commands
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<Vec2>,
    boosting: bool,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_start(&mut self, pos: Vec2) {
        self.start = Some(pos);
        self.boosting = false;
    }

    /// A rightward swipe starts the boost as soon as it crosses the threshold
    pub fn touch_move(&mut self, pos: Vec2) -> Option<InputCommand> {
        let start = self.start?;
        if self.boosting {
            return None;
        }
        let delta = pos - start;
        if delta.x > SWIPE_THRESHOLD && delta.x.abs() > delta.y.abs() {
            self.boosting = true;
            return Some(InputCommand::StartBoost);
        }
        None
    }

    /// Taps and upward swipes jump; releasing a boost swipe stops the boost
    pub fn touch_end(&mut self, pos: Vec2) -> Option<InputCommand> {
        let start = self.start.take()?;
        if std::mem::take(&mut self.boosting) {
            return Some(InputCommand::StopBoost);
        }

        let delta = pos - start;
        if delta.length() <= SWIPE_THRESHOLD {
            return Some(InputCommand::Jump);
        }
        if -delta.y > SWIPE_THRESHOLD && delta.y.abs() >= delta.x.abs() {
            return Some(InputCommand::Jump);
        }
        None
    }

    /// Gesture aborted by the browser
    pub fn touch_cancel(&mut self) -> Option<InputCommand> {
        self.start = None;
        std::mem::take(&mut self.boosting).then_some(InputCommand::StopBoost)
    }

    pub fn is_boosting(&self) -> bool {
        self.boosting
    }
}
