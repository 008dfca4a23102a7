//! Dino Runner - An endless runner arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `session`: Game session contract (start, input, tick, game over, render)
//! - `renderer`: Drawing surface abstraction and WebGPU backend
//! - `platform`: Browser/native platform abstraction (input mapping, frame loop)
//! - `persistence`: Key/value storage with versioned JSON envelopes
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod share;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 600.0;
    pub const FIELD_HEIGHT: f32 = 300.0;
    /// Height of the ground strip at the bottom of the field
    pub const GROUND_HEIGHT: f32 = 20.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;

    /// Power-up pickup box size
    pub const POWERUP_SIZE: f32 = 24.0;

    /// Nitro fuel tank capacity
    pub const MAX_FUEL: f32 = 100.0;

    /// Minimum score that unlocks the mint offer
    pub const MINT_MIN_SCORE: u64 = 30;

    /// Capacity of the per-tick input intent queue
    pub const INPUT_QUEUE_CAPACITY: usize = 16;
}

/// Y coordinate of the ground surface (top edge of the ground strip)
#[inline]
pub fn ground_surface(field_height: f32) -> f32 {
    field_height - consts::GROUND_HEIGHT
}

/// Resting y (top edge) for an entity of `height` standing on the ground
#[inline]
pub fn resting_y(field_height: f32, height: f32) -> f32 {
    ground_surface(field_height) - height
}
