//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (cosmetic particles on their own stream)
//! - Stable iteration order (spawn order)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod input;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use input::{InputCommand, InputQueue, TickInput};
pub use state::{
    ActiveEffects, Boost, GameEvent, GamePhase, GameState, Obstacle, ObstacleKind, ObstacleProfile,
    Particle, ParticleKind, Player, PowerUp, PowerUpKind,
};
pub use tick::{apply_command, apply_powerup, tick};
