//! Data-driven game balance
//!
//! Every physics and pacing constant the simulation reads lives in [`Tuning`].
//! Values are plain JSON so a balance pass can override a handful of fields
//! without touching the rest (`#[serde(default)]`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH, PLAYER_HEIGHT};

/// Rejected balance override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning field `{field}` is out of range: {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    /// Play field width (pixels)
    pub field_width: f32,
    /// Play field height (pixels)
    pub field_height: f32,
    /// Fixed x of the player's lane (left edge)
    pub lane_x: f32,

    // === Player physics (pixels, seconds) ===
    /// Downward acceleration
    pub gravity: f32,
    /// Upward speed set by a jump (applied as a negative velocity)
    pub jump_impulse: f32,

    // === Pacing ===
    /// Scroll speed at level 1
    pub base_speed: f32,
    /// Speed added per level
    pub speed_step: f32,
    /// Scroll speed cap (before boost)
    pub max_speed: f32,
    /// Ticks between obstacle spawns at level 1
    pub obstacle_interval_ticks: u32,
    /// Ticks removed from the obstacle interval per level
    pub obstacle_interval_step: u32,
    /// Obstacle interval floor
    pub min_obstacle_interval_ticks: u32,
    /// Ticks between power-up spawns
    pub powerup_interval_ticks: u32,
    /// Score needed per level
    pub level_threshold: u64,

    // === Scoring ===
    /// Score gained per tick while running
    pub points_per_tick: f32,
    /// Score gained per tick while boosting
    pub boost_points_per_tick: f32,
    /// Bonus for each obstacle that leaves the field
    pub obstacle_bonus: u64,

    // === Nitro ===
    /// Scroll speed multiplier while boosting
    pub boost_multiplier: f32,
    /// Fuel consumed per boosting tick
    pub fuel_drain_per_tick: f32,
    /// Fuel regained per tick while not boosting
    pub fuel_regen_per_tick: f32,

    // === Effects ===
    /// Shield duration (ticks)
    pub shield_ticks: u32,
    /// Multi-jump duration (ticks)
    pub multi_jump_ticks: u32,
    /// Ticks after game over during which tap-to-start is ignored
    pub restart_lockout_ticks: u32,
    /// Particle cap (the renderer settings may lower it)
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            lane_x: 50.0,

            gravity: 2880.0,
            jump_impulse: 720.0,

            base_speed: 180.0,
            speed_step: 30.0,
            max_speed: 480.0,
            obstacle_interval_ticks: 90,
            obstacle_interval_step: 6,
            min_obstacle_interval_ticks: 45,
            powerup_interval_ticks: 600,
            level_threshold: 100,

            points_per_tick: 0.1,
            boost_points_per_tick: 0.25,
            obstacle_bonus: 10,

            boost_multiplier: 1.6,
            fuel_drain_per_tick: 0.5,
            fuel_regen_per_tick: 0.05,

            shield_ticks: 5 * 60,
            multi_jump_ticks: 8 * 60,
            restart_lockout_ticks: 30,
            max_particles: 256,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            if ok {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, reason })
            }
        }

        check(self.field_width > 0.0, "field_width", "must be positive")?;
        check(
            self.field_height > PLAYER_HEIGHT,
            "field_height",
            "must leave room for the player",
        )?;
        check(
            (0.0..self.field_width).contains(&self.lane_x),
            "lane_x",
            "must lie inside the field",
        )?;
        check(self.gravity > 0.0, "gravity", "must be positive")?;
        check(self.jump_impulse > 0.0, "jump_impulse", "must be positive")?;
        check(self.base_speed > 0.0, "base_speed", "must be positive")?;
        check(
            self.max_speed >= self.base_speed,
            "max_speed",
            "must be at least base_speed",
        )?;
        check(
            self.obstacle_interval_ticks > 0,
            "obstacle_interval_ticks",
            "must be positive",
        )?;
        check(
            (1..=self.obstacle_interval_ticks).contains(&self.min_obstacle_interval_ticks),
            "min_obstacle_interval_ticks",
            "must be between 1 and obstacle_interval_ticks",
        )?;
        check(
            self.powerup_interval_ticks > 0,
            "powerup_interval_ticks",
            "must be positive",
        )?;
        check(self.level_threshold > 0, "level_threshold", "must be positive")?;
        check(
            self.points_per_tick >= 0.0 && self.boost_points_per_tick >= self.points_per_tick,
            "boost_points_per_tick",
            "must be at least points_per_tick",
        )?;
        check(
            self.boost_multiplier >= 1.0,
            "boost_multiplier",
            "must not slow the game down",
        )?;
        check(
            self.fuel_drain_per_tick > 0.0,
            "fuel_drain_per_tick",
            "must be positive",
        )?;
        check(
            self.fuel_regen_per_tick >= 0.0,
            "fuel_regen_per_tick",
            "must not be negative",
        )?;
        Ok(())
    }

    /// Scroll speed for a given level (before boost)
    pub fn speed_for_level(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (self.base_speed + steps * self.speed_step).min(self.max_speed)
    }

    /// Obstacle spawn interval for a given level
    pub fn obstacle_interval_for_level(&self, level: u32) -> u32 {
        let shrink = level.saturating_sub(1).saturating_mul(self.obstacle_interval_step);
        self.obstacle_interval_ticks
            .saturating_sub(shrink)
            .max(self.min_obstacle_interval_ticks)
    }

    /// Level reached at a given score (1-based)
    pub fn level_for_score(&self, score: u64) -> u32 {
        let level = 1 + score / self.level_threshold;
        u32::try_from(level).unwrap_or(u32::MAX)
    }

    /// Resting y of the player's top edge
    pub fn player_ground_y(&self) -> f32 {
        crate::resting_y(self.field_height, PLAYER_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 2000.0 }"#).unwrap();
        assert_eq!(tuning.gravity, 2000.0);
        assert_eq!(tuning.jump_impulse, Tuning::default().jump_impulse);
    }

    #[test]
    fn test_rejects_bad_interval_floor() {
        let err = Tuning::from_json(
            r#"{ "obstacle_interval_ticks": 40, "min_obstacle_interval_ticks": 60 }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "min_obstacle_interval_ticks",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_difficulty_ratchet_is_capped() {
        let tuning = Tuning::default();
        assert_eq!(tuning.speed_for_level(1), tuning.base_speed);
        assert!(tuning.speed_for_level(3) > tuning.speed_for_level(2));
        assert_eq!(tuning.speed_for_level(1000), tuning.max_speed);

        assert_eq!(
            tuning.obstacle_interval_for_level(1),
            tuning.obstacle_interval_ticks
        );
        assert!(tuning.obstacle_interval_for_level(4) < tuning.obstacle_interval_for_level(2));
        assert_eq!(
            tuning.obstacle_interval_for_level(1000),
            tuning.min_obstacle_interval_ticks
        );
    }

    #[test]
    fn test_level_for_score() {
        let tuning = Tuning::default();
        assert_eq!(tuning.level_for_score(0), 1);
        assert_eq!(tuning.level_for_score(99), 1);
        assert_eq!(tuning.level_for_score(100), 2);
        assert_eq!(tuning.level_for_score(250), 3);
    }
}
