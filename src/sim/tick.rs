//! Fixed timestep simulation tick
//!
//! Core game loop that advances the run deterministically.

use glam::Vec2;

use super::input::{InputCommand, TickInput};
use super::state::{
    GameEvent, GamePhase, GameState, Obstacle, Particle, ParticleKind, PowerUp, PowerUpKind,
};
use crate::consts::*;
use crate::tuning::Tuning;

/// Dust kicked up by a jump
const JUMP_DUST_COUNT: usize = 6;
/// Sparkles thrown by a collected power-up
const PICKUP_SPARKLE_COUNT: usize = 10;
/// Downward pull on dust particles (pixels/s²)
const DUST_GRAVITY: f32 = 240.0;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    let dt = SIM_DT;

    // Outside a run the only thing that matters is tap-to-start
    match state.phase {
        GamePhase::Running => {}
        GamePhase::Idle | GamePhase::Over => {
            state.restart_lockout = state.restart_lockout.saturating_sub(1);
            if input.wants_jump() {
                if state.restart_lockout == 0 {
                    state.start(tuning);
                    log::info!("Run {} started (tap)", state.runs);
                } else {
                    log::debug!(
                        "Tap ignored, restart locked for {} more ticks",
                        state.restart_lockout
                    );
                }
            }
            return;
        }
    }

    for &command in &input.commands {
        apply_command(state, command, tuning);
    }

    state.time_ticks += 1;

    // (a) Player physics
    let ground_y = tuning.player_ground_y();
    if state.player.integrate(tuning.gravity, dt, ground_y) {
        state.events.push(GameEvent::Landed);
    }

    // (b) Scroll, cull and spawn
    let speed = state.current_speed(tuning);
    update_boost(state, tuning);
    scroll_entities(state, speed * dt, tuning);
    spawn_on_timers(state, tuning);

    // (c) Particles
    update_particles(state, dt);

    // (d) Lethal collisions
    let player_box = state.player.aabb();
    let hit = state
        .obstacles
        .iter()
        .any(|obstacle| obstacle.aabb().overlaps(&player_box));
    let lethal = if hit && state.effects.shield_active() {
        // Shielded hits leave the obstacle in place
        if !state.events.contains(&GameEvent::ShieldAbsorbed) {
            state.events.push(GameEvent::ShieldAbsorbed);
        }
        false
    } else {
        hit
    };

    // (e) Power-up pickups. Runs even on a lethal tick: a power-up touched
    // in the same tick as the fatal obstacle is still consumed.
    collect_powerups(state, tuning);

    state.effects.tick_down();

    if lethal {
        end_run(state, tuning);
        return;
    }

    // (f) Distance score
    let points = if state.boost.active {
        tuning.boost_points_per_tick
    } else {
        tuning.points_per_tick
    };
    state.score_carry += points;
    let whole = state.score_carry.floor();
    state.score += whole as u64;
    state.score_carry -= whole;

    // (g) Difficulty ratchet
    ratchet_level(state, tuning);
}

/// Apply one queued command to a running game
pub fn apply_command(state: &mut GameState, command: InputCommand, tuning: &Tuning) {
    if !state.is_running() {
        return;
    }

    match command {
        InputCommand::Jump => {
            let max_jumps = state.effects.max_jumps();
            if state.player.try_jump(tuning.jump_impulse, max_jumps) {
                state.events.push(GameEvent::Jumped {
                    jump_count: state.player.jump_count,
                });
                emit_jump_dust(state);
            }
        }
        InputCommand::StartBoost => {
            if !state.boost.active && state.boost.fuel > 0.0 {
                state.boost.active = true;
                state.events.push(GameEvent::BoostStarted);
            }
        }
        InputCommand::StopBoost => {
            if state.boost.active {
                state.boost.active = false;
                state.events.push(GameEvent::BoostStopped);
            }
        }
    }
}

/// Drain or refill nitro fuel, emitting exhaust while boosting
fn update_boost(state: &mut GameState, tuning: &Tuning) {
    if state.boost.active {
        state.boost.fuel -= tuning.fuel_drain_per_tick;
        if state.boost.fuel <= 0.0 {
            state.boost.fuel = 0.0;
            state.boost.active = false;
            state.events.push(GameEvent::BoostStopped);
        }

        let origin = state.player.pos + Vec2::new(0.0, state.player.size.y * 0.6);
        let vel = Vec2::new(state.fx_range(-140.0, -60.0), state.fx_range(-25.0, 25.0));
        let life = state.fx_life(12, 22);
        let size = state.fx_range(2.0, 4.5);
        state.emit(Particle {
            pos: origin,
            vel,
            kind: ParticleKind::Exhaust,
            life,
            max_life: life,
            size,
        });
    } else {
        state.boost.fuel = (state.boost.fuel + tuning.fuel_regen_per_tick).min(MAX_FUEL);
    }
}

/// Move obstacles and power-ups left, dropping what left the field
fn scroll_entities(state: &mut GameState, distance: f32, tuning: &Tuning) {
    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= distance;
    }
    for powerup in &mut state.powerups {
        powerup.pos.x -= distance;
    }

    let before = state.obstacles.len();
    state.obstacles.retain(|o| !o.off_field());
    let passed = (before - state.obstacles.len()) as u32;
    if passed > 0 {
        state.obstacles_passed += passed;
        for _ in 0..passed {
            state.score += tuning.obstacle_bonus;
            state.events.push(GameEvent::ObstaclePassed {
                bonus: tuning.obstacle_bonus,
            });
        }
    }

    state.powerups.retain(|p| !p.off_field());
}

/// Count spawn timers down and spawn at the right edge when they elapse
fn spawn_on_timers(state: &mut GameState, tuning: &Tuning) {
    state.obstacle_timer = state.obstacle_timer.saturating_sub(1);
    if state.obstacle_timer == 0 {
        let kind = state.roll_obstacle_kind();
        let id = state.next_entity_id();
        state
            .obstacles
            .push(Obstacle::new(id, kind, tuning.field_width, tuning.field_height));
        state.obstacle_timer = state.obstacle_interval;
        state.events.push(GameEvent::ObstacleSpawned(kind));
        log::debug!("Spawned {:?} #{} (next in {} ticks)", kind, id, state.obstacle_interval);
    }

    state.powerup_timer = state.powerup_timer.saturating_sub(1);
    if state.powerup_timer == 0 {
        let kind = state.roll_powerup_kind();
        let id = state.next_entity_id();
        state
            .powerups
            .push(PowerUp::new(id, kind, tuning.field_width, tuning.field_height));
        state.powerup_timer = tuning.powerup_interval_ticks;
        state.events.push(GameEvent::PowerUpSpawned(kind));
        log::debug!("Spawned power-up {:?} #{}", kind, id);
    }
}

fn update_particles(state: &mut GameState, dt: f32) {
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        if particle.kind == ParticleKind::Dust {
            particle.vel.y += DUST_GRAVITY * dt;
        }
        particle.vel *= 0.98;
        particle.life = particle.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);
}

/// Consume every power-up the player overlaps
fn collect_powerups(state: &mut GameState, tuning: &Tuning) {
    let player_box = state.player.aabb();
    let mut collected = Vec::new();
    state.powerups.retain(|powerup| {
        if powerup.aabb().overlaps(&player_box) {
            collected.push((powerup.kind, powerup.aabb().center()));
            false
        } else {
            true
        }
    });

    for (kind, center) in collected {
        apply_powerup(state, kind, tuning);
        state.powerups_collected += 1;
        state.events.push(GameEvent::PowerUpCollected(kind));
        emit_sparkles(state, center);
        log::debug!("Collected {:?}", kind);
    }
}

/// Start a power-up's effect
pub fn apply_powerup(state: &mut GameState, kind: PowerUpKind, tuning: &Tuning) {
    match kind {
        PowerUpKind::Shield => {
            state.effects.shield_ticks = state.effects.shield_ticks.max(kind.duration_ticks(tuning));
        }
        PowerUpKind::FuelRefill => state.boost.fuel = MAX_FUEL,
        PowerUpKind::MultiJump => {
            state.effects.multi_jump_ticks =
                state.effects.multi_jump_ticks.max(kind.duration_ticks(tuning));
        }
    }
}

fn end_run(state: &mut GameState, tuning: &Tuning) {
    state.phase = GamePhase::Over;
    state.boost.active = false;
    state.restart_lockout = tuning.restart_lockout_ticks;
    state.events.push(GameEvent::GameOver { score: state.score });
    log::info!(
        "Run {} over: score {} at level {} ({} obstacles passed)",
        state.runs,
        state.score,
        state.level,
        state.obstacles_passed
    );
}

/// Raise speed and spawn rate for every level threshold the score crossed
fn ratchet_level(state: &mut GameState, tuning: &Tuning) {
    let target = tuning.level_for_score(state.score);
    while state.level < target {
        state.level += 1;
        state.speed = tuning.speed_for_level(state.level);
        state.obstacle_interval = tuning.obstacle_interval_for_level(state.level);
        state.obstacle_timer = state.obstacle_timer.min(state.obstacle_interval);
        state.events.push(GameEvent::LevelUp(state.level));
        log::info!(
            "Level {}: speed {:.0}, obstacle every {} ticks",
            state.level,
            state.speed,
            state.obstacle_interval
        );
    }
}

fn emit_jump_dust(state: &mut GameState) {
    let feet = state.player.pos + Vec2::new(state.player.size.x * 0.5, state.player.size.y);
    for _ in 0..JUMP_DUST_COUNT {
        let vel = Vec2::new(state.fx_range(-70.0, 70.0), state.fx_range(-90.0, -20.0));
        let life = state.fx_life(18, 32);
        let size = state.fx_range(1.5, 3.5);
        state.emit(Particle {
            pos: feet,
            vel,
            kind: ParticleKind::Dust,
            life,
            max_life: life,
            size,
        });
    }
}

fn emit_sparkles(state: &mut GameState, center: Vec2) {
    for i in 0..PICKUP_SPARKLE_COUNT {
        let angle = i as f32 / PICKUP_SPARKLE_COUNT as f32 * std::f32::consts::TAU;
        let speed = state.fx_range(60.0, 140.0);
        let life = state.fx_life(20, 36);
        let size = state.fx_range(2.0, 3.5);
        state.emit(Particle {
            pos: center,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            kind: ParticleKind::Sparkle,
            life,
            max_life: life,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleKind;
    use proptest::prelude::*;

    fn running(tuning: &Tuning) -> GameState {
        let mut state = GameState::new(12345, tuning);
        state.start(tuning);
        state.drain_events();
        state
    }

    fn jump() -> TickInput {
        TickInput {
            commands: vec![InputCommand::Jump],
        }
    }

    /// Tuning with spawning pushed far out so tests control every entity
    fn quiet_tuning() -> Tuning {
        Tuning {
            obstacle_interval_ticks: 100_000,
            min_obstacle_interval_ticks: 100_000,
            powerup_interval_ticks: 100_000,
            ..Tuning::default()
        }
    }

    /// Obstacle sitting right on top of the player
    fn obstacle_on_player(state: &mut GameState, tuning: &Tuning) -> u32 {
        let id = state.next_entity_id();
        let x = state.player.pos.x + 5.0;
        state
            .obstacles
            .push(Obstacle::new(id, ObstacleKind::Cactus, x, tuning.field_height));
        id
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.time_ticks, 0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_tap_to_start_from_idle() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        tick(&mut state, &jump(), &tuning);
        assert_eq!(state.phase, GamePhase::Running);
        // The starting tap is not also a jump
        assert!(state.player.on_ground);
        assert_eq!(state.player.vel_y, 0.0);
    }

    #[test]
    fn test_jump_kinematics() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        let y0 = state.player.pos.y;
        let g = tuning.gravity;
        let j = tuning.jump_impulse;

        let n = 10;
        tick(&mut state, &jump(), &tuning);
        for _ in 1..n {
            tick(&mut state, &TickInput::default(), &tuning);
        }

        let nf = n as f32;
        let expected_vel = -j + nf * g * SIM_DT;
        // Semi-implicit Euler: each step adds the already-updated velocity
        let expected_y = y0 - j * nf * SIM_DT + g * SIM_DT * SIM_DT * nf * (nf + 1.0) / 2.0;
        assert!((state.player.vel_y - expected_vel).abs() < 1e-2);
        assert!((state.player.pos.y - expected_y).abs() < 1e-2);
        assert!(!state.player.on_ground);

        // Fall back down: lands exactly at y0 with zero velocity
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), &tuning);
            if state.player.on_ground {
                break;
            }
        }
        assert_eq!(state.player.pos.y, y0);
        assert_eq!(state.player.vel_y, 0.0);
        assert_eq!(state.player.jump_count, 0);
    }

    #[test]
    fn test_second_jump_rejected_without_multi_jump() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        tick(&mut state, &jump(), &tuning);
        let vel_before = state.player.vel_y;
        tick(&mut state, &jump(), &tuning);
        // Only gravity changed the velocity
        assert!((state.player.vel_y - (vel_before + tuning.gravity * SIM_DT)).abs() < 1e-3);
        assert_eq!(state.player.jump_count, 1);
    }

    #[test]
    fn test_multi_jump_allows_air_jump() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        apply_powerup(&mut state, PowerUpKind::MultiJump, &tuning);
        tick(&mut state, &jump(), &tuning);
        tick(&mut state, &jump(), &tuning);
        assert_eq!(state.player.jump_count, 2);
        assert!((state.player.vel_y - (-tuning.jump_impulse + tuning.gravity * SIM_DT)).abs() < 1e-3);
    }

    #[test]
    fn test_spawn_cadence() {
        let tuning = Tuning {
            powerup_interval_ticks: 100_000,
            ..Tuning::default()
        };
        let k = tuning.obstacle_interval_ticks;
        let mut state = running(&tuning);

        for _ in 0..k - 1 {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        assert!(state.obstacles.is_empty());
        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.obstacles.len(), 1);

        for _ in 0..k {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        assert_eq!(state.obstacles.len(), 2);
        assert!(state.is_running());
    }

    #[test]
    fn test_passed_obstacle_awards_bonus_once() {
        let tuning = Tuning {
            points_per_tick: 0.0,
            boost_points_per_tick: 0.0,
            ..quiet_tuning()
        };
        let mut state = running(&tuning);
        let id = state.next_entity_id();
        // Just behind the player, about to leave the field
        state
            .obstacles
            .push(Obstacle::new(id, ObstacleKind::Cactus, -19.0, tuning.field_height));

        tick(&mut state, &TickInput::default(), &tuning);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, tuning.obstacle_bonus);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        assert_eq!(state.score, tuning.obstacle_bonus);
        assert_eq!(state.obstacles_passed, 1);
    }

    #[test]
    fn test_collision_ends_run_same_tick() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        obstacle_on_player(&mut state, &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.phase, GamePhase::Over);
        assert_eq!(state.final_score(), Some(state.score));
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { .. }))
        );
    }

    #[test]
    fn test_shield_absorbs_collision() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        state.effects.shield_ticks = 10;
        let id = obstacle_on_player(&mut state, &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.obstacles.iter().any(|o| o.id == id));
        assert!(state.drain_events().contains(&GameEvent::ShieldAbsorbed));
    }

    #[test]
    fn test_expired_shield_lets_hit_through() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        state.effects.shield_ticks = 3;
        obstacle_on_player(&mut state, &tuning);
        for _ in 0..3 {
            tick(&mut state, &TickInput::default(), &tuning);
            assert_eq!(state.phase, GamePhase::Running);
        }
        assert!(!state.effects.shield_active());

        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.phase, GamePhase::Over);
    }

    #[test]
    fn test_multi_jump_expires_to_single_jump() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        state.effects.multi_jump_ticks = 1;
        assert_eq!(state.effects.max_jumps(), 2);

        tick(&mut state, &jump(), &tuning);
        assert_eq!(state.player.jump_count, 1);
        assert_eq!(state.effects.max_jumps(), 1);

        // Still airborne, but the second jump is gone
        tick(&mut state, &jump(), &tuning);
        assert_eq!(state.player.jump_count, 1);
    }

    #[test]
    fn test_fuel_refill_fills_tank() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        state.boost.fuel = 10.0;
        let id = state.next_entity_id();
        let x = state.player.pos.x + 5.0;
        let mut powerup = PowerUp::new(id, PowerUpKind::FuelRefill, x, tuning.field_height);
        powerup.pos.y = state.player.pos.y;
        state.powerups.push(powerup);

        tick(&mut state, &TickInput::default(), &tuning);
        assert!(state.powerups.is_empty());
        assert_eq!(state.boost.fuel, MAX_FUEL);
    }

    #[test]
    fn test_fuel_regenerates_while_coasting() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        state.boost.fuel = 50.0;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        let expected = 50.0 + 10.0 * tuning.fuel_regen_per_tick;
        assert!((state.boost.fuel - expected).abs() < 1e-3);

        // Regeneration tops out at a full tank
        state.boost.fuel = MAX_FUEL - tuning.fuel_regen_per_tick * 0.5;
        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.boost.fuel, MAX_FUEL);
    }

    #[test]
    fn test_powerup_collected_without_ending_run() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        let id = state.next_entity_id();
        let x = state.player.pos.x;
        let mut powerup = PowerUp::new(id, PowerUpKind::Shield, x, tuning.field_height);
        powerup.pos.y = state.player.pos.y;
        state.powerups.push(powerup);

        tick(&mut state, &TickInput::default(), &tuning);
        assert!(state.is_running());
        assert!(state.powerups.is_empty());
        assert_eq!(state.powerups_collected, 1);
        assert!(state.effects.shield_active());
    }

    #[test]
    fn test_lethal_hit_still_consumes_powerup() {
        // Documented quirk: both effects apply in the same tick
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        obstacle_on_player(&mut state, &tuning);
        let id = state.next_entity_id();
        let mut powerup = PowerUp::new(id, PowerUpKind::MultiJump, state.player.pos.x, tuning.field_height);
        powerup.pos.y = state.player.pos.y;
        state.powerups.push(powerup);

        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.phase, GamePhase::Over);
        assert!(state.powerups.is_empty());
        assert_eq!(state.powerups_collected, 1);
    }

    #[test]
    fn test_over_tick_is_frozen() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        obstacle_on_player(&mut state, &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        let score = state.score;
        let ticks = state.time_ticks;
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        assert_eq!(state.score, score);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_restart_lockout() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        obstacle_on_player(&mut state, &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.phase, GamePhase::Over);

        // Immediate tap is swallowed by the lockout
        tick(&mut state, &jump(), &tuning);
        assert_eq!(state.phase, GamePhase::Over);

        for _ in 0..tuning.restart_lockout_ticks {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        tick(&mut state, &jump(), &tuning);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_boost_speeds_up_and_drains() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        let id = state.next_entity_id();
        state
            .obstacles
            .push(Obstacle::new(id, ObstacleKind::Rock, 500.0, tuning.field_height));

        tick(&mut state, &TickInput::default(), &tuning);
        let slow_x = state.obstacles[0].pos.x;

        let boost = TickInput {
            commands: vec![InputCommand::StartBoost],
        };
        tick(&mut state, &boost, &tuning);
        let fast_step = slow_x - state.obstacles[0].pos.x;
        let slow_step = 500.0 - slow_x;
        assert!((fast_step - slow_step * tuning.boost_multiplier).abs() < 1e-3);
        assert!(state.boost.fuel < MAX_FUEL);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_boost_stops_when_fuel_runs_out() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        state.boost.fuel = tuning.fuel_drain_per_tick * 2.0;
        let boost = TickInput {
            commands: vec![InputCommand::StartBoost],
        };
        tick(&mut state, &boost, &tuning);
        assert!(state.boost.active);
        tick(&mut state, &TickInput::default(), &tuning);
        assert!(!state.boost.active);
        assert_eq!(state.boost.fuel, 0.0);

        // Empty tank refuses to boost
        state.boost.fuel = 0.0;
        apply_command(&mut state, InputCommand::StartBoost, &tuning);
        assert!(!state.boost.active);
    }

    #[test]
    fn test_boost_scores_faster() {
        let tuning = quiet_tuning();
        let mut plain = running(&tuning);
        let mut boosted = running(&tuning);
        apply_command(&mut boosted, InputCommand::StartBoost, &tuning);
        for _ in 0..40 {
            tick(&mut plain, &TickInput::default(), &tuning);
            tick(&mut boosted, &TickInput::default(), &tuning);
        }
        assert!(boosted.score > plain.score);
    }

    #[test]
    fn test_level_ratchet() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        state.score = tuning.level_threshold * 2 - 1;
        tick(&mut state, &TickInput::default(), &tuning);
        assert!(state.level >= 2);
        assert_eq!(state.speed, tuning.speed_for_level(state.level));
        assert_eq!(
            state.obstacle_interval,
            tuning.obstacle_interval_for_level(state.level)
        );
        assert!(state.drain_events().iter().any(|e| matches!(e, GameEvent::LevelUp(_))));
    }

    #[test]
    fn test_particles_expire() {
        let tuning = quiet_tuning();
        let mut state = running(&tuning);
        tick(&mut state, &jump(), &tuning);
        assert!(!state.particles.is_empty());
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_particles_do_not_change_gameplay() {
        let tuning = Tuning::default();
        let mut with_fx = GameState::new(77, &tuning);
        let mut without_fx = GameState::new(77, &tuning);
        without_fx.max_particles = 0;
        with_fx.start(&tuning);
        without_fx.start(&tuning);

        for i in 0..600 {
            let input = if i % 45 == 0 { jump() } else { TickInput::default() };
            tick(&mut with_fx, &input, &tuning);
            tick(&mut without_fx, &input, &tuning);
        }
        assert_eq!(with_fx.phase, without_fx.phase);
        assert_eq!(with_fx.score, without_fx.score);
        assert_eq!(with_fx.obstacles, without_fx.obstacles);
        assert!(without_fx.particles.is_empty());
    }

    fn any_input() -> impl Strategy<Value = TickInput> {
        prop::collection::vec(
            prop_oneof![
                Just(InputCommand::Jump),
                Just(InputCommand::StartBoost),
                Just(InputCommand::StopBoost),
            ],
            0..3,
        )
        .prop_map(|commands| TickInput { commands })
    }

    proptest! {
        #[test]
        fn prop_player_never_below_ground(
            seed in any::<u64>(),
            inputs in prop::collection::vec(any_input(), 1..400),
        ) {
            let tuning = Tuning::default();
            let mut state = GameState::new(seed, &tuning);
            state.start(&tuning);
            state.effects.multi_jump_ticks = 10_000;
            let ground_y = tuning.player_ground_y();
            for input in &inputs {
                let score_before = state.score;
                let was_running = state.is_running();
                tick(&mut state, input, &tuning);
                prop_assert!(state.player.pos.y <= ground_y);
                if was_running && state.is_running() {
                    prop_assert!(state.score >= score_before);
                }
            }
        }
    }
}
