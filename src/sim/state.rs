//! Game state and core simulation types
//!
//! Everything the loop mutates lives in [`GameState`]. Nothing here touches
//! the platform, the renderer or storage.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Aabb;
use crate::consts::*;
use crate::tuning::Tuning;

/// PCG stream for gameplay decisions (spawn kinds)
const GAMEPLAY_STREAM: u64 = 0xa02b_dbf7_bb3c_0a7d;
/// PCG stream for cosmetic particles, kept apart so effects never shift gameplay
const FX_STREAM: u64 = 0x5851_f42d_4c95_7f2d;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Nothing started yet, idle frame on screen
    Idle,
    /// Active gameplay
    Running,
    /// Run ended by a lethal collision
    Over,
}

/// Something that happened during a tick (drained by the session)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Started,
    Jumped { jump_count: u8 },
    Landed,
    ObstacleSpawned(ObstacleKind),
    ObstaclePassed { bonus: u64 },
    PowerUpSpawned(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    /// Shield ate a hit that would have ended the run
    ShieldAbsorbed,
    BoostStarted,
    BoostStopped,
    LevelUp(u32),
    GameOver { score: u64 },
}

/// The runner
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left corner; x never changes (fixed lane)
    pub pos: Vec2,
    /// Vertical velocity (negative = up)
    pub vel_y: f32,
    pub on_ground: bool,
    /// Jumps used since last ground contact
    pub jump_count: u8,
    pub size: Vec2,
}

impl Player {
    /// Player standing in its lane
    pub fn grounded(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.lane_x, tuning.player_ground_y()),
            vel_y: 0.0,
            on_ground: true,
            jump_count: 0,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb {
            min: self.pos,
            size: self.size,
        }
    }

    /// Start a jump if the jump budget allows it
    pub fn try_jump(&mut self, impulse: f32, max_jumps: u8) -> bool {
        if self.jump_count >= max_jumps {
            return false;
        }
        self.vel_y = -impulse;
        self.jump_count += 1;
        self.on_ground = false;
        true
    }

    /// Semi-implicit Euler step, clamped at the ground. Returns true on landing.
    pub fn integrate(&mut self, gravity: f32, dt: f32, ground_y: f32) -> bool {
        self.vel_y += gravity * dt;
        self.pos.y += self.vel_y * dt;

        if self.pos.y >= ground_y {
            let landed = !self.on_ground;
            self.pos.y = ground_y;
            self.vel_y = 0.0;
            self.on_ground = true;
            self.jump_count = 0;
            landed
        } else {
            self.on_ground = false;
            false
        }
    }
}

/// Per-kind obstacle attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleProfile {
    pub width: f32,
    pub height: f32,
    /// Gap between the ground and the obstacle's bottom edge
    pub lift: f32,
    /// First level this kind can appear in
    pub min_level: u32,
}

/// Obstacle catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Cactus,
    Rock,
    TallCactus,
    /// Flies at head height over a standing player; jumping into it is fatal
    Bird,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Cactus,
        ObstacleKind::Rock,
        ObstacleKind::TallCactus,
        ObstacleKind::Bird,
    ];

    pub const fn profile(self) -> ObstacleProfile {
        match self {
            ObstacleKind::Cactus => ObstacleProfile {
                width: 20.0,
                height: 40.0,
                lift: 0.0,
                min_level: 1,
            },
            ObstacleKind::Rock => ObstacleProfile {
                width: 35.0,
                height: 25.0,
                lift: 0.0,
                min_level: 1,
            },
            ObstacleKind::TallCactus => ObstacleProfile {
                width: 25.0,
                height: 55.0,
                lift: 0.0,
                min_level: 2,
            },
            ObstacleKind::Bird => ObstacleProfile {
                width: 40.0,
                height: 20.0,
                lift: 45.0,
                min_level: 3,
            },
        }
    }
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    /// Obstacle of `kind` with its left edge at `x`, resting per its catalog entry
    pub fn new(id: u32, kind: ObstacleKind, x: f32, field_height: f32) -> Self {
        let profile = kind.profile();
        let y = crate::resting_y(field_height, profile.height) - profile.lift;
        Self {
            id,
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::new(profile.width, profile.height),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb {
            min: self.pos,
            size: self.size,
        }
    }

    /// Trailing edge has passed the left boundary of the field
    pub fn off_field(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Suppresses lethal collisions for a while
    Shield,
    /// Fills the nitro tank
    FuelRefill,
    /// Allows a second jump in mid-air for a while
    MultiJump,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Shield,
        PowerUpKind::FuelRefill,
        PowerUpKind::MultiJump,
    ];

    /// Hover height above the ground
    pub const fn lift(self) -> f32 {
        match self {
            PowerUpKind::Shield => 60.0,
            PowerUpKind::FuelRefill => 20.0,
            PowerUpKind::MultiJump => 85.0,
        }
    }

    /// Effect duration once collected (0 = instant)
    pub fn duration_ticks(self, tuning: &Tuning) -> u32 {
        match self {
            PowerUpKind::Shield => tuning.shield_ticks,
            PowerUpKind::FuelRefill => 0,
            PowerUpKind::MultiJump => tuning.multi_jump_ticks,
        }
    }
}

/// A power-up pickup
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, x: f32, field_height: f32) -> Self {
        let y = crate::resting_y(field_height, POWERUP_SIZE) - kind.lift();
        Self {
            id,
            kind,
            pos: Vec2::new(x, y),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb {
            min: self.pos,
            size: Vec2::splat(POWERUP_SIZE),
        }
    }

    pub fn off_field(&self) -> bool {
        self.pos.x + POWERUP_SIZE < 0.0
    }
}

/// Timed power-up effects (ticks remaining)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveEffects {
    pub shield_ticks: u32,
    pub multi_jump_ticks: u32,
}

impl ActiveEffects {
    pub fn shield_active(&self) -> bool {
        self.shield_ticks > 0
    }

    pub fn max_jumps(&self) -> u8 {
        if self.multi_jump_ticks > 0 { 2 } else { 1 }
    }

    /// Count every timer down by one tick
    pub fn tick_down(&mut self) {
        self.shield_ticks = self.shield_ticks.saturating_sub(1);
        self.multi_jump_ticks = self.multi_jump_ticks.saturating_sub(1);
    }
}

/// Nitro boost state
#[derive(Debug, Clone, PartialEq)]
pub struct Boost {
    pub active: bool,
    pub fuel: f32,
}

impl Default for Boost {
    fn default() -> Self {
        Self {
            active: false,
            fuel: MAX_FUEL,
        }
    }
}

/// Cosmetic particle flavor (drives color only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Dust,
    Exhaust,
    Sparkle,
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// Ticks left to live
    pub life: u32,
    /// Lifetime at spawn (for fading)
    pub max_life: u32,
    pub size: f32,
}

impl Particle {
    /// Remaining life in 0-1
    pub fn life_fraction(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed; each run derives its RNG from it
    pub seed: u64,
    /// Runs started so far
    pub runs: u64,
    pub phase: GamePhase,
    pub score: u64,
    /// Fractional score not yet credited
    pub score_carry: f32,
    /// Current level (1-based)
    pub level: u32,
    /// Scroll speed for the current level, before boost
    pub speed: f32,
    /// Ticks between obstacle spawns at the current level
    pub obstacle_interval: u32,
    /// Ticks until the next obstacle spawn
    pub obstacle_timer: u32,
    /// Ticks until the next power-up spawn
    pub powerup_timer: u32,
    /// Simulation tick counter for this run
    pub time_ticks: u64,
    /// Ticks left before tap-to-start is honored again
    pub restart_lockout: u32,
    pub player: Player,
    /// Active obstacles (spawn order == id order)
    pub obstacles: Vec<Obstacle>,
    pub powerups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    pub boost: Boost,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    /// Run statistics
    pub obstacles_passed: u32,
    pub powerups_collected: u32,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    rng: Pcg32,
    fx_rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create an idle game state with the given seed
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            seed,
            runs: 0,
            phase: GamePhase::Idle,
            score: 0,
            score_carry: 0.0,
            level: 1,
            speed: tuning.base_speed,
            obstacle_interval: tuning.obstacle_interval_ticks,
            obstacle_timer: tuning.obstacle_interval_ticks,
            powerup_timer: tuning.powerup_interval_ticks,
            time_ticks: 0,
            restart_lockout: 0,
            player: Player::grounded(tuning),
            obstacles: Vec::new(),
            powerups: Vec::new(),
            effects: ActiveEffects::default(),
            boost: Boost::default(),
            particles: Vec::new(),
            max_particles: tuning.max_particles,
            obstacles_passed: 0,
            powerups_collected: 0,
            events: Vec::new(),
            rng: Pcg32::new(seed, GAMEPLAY_STREAM),
            fx_rng: Pcg32::new(seed, FX_STREAM),
            next_id: 1,
        }
    }

    /// Reset everything for a fresh run and enter `Running`
    ///
    /// Starting a run that has not ticked yet keeps its run number and RNG
    /// streams, so a repeated start yields the same run.
    pub fn start(&mut self, tuning: &Tuning) {
        if !self.is_fresh_run() {
            self.runs += 1;
            let run_seed = self.seed.wrapping_add(self.runs);
            self.rng = Pcg32::new(run_seed, GAMEPLAY_STREAM);
            self.fx_rng = Pcg32::new(run_seed, FX_STREAM);
        }

        self.phase = GamePhase::Running;
        self.score = 0;
        self.score_carry = 0.0;
        self.level = 1;
        self.speed = tuning.base_speed;
        self.obstacle_interval = tuning.obstacle_interval_ticks;
        self.obstacle_timer = tuning.obstacle_interval_ticks;
        self.powerup_timer = tuning.powerup_interval_ticks;
        self.time_ticks = 0;
        self.restart_lockout = 0;
        self.player = Player::grounded(tuning);
        self.obstacles.clear();
        self.powerups.clear();
        self.particles.clear();
        self.effects = ActiveEffects::default();
        self.boost = Boost::default();
        self.obstacles_passed = 0;
        self.powerups_collected = 0;
        self.events.clear();
        self.next_id = 1;

        self.events.push(GameEvent::Started);
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Running, but no tick has happened yet
    fn is_fresh_run(&self) -> bool {
        self.is_running() && self.time_ticks == 0
    }

    /// Score of the finished run (only once the run is over)
    pub fn final_score(&self) -> Option<u64> {
        (self.phase == GamePhase::Over).then_some(self.score)
    }

    /// Scroll speed this tick, boost included
    pub fn current_speed(&self, tuning: &Tuning) -> f32 {
        if self.boost.active {
            self.speed * tuning.boost_multiplier
        } else {
            self.speed
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Pick an obstacle kind unlocked at the current level
    pub fn roll_obstacle_kind(&mut self) -> ObstacleKind {
        let level = self.level;
        let unlocked: Vec<ObstacleKind> = ObstacleKind::ALL
            .into_iter()
            .filter(|k| k.profile().min_level <= level)
            .collect();
        unlocked[self.rng.random_range(0..unlocked.len())]
    }

    pub fn roll_powerup_kind(&mut self) -> PowerUpKind {
        PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())]
    }

    /// Cosmetic random value in [lo, hi)
    pub fn fx_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.fx_rng.random::<f32>() * (hi - lo)
    }

    /// Cosmetic random lifetime in [lo, hi]
    pub fn fx_life(&mut self, lo: u32, hi: u32) -> u32 {
        self.fx_rng.random_range(lo..=hi)
    }

    /// Push a particle unless the cap is reached
    pub fn emit(&mut self, particle: Particle) {
        if self.particles.len() < self.max_particles {
            self.particles.push(particle);
        }
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle_and_grounded() {
        let tuning = Tuning::default();
        let state = GameState::new(7, &tuning);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.player.on_ground);
        assert_eq!(state.player.pos.y, tuning.player_ground_y());
        assert_eq!(state.final_score(), None);
    }

    #[test]
    fn test_start_twice_matches_start_once() {
        let tuning = Tuning::default();
        let mut once = GameState::new(3, &tuning);
        once.start(&tuning);

        let mut twice = GameState::new(3, &tuning);
        twice.start(&tuning);
        twice.score = 55;
        twice.obstacles.push(Obstacle::new(9, ObstacleKind::Rock, 300.0, 300.0));
        twice.start(&tuning);

        for state in [&once, &twice] {
            assert_eq!(state.phase, GamePhase::Running);
            assert!(state.obstacles.is_empty());
            assert!(state.powerups.is_empty());
            assert!(state.particles.is_empty());
            assert_eq!(state.score, 0);
            assert!(state.player.on_ground);
        }
        assert_eq!(once.player, twice.player);
        assert_eq!(once.speed, twice.speed);
        assert_eq!(once.obstacle_timer, twice.obstacle_timer);
        assert_eq!(once.boost, twice.boost);
        assert_eq!(once.effects, twice.effects);
        assert_eq!(once.runs, twice.runs);

        // Same upcoming obstacle sequence
        let rolls = |state: &mut GameState| -> Vec<ObstacleKind> {
            (0..20).map(|_| state.roll_obstacle_kind()).collect()
        };
        assert_eq!(rolls(&mut once), rolls(&mut twice));
    }

    #[test]
    fn test_restart_after_ticking_reseeds() {
        let tuning = Tuning::default();
        let mut state = GameState::new(3, &tuning);
        state.start(&tuning);
        assert_eq!(state.runs, 1);
        state.time_ticks = 40;
        state.start(&tuning);
        assert_eq!(state.runs, 2);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_jump_budget() {
        let tuning = Tuning::default();
        let mut player = Player::grounded(&tuning);
        assert!(player.try_jump(tuning.jump_impulse, 1));
        let vel = player.vel_y;
        assert!(!player.try_jump(tuning.jump_impulse, 1));
        assert_eq!(player.vel_y, vel);
        assert_eq!(player.jump_count, 1);

        // Multi-jump raises the budget
        assert!(player.try_jump(tuning.jump_impulse, 2));
        assert_eq!(player.jump_count, 2);
    }

    #[test]
    fn test_obstacle_catalog_rests_on_ground() {
        let tuning = Tuning::default();
        let ground = crate::ground_surface(tuning.field_height);
        for kind in ObstacleKind::ALL {
            let obstacle = Obstacle::new(1, kind, tuning.field_width, tuning.field_height);
            let profile = kind.profile();
            assert_eq!(obstacle.aabb().bottom(), ground - profile.lift);
            assert_eq!(obstacle.pos.x, tuning.field_width);
        }
    }

    #[test]
    fn test_level_one_never_rolls_locked_kinds() {
        let tuning = Tuning::default();
        let mut state = GameState::new(11, &tuning);
        state.start(&tuning);
        for _ in 0..200 {
            let kind = state.roll_obstacle_kind();
            assert_eq!(kind.profile().min_level, 1, "{kind:?} is locked at level 1");
        }
    }

    #[test]
    fn test_obstacle_kinds_unlock_by_level() {
        let tuning = Tuning::default();
        let mut state = GameState::new(11, &tuning);
        state.start(&tuning);

        state.level = 2;
        let level_two: Vec<ObstacleKind> = (0..200).map(|_| state.roll_obstacle_kind()).collect();
        assert!(level_two.contains(&ObstacleKind::TallCactus));
        assert!(!level_two.contains(&ObstacleKind::Bird));

        state.level = 3;
        let level_three: Vec<ObstacleKind> =
            (0..200).map(|_| state.roll_obstacle_kind()).collect();
        assert!(level_three.contains(&ObstacleKind::Bird));
    }

    #[test]
    fn test_particle_cap() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        state.max_particles = 2;
        for _ in 0..5 {
            state.emit(Particle {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                kind: ParticleKind::Dust,
                life: 10,
                max_life: 10,
                size: 2.0,
            });
        }
        assert_eq!(state.particles.len(), 2);
    }
}
