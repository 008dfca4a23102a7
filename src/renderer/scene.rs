//! Scene painter
//!
//! Reads a [`GameState`] and paints it onto any [`Surface`]. Never mutates
//! anything, so it is safe to call in every phase.

use glam::Vec2;

use super::surface::{Color, Surface};
use crate::consts::{GROUND_HEIGHT, MAX_FUEL, POWERUP_SIZE};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Obstacle, ObstacleKind, ParticleKind, PowerUpKind};
use crate::tuning::Tuning;

/// Shield starts flickering when this many ticks are left
const SHIELD_WARNING_TICKS: u32 = 60;
/// Cloud drift speed (pixels/second)
const CLOUD_DRIFT: f32 = 10.0;

/// Colors for game elements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub sky: Color,
    pub cloud: Color,
    pub ground: Color,
    pub player: Color,
    pub player_multi_jump: Color,
    pub eye: Color,
    pub shield: Color,
    pub cactus: Color,
    pub rock: Color,
    pub rock_top: Color,
    pub bird: Color,
    pub powerup_shield: Color,
    pub powerup_fuel: Color,
    pub powerup_multi_jump: Color,
    pub powerup_core: Color,
    pub dust: Color,
    pub exhaust: Color,
    pub sparkle: Color,
    pub gauge_back: Color,
    pub gauge_fuel: Color,
    pub gauge_boost: Color,
    pub game_over_shade: Color,
}

impl Palette {
    pub const STANDARD: Palette = Palette {
        sky: [0.53, 0.81, 0.92, 1.0],
        cloud: [1.0, 1.0, 1.0, 0.8],
        ground: [0.56, 0.93, 0.56, 1.0],
        player: [0.30, 0.69, 0.31, 1.0],
        player_multi_jump: [0.55, 0.36, 0.96, 1.0],
        eye: [0.0, 0.0, 0.0, 1.0],
        shield: [0.35, 0.75, 1.0, 0.35],
        cactus: [0.55, 0.27, 0.07, 1.0],
        rock: [0.45, 0.45, 0.50, 1.0],
        rock_top: [0.60, 0.60, 0.65, 1.0],
        bird: [0.25, 0.22, 0.30, 1.0],
        powerup_shield: [0.20, 0.60, 1.0, 1.0],
        powerup_fuel: [1.0, 0.55, 0.10, 1.0],
        powerup_multi_jump: [0.70, 0.30, 0.95, 1.0],
        powerup_core: [1.0, 1.0, 1.0, 0.9],
        dust: [0.60, 0.50, 0.35, 1.0],
        exhaust: [1.0, 0.45, 0.10, 1.0],
        sparkle: [1.0, 0.95, 0.50, 1.0],
        gauge_back: [0.0, 0.0, 0.0, 0.35],
        gauge_fuel: [1.0, 0.75, 0.20, 1.0],
        gauge_boost: [1.0, 0.35, 0.10, 1.0],
        game_over_shade: [0.0, 0.0, 0.0, 0.45],
    };

    pub const HIGH_CONTRAST: Palette = Palette {
        sky: [1.0, 1.0, 1.0, 1.0],
        cloud: [0.85, 0.85, 0.85, 1.0],
        ground: [0.0, 0.0, 0.0, 1.0],
        player: [0.0, 0.45, 0.0, 1.0],
        player_multi_jump: [0.35, 0.0, 0.70, 1.0],
        eye: [1.0, 1.0, 1.0, 1.0],
        shield: [0.0, 0.30, 1.0, 0.5],
        cactus: [0.80, 0.0, 0.0, 1.0],
        rock: [0.80, 0.0, 0.0, 1.0],
        rock_top: [0.50, 0.0, 0.0, 1.0],
        bird: [0.80, 0.0, 0.0, 1.0],
        powerup_shield: [0.0, 0.30, 1.0, 1.0],
        powerup_fuel: [1.0, 0.50, 0.0, 1.0],
        powerup_multi_jump: [0.50, 0.0, 0.80, 1.0],
        powerup_core: [0.0, 0.0, 0.0, 1.0],
        dust: [0.20, 0.20, 0.20, 1.0],
        exhaust: [1.0, 0.40, 0.0, 1.0],
        sparkle: [0.90, 0.70, 0.0, 1.0],
        gauge_back: [0.0, 0.0, 0.0, 0.6],
        gauge_fuel: [1.0, 0.60, 0.0, 1.0],
        gauge_boost: [1.0, 0.0, 0.0, 1.0],
        game_over_shade: [0.0, 0.0, 0.0, 0.6],
    };
}

/// Presentation switches derived from [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub palette: Palette,
    pub clouds: bool,
    pub animate_clouds: bool,
    pub shield_flicker: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            palette: if settings.high_contrast {
                Palette::HIGH_CONTRAST
            } else {
                Palette::STANDARD
            },
            clouds: settings.quality.clouds_enabled(),
            animate_clouds: settings.animate_clouds(),
            shield_flicker: !settings.reduced_motion,
        }
    }
}

/// Paint one frame. `time_secs` only drives ambient decoration.
pub fn draw<S: Surface + ?Sized>(
    state: &GameState,
    tuning: &Tuning,
    options: &RenderOptions,
    time_secs: f32,
    surface: &mut S,
) {
    let palette = &options.palette;
    let field = Vec2::new(tuning.field_width, tuning.field_height);

    surface.clear(palette.sky);

    if options.clouds {
        let drift = if options.animate_clouds {
            time_secs * CLOUD_DRIFT
        } else {
            0.0
        };
        for i in 0..3 {
            let x = (i as f32 * 200.0 + drift).rem_euclid(field.x + 100.0) - 50.0;
            let y = 50.0 + i as f32 * 30.0;
            draw_cloud(surface, Vec2::new(x, y), palette.cloud);
        }
    }

    let ground_y = crate::ground_surface(field.y);
    surface.fill_rect(
        Vec2::new(0.0, ground_y),
        Vec2::new(field.x, GROUND_HEIGHT),
        palette.ground,
    );

    for obstacle in &state.obstacles {
        draw_obstacle(surface, obstacle, state.time_ticks, palette);
    }

    for powerup in &state.powerups {
        let color = match powerup.kind {
            PowerUpKind::Shield => palette.powerup_shield,
            PowerUpKind::FuelRefill => palette.powerup_fuel,
            PowerUpKind::MultiJump => palette.powerup_multi_jump,
        };
        let center = powerup.aabb().center();
        surface.fill_circle(center, POWERUP_SIZE * 0.5, color);
        surface.fill_circle(center, POWERUP_SIZE * 0.2, palette.powerup_core);
    }

    draw_player(surface, state, options);

    for particle in &state.particles {
        let base = match particle.kind {
            ParticleKind::Dust => palette.dust,
            ParticleKind::Exhaust => palette.exhaust,
            ParticleKind::Sparkle => palette.sparkle,
        };
        let fade = particle.life_fraction();
        let color = [base[0], base[1], base[2], base[3] * fade];
        surface.fill_circle(particle.pos, particle.size * (0.5 + 0.5 * fade), color);
    }

    // Nitro gauge, top right
    let gauge_min = Vec2::new(field.x - 110.0, 10.0);
    let gauge_size = Vec2::new(100.0, 8.0);
    surface.fill_rect(gauge_min, gauge_size, palette.gauge_back);
    let fill = (state.boost.fuel / MAX_FUEL).clamp(0.0, 1.0);
    let gauge_color = if state.boost.active {
        palette.gauge_boost
    } else {
        palette.gauge_fuel
    };
    surface.fill_rect(
        gauge_min,
        Vec2::new(gauge_size.x * fill, gauge_size.y),
        gauge_color,
    );

    if state.phase == GamePhase::Over {
        surface.fill_rect(Vec2::ZERO, field, palette.game_over_shade);
    }
}

fn draw_cloud<S: Surface + ?Sized>(surface: &mut S, at: Vec2, color: Color) {
    surface.fill_circle(at, 20.0, color);
    surface.fill_circle(at + Vec2::new(25.0, 0.0), 25.0, color);
    surface.fill_circle(at + Vec2::new(50.0, 0.0), 20.0, color);
    surface.fill_circle(at + Vec2::new(25.0, -15.0), 15.0, color);
}

fn draw_obstacle<S: Surface + ?Sized>(
    surface: &mut S,
    obstacle: &Obstacle,
    time_ticks: u64,
    palette: &Palette,
) {
    let pos = obstacle.pos;
    let size = obstacle.size;
    match obstacle.kind {
        ObstacleKind::Cactus | ObstacleKind::TallCactus => {
            surface.fill_rect(pos, size, palette.cactus);
            // Arms stick out past the hitbox a little; purely cosmetic
            let arm = Vec2::new(size.x * 0.35, 4.0);
            surface.fill_rect(
                pos + Vec2::new(-arm.x, size.y * 0.3),
                arm,
                palette.cactus,
            );
            surface.fill_rect(
                pos + Vec2::new(size.x, size.y * 0.45),
                arm,
                palette.cactus,
            );
        }
        ObstacleKind::Rock => {
            surface.fill_rect(pos, size, palette.rock);
            surface.fill_rect(
                pos + Vec2::new(size.x * 0.15, 0.0),
                Vec2::new(size.x * 0.7, size.y * 0.3),
                palette.rock_top,
            );
        }
        ObstacleKind::Bird => {
            surface.fill_rect(pos, size, palette.bird);
            let wing_up = (time_ticks / 8) % 2 == 0;
            let wing_y = if wing_up { -6.0 } else { size.y };
            surface.fill_rect(
                pos + Vec2::new(size.x * 0.3, wing_y),
                Vec2::new(size.x * 0.35, 6.0),
                palette.bird,
            );
        }
    }
}

fn draw_player<S: Surface + ?Sized>(surface: &mut S, state: &GameState, options: &RenderOptions) {
    let palette = &options.palette;
    let player = &state.player;
    let shield_ticks = state.effects.shield_ticks;

    if shield_ticks > 0 {
        let flicker_off = options.shield_flicker
            && shield_ticks < SHIELD_WARNING_TICKS
            && (shield_ticks / 6) % 2 == 1;
        if !flicker_off {
            let radius = player.size.max_element() * 0.85;
            surface.fill_circle(player.aabb().center(), radius, palette.shield);
        }
    }

    let body = if state.effects.multi_jump_ticks > 0 {
        palette.player_multi_jump
    } else {
        palette.player
    };
    surface.fill_rect(player.pos, player.size, body);
    surface.fill_rect(player.pos + Vec2::new(20.0, 5.0), Vec2::splat(5.0), palette.eye);
}
