//! Runtime game configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.drop_resolve_delay_secs`, `config.sticky_lifetime_secs`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay and physics configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/game.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── World Layout ─────────────────────────────────────────────────────────
    pub ground_half_width: f32,
    pub ground_half_height: f32,
    pub base_half_width: f32,
    pub base_half_height: f32,
    pub base_center_y: f32,

    // ── Active Entity Animation ──────────────────────────────────────────────
    pub active_path_start_x: f32,
    pub active_path_y: f32,
    pub active_path_speed: f32,
    pub overflow_boundary_x: f32,

    // ── Drop Resolution ──────────────────────────────────────────────────────
    pub drop_resolve_delay_secs: f32,
    pub next_spawn_delay_secs: f32,
    pub setup_delay_secs: f32,

    // ── Ground Penalty ───────────────────────────────────────────────────────
    pub ground_dedup_expiry_secs: f32,
    pub starting_lives: i32,

    // ── Adhesion ─────────────────────────────────────────────────────────────
    pub sticky_strength_max: f32,
    pub sticky_impulse_min: f32,
    pub sticky_impulse_max: f32,
    pub sticky_damping_min: f32,
    pub sticky_damping_max: f32,
    pub sticky_friction_min: f32,
    pub sticky_friction_max: f32,
    pub sticky_mass_reduction_threshold: f32,
    pub sticky_mass_scale: f32,
    pub sticky_tick_secs: f32,
    pub sticky_separation_threshold: f32,
    pub sticky_attract_gain: f32,
    pub sticky_vertical_bias: f32,
    pub sticky_lifetime_secs: f32,

    // ── Ingredients ──────────────────────────────────────────────────────────
    pub ingredient_half_width: f32,
    pub ingredient_density: f32,
    pub terminal_drop_clearance: f32,

    // ── Camera ───────────────────────────────────────────────────────────────
    pub camera_scale: f32,
    pub camera_center_y: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // World Layout
            ground_half_width: GROUND_HALF_WIDTH,
            ground_half_height: GROUND_HALF_HEIGHT,
            base_half_width: BASE_HALF_WIDTH,
            base_half_height: BASE_HALF_HEIGHT,
            base_center_y: BASE_CENTER_Y,
            // Active Entity Animation
            active_path_start_x: ACTIVE_PATH_START_X,
            active_path_y: ACTIVE_PATH_Y,
            active_path_speed: ACTIVE_PATH_SPEED,
            overflow_boundary_x: OVERFLOW_BOUNDARY_X,
            // Drop Resolution
            drop_resolve_delay_secs: DROP_RESOLVE_DELAY_SECS,
            next_spawn_delay_secs: NEXT_SPAWN_DELAY_SECS,
            setup_delay_secs: SETUP_DELAY_SECS,
            // Ground Penalty
            ground_dedup_expiry_secs: GROUND_DEDUP_EXPIRY_SECS,
            starting_lives: STARTING_LIVES,
            // Adhesion
            sticky_strength_max: STICKY_STRENGTH_MAX,
            sticky_impulse_min: STICKY_IMPULSE_MIN,
            sticky_impulse_max: STICKY_IMPULSE_MAX,
            sticky_damping_min: STICKY_DAMPING_MIN,
            sticky_damping_max: STICKY_DAMPING_MAX,
            sticky_friction_min: STICKY_FRICTION_MIN,
            sticky_friction_max: STICKY_FRICTION_MAX,
            sticky_mass_reduction_threshold: STICKY_MASS_REDUCTION_THRESHOLD,
            sticky_mass_scale: STICKY_MASS_SCALE,
            sticky_tick_secs: STICKY_TICK_SECS,
            sticky_separation_threshold: STICKY_SEPARATION_THRESHOLD,
            sticky_attract_gain: STICKY_ATTRACT_GAIN,
            sticky_vertical_bias: STICKY_VERTICAL_BIAS,
            sticky_lifetime_secs: STICKY_LIFETIME_SECS,
            // Ingredients
            ingredient_half_width: INGREDIENT_HALF_WIDTH,
            ingredient_density: INGREDIENT_DENSITY,
            terminal_drop_clearance: TERMINAL_DROP_CLEARANCE,
            // Camera
            camera_scale: CAMERA_SCALE,
            camera_center_y: CAMERA_CENTER_Y,
        }
    }
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are printed
/// to stderr but do not abort the game.  A missing file is silently ignored
/// (defaults are already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/game.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded game config from {path}");
            }
            Err(e) => {
                eprintln!("⚠ Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}
