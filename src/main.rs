use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use std::env;

use stacker::config::{self, GameConfig};
use stacker::game::GamePlugin;
use stacker::graphics;
use stacker::hud::HudPlugin;
use stacker::menu::MenuPlugin;
use stacker::session::GamePhase;
use stacker::testing;

fn main() {
    // Check for test mode
    let test_mode = env::var("STACKER_TEST").ok();

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Stacker".into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    // Insert GameConfig with compiled defaults; load_game_config will
    // overwrite it from assets/game.toml (if present) in the Startup schedule.
    .insert_resource(GameConfig::default())
    // pixels_per_meter(1.0) keeps world units identical to the layout in
    // constants.rs (ingredients ~1.1 units wide); the camera projection
    // handles on-screen scale.  Rapier's default gravity then applies
    // -9.81 u/s² directly.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
    .add_plugins((GamePlugin, HudPlugin, MenuPlugin))
    .add_systems(
        Startup,
        (
            // Load config first so every other startup system sees the final values.
            config::load_game_config,
            graphics::setup_camera.after(config::load_game_config),
        ),
    );

    // Add scripted scenario systems if in test mode
    if let Some(test_name) = test_mode {
        // Scenarios bypass the menu and start directly in the running phase.
        app.insert_state(GamePhase::Running);

        match test_name.as_str() {
            "sticky_pair" => app.add_systems(
                Startup,
                testing::spawn_test_sticky_pair.after(config::load_game_config),
            ),
            "ground_hit" => app.add_systems(
                Startup,
                testing::spawn_test_ground_hit.after(config::load_game_config),
            ),
            "tall_tower" => app.add_systems(
                Startup,
                testing::spawn_test_tall_tower.after(config::load_game_config),
            ),
            _ => app.add_systems(
                Startup,
                testing::spawn_test_sticky_pair.after(config::load_game_config),
            ),
        };

        println!("Running test: {}", test_name);
    }

    app.run();
}
