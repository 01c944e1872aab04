//! Camera setup for 2D rendering.

use crate::config::GameConfig;
use bevy::prelude::*;

/// Setup the fixed gameplay camera.
///
/// The world is laid out in the game's own units (ingredients are ~1.1 units
/// wide), so the orthographic projection is zoomed in to frame the drop path
/// and the ground.  The camera never moves; tower growth is absorbed by the
/// base-plate offset instead.
pub fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        Camera2d,
        Projection::from(OrthographicProjection {
            scale: config.camera_scale,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, config.camera_center_y, 0.0),
    ));
    eprintln!("[SETUP] Camera spawned");
}
