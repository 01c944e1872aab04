//! Arena setup: the ground slab, the immovable base plate, and the tower
//! offset that keeps growth inside the fixed camera frame.
//!
//! ## Collision groups
//!
//! | Layer       | Group   | Collides with       |
//! |-------------|---------|---------------------|
//! | Ingredients | GROUP_1 | GROUP_1 \| GROUP_2 \| GROUP_3 |
//! | Ground slab | GROUP_2 | GROUP_1             |
//! | Base plate  | GROUP_3 | GROUP_1             |
//!
//! Separate groups for ground and base keep the penalty channel (ground
//! contacts) distinct from ordinary stacking contacts on the base plate.

use crate::catalog::{quad_mesh, IngredientKind};
use crate::config::GameConfig;
use crate::ground::Ground;
use crate::session::{GameSession, StackEntry};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Marker component for the immovable base plate.
#[derive(Component, Debug, Clone, Copy)]
pub struct BasePlate;

/// Committed, non-physical positions in the base tower.
///
/// Holds the single base entry in practice; reset at every round start and
/// never mutated during a round.
#[derive(Resource, Debug, Default)]
pub struct TowerStack {
    pub entries: Vec<StackEntry>,
}

impl TowerStack {
    /// Reset to the single immovable base entry.
    pub fn reset(&mut self, config: &GameConfig) {
        self.entries.clear();
        self.entries.push(StackEntry {
            lateral: 0.0,
            vertical: config.base_center_y,
            kind: IngredientKind::Bun,
        });
    }
}

/// Startup system: spawn the ground slab and the base plate.
pub fn spawn_arena(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    // Ground slab, top surface at y = 0.
    let ground_mesh = meshes.add(quad_mesh(config.ground_half_width, config.ground_half_height));
    let ground_mat = materials.add(ColorMaterial::from_color(Color::srgb(0.20, 0.20, 0.24)));
    commands.spawn((
        Ground,
        Transform::from_xyz(0.0, -config.ground_half_height, 0.0),
        GlobalTransform::default(),
        RigidBody::Fixed,
        Collider::cuboid(config.ground_half_width, config.ground_half_height),
        Friction::coefficient(1.0),
        CollisionGroups::new(
            bevy_rapier2d::geometry::Group::GROUP_2,
            bevy_rapier2d::geometry::Group::GROUP_1,
        ),
        ActiveEvents::COLLISION_EVENTS,
        Mesh2d(ground_mesh),
        MeshMaterial2d(ground_mat),
    ));

    // Immovable base plate the tower is built on.
    let base_mesh = meshes.add(quad_mesh(config.base_half_width, config.base_half_height));
    let base_mat = materials.add(ColorMaterial::from_color(Color::srgb(0.55, 0.42, 0.26)));
    commands.spawn((
        BasePlate,
        Transform::from_xyz(0.0, config.base_center_y, 0.0),
        GlobalTransform::default(),
        RigidBody::Fixed,
        Collider::cuboid(config.base_half_width, config.base_half_height),
        Friction::coefficient(1.2),
        CollisionGroups::new(
            bevy_rapier2d::geometry::Group::GROUP_3,
            bevy_rapier2d::geometry::Group::GROUP_1,
        ),
        Mesh2d(base_mesh),
        MeshMaterial2d(base_mat),
    ));

    eprintln!("[SETUP] Arena spawned (ground + base plate)");
}

/// Keep the base plate shifted down by the accumulated tower offset so the
/// growing tower appears to sink within the fixed camera frame.
pub fn base_offset_system(
    session: Res<GameSession>,
    config: Res<GameConfig>,
    mut q_base: Query<&mut Transform, With<BasePlate>>,
) {
    let Ok(mut transform) = q_base.single_mut() else {
        return;
    };
    transform.translation.y = config.base_center_y - session.tower_offset;
}
