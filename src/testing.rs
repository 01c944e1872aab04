//! Scripted startup scenarios for manual verification.
//!
//! Activated with `STACKER_TEST=<name>` (see `main.rs`).  Each scenario
//! spawns a prepared world state directly in the `Running` phase so a single
//! behaviour can be observed in isolation:
//!
//! | Name          | Observes                                             |
//! |---------------|------------------------------------------------------|
//! | `sticky_pair` | Two sticky ingredients bond on contact               |
//! | `ground_hit`  | A mistracked drop falls to the ground and penalises  |
//! | `tall_tower`  | A prestacked tower settles and sinks with its offset |

use crate::catalog::{dropped_ingredient_physics, IngredientCatalog, IngredientKind, IngredientVisual};
use crate::config::GameConfig;
use crate::drops::DropLedger;
use bevy::prelude::*;

/// Spawn one physics-tracked ingredient of `kind` at `pos`, registered in
/// the drop ledger like a player drop.
fn spawn_tracked(
    commands: &mut Commands,
    ledger: &mut DropLedger,
    catalog: &IngredientCatalog,
    config: &GameConfig,
    kind: IngredientKind,
    pos: Vec2,
) {
    let Some(ty) = catalog.get(kind) else {
        return;
    };
    let entity = commands
        .spawn((
            IngredientVisual {
                kind: ty.kind,
                height: ty.height,
            },
            Transform::from_xyz(pos.x, pos.y, 0.0),
            GlobalTransform::default(),
            Visibility::default(),
            dropped_ingredient_physics(ty, config),
        ))
        .id();
    ledger.submit(entity, ty.kind, pos);
}

/// Two sticky ingredients dropped nearly touching above the base plate;
/// their first contact should create exactly one bond and pull them flush.
pub fn spawn_test_sticky_pair(
    mut commands: Commands,
    mut ledger: ResMut<DropLedger>,
    catalog: Res<IngredientCatalog>,
    config: Res<GameConfig>,
) {
    spawn_tracked(
        &mut commands,
        &mut ledger,
        &catalog,
        &config,
        IngredientKind::Cheese,
        Vec2::new(-0.2, 1.6),
    );
    spawn_tracked(
        &mut commands,
        &mut ledger,
        &catalog,
        &config,
        IngredientKind::Sauce,
        Vec2::new(0.2, 2.0),
    );
    println!("Test scenario: sticky_pair");
}

/// One drop released well off the base plate; it must hit the ground, cost
/// a life and a point, and despawn — exactly once.
pub fn spawn_test_ground_hit(
    mut commands: Commands,
    mut ledger: ResMut<DropLedger>,
    catalog: Res<IngredientCatalog>,
    config: Res<GameConfig>,
) {
    spawn_tracked(
        &mut commands,
        &mut ledger,
        &catalog,
        &config,
        IngredientKind::Patty,
        Vec2::new(config.base_half_width + 2.0, 3.0),
    );
    println!("Test scenario: ground_hit");
}

/// A prestacked five-ingredient tower; all drops should land after the
/// observation delay and the base should sink by the summed heights.
pub fn spawn_test_tall_tower(
    mut commands: Commands,
    mut ledger: ResMut<DropLedger>,
    catalog: Res<IngredientCatalog>,
    config: Res<GameConfig>,
) {
    let kinds = [
        IngredientKind::Bun,
        IngredientKind::Patty,
        IngredientKind::Cheese,
        IngredientKind::Vegetable,
        IngredientKind::Bun,
    ];
    let mut y = config.base_center_y + config.base_half_height + 0.2;
    for kind in kinds {
        spawn_tracked(
            &mut commands,
            &mut ledger,
            &catalog,
            &config,
            kind,
            Vec2::new(0.0, y),
        );
        y += 0.45;
    }
    println!("Test scenario: tall_tower");
}
