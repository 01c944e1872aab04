//! Ingredient catalog: the static registry of droppable entity types.
//!
//! ## Flow
//!
//! 1. [`IngredientCatalog::standard`] builds the registry once at process
//!    start; [`IngredientCatalog::validate`] checks the startup preconditions
//!    (non-empty droppable pool, every rarity > 0, strengths in range) and is
//!    fatal on failure.
//! 2. [`IngredientCatalog::select_random`] draws a weighted random type for
//!    each spawn: every type contributes `rarity × 100` discrete slots to a
//!    pool and one slot is chosen uniformly, so P(type) = rarity / Σrarity.
//! 3. The terminal closing type (top bun) is excluded from the random pool
//!    and reachable only through [`IngredientCatalog::terminal`].
//!
//! Selection is intentionally not seedable — distribution is tested
//! statistically over many draws, not by replaying a sequence.

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use bevy_rapier2d::prelude::*;
use rand::Rng;

/// Semantic kind of a droppable ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngredientKind {
    Bun,
    Patty,
    Vegetable,
    Sauce,
    Cheese,
    TopBun,
}

impl IngredientKind {
    /// Human-readable name, used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bun => "bun",
            Self::Patty => "patty",
            Self::Vegetable => "vegetable",
            Self::Sauce => "sauce",
            Self::Cheese => "cheese",
            Self::TopBun => "top bun",
        }
    }
}

/// Immutable descriptor for one ingredient type.
///
/// Defined once at process start; never mutated.
#[derive(Debug, Clone, Copy)]
pub struct IngredientType {
    pub kind: IngredientKind,
    /// Stacking height (world units); advances the tower offset on a
    /// successful drop.
    pub height: f32,
    /// Spawn-rarity weight in (0, 1].  Relative, not absolute: the chance of
    /// spawning is `rarity / Σrarity` over the droppable pool.
    pub rarity: f32,
    /// Whether collisions with this type trigger adhesive correction.
    pub sticky: bool,
    /// Adhesive strength in [0, 1.2]; meaningless unless `sticky`.
    pub sticky_strength: f32,
}

/// Per-entity ingredient data attached to every physics-tracked body.
///
/// Carried by dropped ingredients (and the terminal top bun) so the collision
/// resolvers can read kind and sticky metadata without a catalog lookup.
#[derive(Component, Debug, Clone, Copy)]
pub struct IngredientBody {
    pub kind: IngredientKind,
    pub height: f32,
    pub sticky: bool,
    pub sticky_strength: f32,
}

impl From<IngredientType> for IngredientBody {
    fn from(ty: IngredientType) -> Self {
        Self {
            kind: ty.kind,
            height: ty.height,
            sticky: ty.sticky,
            sticky_strength: ty.sticky_strength,
        }
    }
}

/// Static registry of ingredient types plus the terminal closing type.
#[derive(Resource, Debug, Clone)]
pub struct IngredientCatalog {
    /// Types eligible for random spawning.  Validated non-empty with every
    /// rarity > 0.
    droppable: Vec<IngredientType>,
    /// The closing ingredient dropped at end-of-round; never spawned randomly.
    terminal: IngredientType,
}

impl Default for IngredientCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl IngredientCatalog {
    /// The standard six-type catalog.
    pub fn standard() -> Self {
        Self {
            droppable: vec![
                IngredientType {
                    kind: IngredientKind::Bun,
                    height: 0.30,
                    rarity: 0.9,
                    sticky: false,
                    sticky_strength: 0.0,
                },
                IngredientType {
                    kind: IngredientKind::Patty,
                    height: 0.22,
                    rarity: 1.0,
                    sticky: false,
                    sticky_strength: 0.0,
                },
                IngredientType {
                    kind: IngredientKind::Vegetable,
                    height: 0.12,
                    rarity: 0.7,
                    sticky: false,
                    sticky_strength: 0.0,
                },
                IngredientType {
                    kind: IngredientKind::Cheese,
                    height: 0.08,
                    rarity: 0.55,
                    sticky: true,
                    sticky_strength: 0.9,
                },
                IngredientType {
                    kind: IngredientKind::Sauce,
                    height: 0.06,
                    rarity: 0.45,
                    sticky: true,
                    sticky_strength: 1.2,
                },
            ],
            terminal: IngredientType {
                kind: IngredientKind::TopBun,
                height: 0.34,
                rarity: 0.0,
                sticky: false,
                sticky_strength: 0.0,
            },
        }
    }

    /// Validate the startup preconditions.
    ///
    /// Fatal on failure — a catalog that passes here can never fail a draw,
    /// so `select_random` needs no per-call error path.
    pub fn validate(&self, strength_max: f32) -> GameResult<()> {
        if self.droppable.is_empty() {
            return Err(GameError::EmptyCatalog);
        }
        for ty in &self.droppable {
            if ty.rarity <= 0.0 {
                return Err(GameError::NonPositiveRarity {
                    kind: ty.kind.name(),
                    rarity: ty.rarity,
                });
            }
            if ty.sticky && !(0.0..=strength_max).contains(&ty.sticky_strength) {
                return Err(GameError::StickyStrengthOutOfRange {
                    kind: ty.kind.name(),
                    strength: ty.sticky_strength,
                    max: strength_max,
                });
            }
        }
        Ok(())
    }

    /// Draw a random droppable type, weighted by rarity.
    ///
    /// Builds a pool of `rarity × 100` discrete slots per type and picks one
    /// uniformly; P(type) = rarity / Σrarity.  Callable at arbitrary
    /// frequency with no setup.
    pub fn select_random(&self) -> IngredientType {
        let mut rng = rand::thread_rng();
        let total: usize = self.droppable.iter().map(Self::slot_count).sum();
        let mut slot = rng.gen_range(0..total);
        for ty in &self.droppable {
            let slots = Self::slot_count(ty);
            if slot < slots {
                return *ty;
            }
            slot -= slots;
        }
        // Unreachable for a validated catalog; the last type absorbs any
        // rounding remainder.
        *self.droppable.last().expect("validated catalog is non-empty")
    }

    fn slot_count(ty: &IngredientType) -> usize {
        (ty.rarity * 100.0).round() as usize
    }

    /// The terminal closing type (top bun).
    pub fn terminal(&self) -> IngredientType {
        self.terminal
    }

    /// Types eligible for random spawning.
    pub fn droppable(&self) -> &[IngredientType] {
        &self.droppable
    }

    /// Look up a droppable or terminal type by kind.
    pub fn get(&self, kind: IngredientKind) -> Option<IngredientType> {
        if self.terminal.kind == kind {
            return Some(self.terminal);
        }
        self.droppable.iter().copied().find(|ty| ty.kind == kind)
    }
}

/// Startup system: validate the catalog before the first round can start.
///
/// Panics on a misconfigured catalog — this is a fatal precondition
/// violation, not a recoverable runtime error.
pub fn validate_catalog(catalog: Res<IngredientCatalog>, config: Res<GameConfig>) {
    if let Err(e) = catalog.validate(config.sticky_strength_max) {
        panic!("ingredient catalog misconfigured: {e}");
    }
    println!(
        "✓ Ingredient catalog validated ({} droppable types)",
        catalog.droppable().len()
    );
}

// ── Physics helpers ───────────────────────────────────────────────────────────

/// Components turning an entity into a physics-tracked dropped ingredient.
///
/// Inserted when the player drops the active entity, and on the terminal top
/// bun.  Collision events fire for contacts with the ground slab, the base
/// plate, and other ingredients.
pub fn dropped_ingredient_physics(
    ty: IngredientType,
    config: &GameConfig,
) -> (
    IngredientBody,
    RigidBody,
    Collider,
    ColliderMassProperties,
    Velocity,
    Damping,
    ExternalForce,
    ExternalImpulse,
    Friction,
    CollisionGroups,
    ActiveEvents,
    Sleeping,
) {
    (
        IngredientBody::from(ty),
        RigidBody::Dynamic,
        Collider::cuboid(config.ingredient_half_width, ty.height / 2.0),
        ColliderMassProperties::Density(config.ingredient_density),
        Velocity::zero(),
        Damping {
            linear_damping: 0.0,
            angular_damping: 0.0,
        },
        ExternalForce {
            force: Vec2::ZERO,
            torque: 0.0,
        },
        ExternalImpulse::default(),
        Friction::coefficient(1.0),
        CollisionGroups::new(
            bevy_rapier2d::geometry::Group::GROUP_1,
            bevy_rapier2d::geometry::Group::GROUP_1
                | bevy_rapier2d::geometry::Group::GROUP_2
                | bevy_rapier2d::geometry::Group::GROUP_3,
        ),
        ActiveEvents::COLLISION_EVENTS,
        Sleeping::disabled(),
    )
}

// ── Visuals ───────────────────────────────────────────────────────────────────

/// Marker requesting a `Mesh2d` visual for an ingredient entity.
///
/// Attached at spawn; consumed by [`attach_ingredient_mesh_system`].
#[derive(Component, Debug, Clone, Copy)]
pub struct IngredientVisual {
    pub kind: IngredientKind,
    pub height: f32,
}

/// Fill colour per ingredient kind.
fn kind_color(kind: IngredientKind) -> Color {
    match kind {
        IngredientKind::Bun | IngredientKind::TopBun => Color::srgb(0.87, 0.62, 0.28),
        IngredientKind::Patty => Color::srgb(0.45, 0.26, 0.14),
        IngredientKind::Vegetable => Color::srgb(0.30, 0.72, 0.25),
        IngredientKind::Sauce => Color::srgb(0.82, 0.16, 0.12),
        IngredientKind::Cheese => Color::srgb(0.96, 0.80, 0.22),
    }
}

/// Attach a filled quad `Mesh2d` to every freshly-spawned ingredient.
pub fn attach_ingredient_mesh_system(
    mut commands: Commands,
    query: Query<(Entity, &IngredientVisual), Added<IngredientVisual>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<GameConfig>,
) {
    for (entity, visual) in query.iter() {
        let mesh = meshes.add(quad_mesh(config.ingredient_half_width, visual.height / 2.0));
        let mat = materials.add(ColorMaterial::from_color(kind_color(visual.kind)));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh), MeshMaterial2d(mat)));
    }
}

/// Build a filled axis-aligned quad mesh with the given half-extents.
pub fn quad_mesh(half_w: f32, half_h: f32) -> Mesh {
    let positions: Vec<[f32; 3]> = vec![
        [-half_w, half_h, 0.0],
        [half_w, half_h, 0.0],
        [half_w, -half_h, 0.0],
        [-half_w, -half_h, 0.0],
    ];
    // Two CCW triangles: [tl,br,tr] [tl,bl,br]
    let indices = Indices::U32(vec![0, 2, 1, 0, 3, 2]);
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_indices(indices);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn standard_catalog_passes_validation() {
        let catalog = IngredientCatalog::standard();
        assert!(catalog.validate(crate::constants::STICKY_STRENGTH_MAX).is_ok());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let catalog = IngredientCatalog {
            droppable: vec![],
            terminal: IngredientCatalog::standard().terminal(),
        };
        assert!(matches!(
            catalog.validate(1.2),
            Err(GameError::EmptyCatalog)
        ));
    }

    #[test]
    fn zero_rarity_is_rejected() {
        let mut catalog = IngredientCatalog::standard();
        catalog.droppable[0].rarity = 0.0;
        assert!(matches!(
            catalog.validate(1.2),
            Err(GameError::NonPositiveRarity { kind: "bun", .. })
        ));
    }

    #[test]
    fn out_of_range_sticky_strength_is_rejected() {
        let mut catalog = IngredientCatalog::standard();
        catalog.droppable[3].sticky_strength = 1.5;
        assert!(matches!(
            catalog.validate(1.2),
            Err(GameError::StickyStrengthOutOfRange { .. })
        ));
    }

    #[test]
    fn terminal_type_is_top_bun_and_never_droppable() {
        let catalog = IngredientCatalog::standard();
        assert_eq!(catalog.terminal().kind, IngredientKind::TopBun);
        assert!(catalog
            .droppable()
            .iter()
            .all(|ty| ty.kind != IngredientKind::TopBun));
    }

    #[test]
    fn get_resolves_droppable_and_terminal_kinds() {
        let catalog = IngredientCatalog::standard();
        assert!(catalog.get(IngredientKind::Patty).is_some());
        assert!(catalog.get(IngredientKind::TopBun).is_some());
    }

    /// Weighted-selection distribution: over N = 20 000 draws every type's
    /// observed frequency must be within 5% relative error of
    /// rarity / Σrarity (with a small absolute floor for the rarest types so
    /// the test is not flaky at this sample size).
    #[test]
    fn select_random_matches_rarity_distribution() {
        const DRAWS: usize = 20_000;
        let catalog = IngredientCatalog::standard();

        let mut counts: HashMap<IngredientKind, usize> = HashMap::new();
        for _ in 0..DRAWS {
            *counts.entry(catalog.select_random().kind).or_default() += 1;
        }

        let total_rarity: f32 = catalog.droppable().iter().map(|ty| ty.rarity).sum();
        for ty in catalog.droppable() {
            let expected = ty.rarity / total_rarity;
            let observed =
                *counts.get(&ty.kind).unwrap_or(&0) as f32 / DRAWS as f32;
            let tolerance = (expected * 0.05).max(0.01);
            assert!(
                (observed - expected).abs() < tolerance,
                "{}: observed {:.4}, expected {:.4} ± {:.4}",
                ty.kind.name(),
                observed,
                expected,
                tolerance
            );
        }
    }

    #[test]
    fn slot_pool_reflects_rarity_times_one_hundred() {
        let ty = IngredientType {
            kind: IngredientKind::Patty,
            height: 0.22,
            rarity: 0.45,
            sticky: false,
            sticky_strength: 0.0,
        };
        assert_eq!(IngredientCatalog::slot_count(&ty), 45);
    }
}
