//! Adhesion resolver: sticky ingredients bond to whatever they touch.
//!
//! ## Flow
//!
//! 1. `adhesion_contact_system` listens for ingredient–ingredient
//!    `CollisionEvent::Started` pairs where at least one side is flagged
//!    sticky.
//! 2. [`StickyJoints::try_create`] keys the pair by its unordered entity
//!    pair; a second collision while a record exists is a no-op, so the
//!    corrective effects are applied exactly once per bond.
//! 3. On creation the sticky member takes a one-time downward corrective
//!    impulse, raised damping, raised contact friction, and — for strongly
//!    sticky types — a mass reduction, all scaled by its strength.
//! 4. While the record lives, `adhesion_maintenance_system` runs a 100 ms
//!    tick: if the pair has separated beyond a threshold it pulls the sticky
//!    member back with an inverse-distance force biased toward lateral
//!    correction.  The loop self-terminates after 10 s, or immediately when
//!    the game leaves `Running` — adhesion never blocks a game-over
//!    transition.
//!
//! Tie-break: when **both** colliding bodies are sticky, the first operand
//! of the collision pair becomes the sticky member and receives every
//! corrective effect.  Preserved for behavioural parity with the original
//! game (see DESIGN.md) and pinned by a test below.

use crate::catalog::IngredientBody;
use crate::config::GameConfig;
use crate::session::GamePhase;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashMap;

// ── Joint records ─────────────────────────────────────────────────────────────

/// One active sticky bond between two bodies.
///
/// Never updated in place: duplicate collisions are ignored while the record
/// exists, and removal happens only through the age-based cleanup.
#[derive(Debug, Clone, Copy)]
pub struct JointRecord {
    /// The member receiving corrective forces.
    pub sticky: Entity,
    /// The body it is bonded to.
    pub other: Entity,
    /// Sticky member's strength at bond time.
    pub strength: f32,
    /// Seconds since the bond was created.
    pub age: f32,
}

/// Active sticky joints, keyed by the unordered pair of entity identifiers.
#[derive(Resource, Debug, Default)]
pub struct StickyJoints {
    joints: HashMap<(Entity, Entity), JointRecord>,
    /// Accumulator for the maintenance tick interval.
    tick_accum: f32,
}

/// Order-independent key for an entity pair.
fn pair_key(a: Entity, b: Entity) -> (Entity, Entity) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl StickyJoints {
    /// Create a joint for a qualifying collision, or return `None` when the
    /// pair is already bonded or neither side is sticky.
    ///
    /// `first`/`second` are the collision operands **in callback order**;
    /// each carries `Some(strength)` when that side is sticky.  When both
    /// are sticky the first operand wins the sticky role.
    pub fn try_create(
        &mut self,
        first: Entity,
        first_strength: Option<f32>,
        second: Entity,
        second_strength: Option<f32>,
    ) -> Option<JointRecord> {
        let (sticky, other, strength) = match (first_strength, second_strength) {
            (Some(s), _) => (first, second, s),
            (None, Some(s)) => (second, first, s),
            (None, None) => return None,
        };

        let key = pair_key(first, second);
        if self.joints.contains_key(&key) {
            return None;
        }

        let record = JointRecord {
            sticky,
            other,
            strength,
            age: 0.0,
        };
        self.joints.insert(key, record);
        Some(record)
    }

    /// Whether a bond exists for this pair, in either operand order.
    pub fn contains_pair(&self, a: Entity, b: Entity) -> bool {
        self.joints.contains_key(&pair_key(a, b))
    }

    /// Advance the maintenance accumulator; returns `true` when a pass is
    /// due (and resets the accumulator).
    pub fn maintenance_due(&mut self, dt: f32, interval: f32) -> bool {
        self.tick_accum += dt;
        if self.tick_accum >= interval {
            self.tick_accum = 0.0;
            true
        } else {
            false
        }
    }

    /// Age every record by `dt` and remove those past the lifetime.
    /// Returns the expired records so callers can zero their forces.
    pub fn age_and_prune(&mut self, dt: f32, lifetime: f32) -> Vec<JointRecord> {
        let mut expired = Vec::new();
        for record in self.joints.values_mut() {
            record.age += dt;
        }
        self.joints.retain(|_, record| {
            if record.age >= lifetime {
                expired.push(*record);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointRecord> {
        self.joints.values()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn clear(&mut self) {
        self.joints.clear();
        self.tick_accum = 0.0;
    }
}

// ── Strength scaling ──────────────────────────────────────────────────────────

fn strength_alpha(strength: f32, strength_max: f32) -> f32 {
    (strength / strength_max).clamp(0.0, 1.0)
}

fn scaled(min: f32, max: f32, alpha: f32) -> f32 {
    min + (max - min) * alpha
}

/// One-time downward corrective impulse magnitude for a sticky member.
/// Increases linearly with strength within the configured range.
pub fn corrective_impulse(strength: f32, config: &GameConfig) -> f32 {
    scaled(
        config.sticky_impulse_min,
        config.sticky_impulse_max,
        strength_alpha(strength, config.sticky_strength_max),
    )
}

/// Linear/angular damping applied to a sticky member.
pub fn damping_coefficient(strength: f32, config: &GameConfig) -> f32 {
    scaled(
        config.sticky_damping_min,
        config.sticky_damping_max,
        strength_alpha(strength, config.sticky_strength_max),
    )
}

/// Contact friction applied to a sticky member.
pub fn contact_friction(strength: f32, config: &GameConfig) -> f32 {
    scaled(
        config.sticky_friction_min,
        config.sticky_friction_max,
        strength_alpha(strength, config.sticky_strength_max),
    )
}

/// Attractive force pulling a separated sticky member toward its partner.
///
/// Magnitude is inversely proportional to distance; the vertical component
/// is attenuated so the pull is biased toward lateral correction.
pub fn attraction_force(delta: Vec2, gain: f32, vertical_bias: f32) -> Vec2 {
    let dist = delta.length();
    if dist <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let dir = delta / dist;
    let mag = gain / dist;
    Vec2::new(dir.x * mag, dir.y * mag * vertical_bias)
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Bond sticky ingredients on first qualifying contact.
pub fn adhesion_contact_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    mut joints: ResMut<StickyJoints>,
    q_body: Query<&IngredientBody>,
    config: Res<GameConfig>,
) {
    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let (Ok(b1), Ok(b2)) = (q_body.get(e1), q_body.get(e2)) else {
            continue;
        };

        let s1 = b1.sticky.then_some(b1.sticky_strength);
        let s2 = b2.sticky.then_some(b2.sticky_strength);
        let Some(record) = joints.try_create(e1, s1, e2, s2) else {
            continue;
        };

        let damping = damping_coefficient(record.strength, &config);
        commands.entity(record.sticky).insert((
            ExternalImpulse {
                impulse: Vec2::new(0.0, -corrective_impulse(record.strength, &config)),
                torque_impulse: 0.0,
            },
            Damping {
                linear_damping: damping,
                angular_damping: damping,
            },
            Friction::coefficient(contact_friction(record.strength, &config)),
        ));
        if record.strength > config.sticky_mass_reduction_threshold {
            commands
                .entity(record.sticky)
                .insert(ColliderMassProperties::Density(
                    config.ingredient_density * config.sticky_mass_scale,
                ));
        }
        info!(
            "sticky bond: {:?} ↔ {:?} (strength {:.2})",
            record.sticky, record.other, record.strength
        );
    }
}

/// Periodic maintenance: pull separated bonded pairs back together; expire
/// old bonds; abandon everything the moment the game leaves `Running`.
pub fn adhesion_maintenance_system(
    time: Res<Time>,
    phase: Res<State<GamePhase>>,
    mut joints: ResMut<StickyJoints>,
    q_pos: Query<&Transform, With<IngredientBody>>,
    mut q_force: Query<&mut ExternalForce, With<IngredientBody>>,
    config: Res<GameConfig>,
) {
    if *phase.get() != GamePhase::Running {
        if !joints.is_empty() {
            for record in joints.iter() {
                if let Ok(mut force) = q_force.get_mut(record.sticky) {
                    force.force = Vec2::ZERO;
                }
            }
            joints.clear();
        }
        return;
    }

    let dt = time.delta_secs();
    for record in joints.age_and_prune(dt, config.sticky_lifetime_secs) {
        if let Ok(mut force) = q_force.get_mut(record.sticky) {
            force.force = Vec2::ZERO;
        }
    }

    if !joints.maintenance_due(dt, config.sticky_tick_secs) {
        return;
    }

    for record in joints.iter() {
        let (Ok(sticky_pos), Ok(other_pos)) = (q_pos.get(record.sticky), q_pos.get(record.other))
        else {
            continue;
        };
        let delta = other_pos.translation.truncate() - sticky_pos.translation.truncate();
        let Ok(mut force) = q_force.get_mut(record.sticky) else {
            continue;
        };
        if delta.length() > config.sticky_separation_threshold {
            force.force = attraction_force(
                delta,
                config.sticky_attract_gain,
                config.sticky_vertical_bias,
            );
        } else {
            force.force = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entities(count: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..count).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn joint_created_once_per_unordered_pair() {
        let e = test_entities(2);
        let mut joints = StickyJoints::default();

        assert!(joints.try_create(e[0], Some(0.9), e[1], None).is_some());
        // Same pair again, both operand orders: no-ops.
        assert!(joints.try_create(e[0], Some(0.9), e[1], None).is_none());
        assert!(joints.try_create(e[1], None, e[0], Some(0.9)).is_none());
        assert_eq!(joints.len(), 1);
    }

    #[test]
    fn both_sticky_tie_break_prefers_first_operand() {
        let e = test_entities(2);
        let mut joints = StickyJoints::default();

        let record = joints
            .try_create(e[0], Some(0.9), e[1], Some(1.2))
            .expect("joint should be created");
        assert_eq!(record.sticky, e[0]);
        assert_eq!(record.other, e[1]);
        assert_eq!(record.strength, 0.9);
    }

    #[test]
    fn non_sticky_pair_creates_nothing() {
        let e = test_entities(2);
        let mut joints = StickyJoints::default();
        assert!(joints.try_create(e[0], None, e[1], None).is_none());
        assert!(joints.is_empty());
    }

    #[test]
    fn second_operand_sticky_takes_the_role() {
        let e = test_entities(2);
        let mut joints = StickyJoints::default();
        let record = joints.try_create(e[0], None, e[1], Some(1.2)).unwrap();
        assert_eq!(record.sticky, e[1]);
        assert_eq!(record.other, e[0]);
    }

    #[test]
    fn joints_expire_at_lifetime() {
        let e = test_entities(2);
        let mut joints = StickyJoints::default();
        joints.try_create(e[0], Some(0.9), e[1], None);

        assert!(joints.age_and_prune(5.0, 10.0).is_empty());
        let expired = joints.age_and_prune(5.0, 10.0);
        assert_eq!(expired.len(), 1);
        assert!(joints.is_empty());

        // After expiry the pair may bond again.
        assert!(joints.try_create(e[0], Some(0.9), e[1], None).is_some());
    }

    #[test]
    fn maintenance_tick_fires_at_interval() {
        let mut joints = StickyJoints::default();
        assert!(!joints.maintenance_due(0.05, 0.1));
        assert!(joints.maintenance_due(0.06, 0.1));
        // Accumulator reset after firing.
        assert!(!joints.maintenance_due(0.05, 0.1));
    }

    #[test]
    fn effect_scaling_covers_the_specified_ranges() {
        let config = GameConfig::default();

        assert!((corrective_impulse(0.0, &config) - 2.0).abs() < 1e-5);
        assert!((corrective_impulse(1.2, &config) - 4.0).abs() < 1e-5);
        assert!((damping_coefficient(0.0, &config) - 0.8).abs() < 1e-5);
        assert!((damping_coefficient(1.2, &config) - 0.95).abs() < 1e-5);
        assert!((contact_friction(0.0, &config) - 2.0).abs() < 1e-5);
        assert!((contact_friction(1.2, &config) - 5.0).abs() < 1e-5);

        // Out-of-scale strengths clamp instead of extrapolating.
        assert!((corrective_impulse(2.0, &config) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn attraction_is_inverse_distance_and_laterally_biased() {
        let near = attraction_force(Vec2::new(1.0, 0.0), 1.8, 0.35);
        let far = attraction_force(Vec2::new(2.0, 0.0), 1.8, 0.35);
        assert!(near.length() > far.length());
        assert!((near.length() * 0.5 - far.length()).abs() < 1e-5);

        let diagonal = attraction_force(Vec2::new(1.0, 1.0), 1.8, 0.35);
        assert!(diagonal.x.abs() > diagonal.y.abs());

        assert_eq!(attraction_force(Vec2::ZERO, 1.8, 0.35), Vec2::ZERO);
    }

    // ── Headless system tests ─────────────────────────────────────────────────

    mod systems {
        use super::*;
        use crate::catalog::IngredientKind;
        use bevy::state::app::StatesPlugin;
        use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

        fn adhesion_test_app() -> App {
            let mut app = App::new();
            app.add_plugins((MinimalPlugins, StatesPlugin));
            app.init_state::<GamePhase>();
            app.add_message::<CollisionEvent>();
            app.insert_resource(GameConfig::default());
            app.insert_resource(StickyJoints::default());
            app.add_systems(PostUpdate, adhesion_contact_system);
            app
        }

        fn spawn_ingredient(app: &mut App, sticky: bool, strength: f32) -> Entity {
            app.world_mut()
                .spawn((
                    IngredientBody {
                        kind: if sticky {
                            IngredientKind::Cheese
                        } else {
                            IngredientKind::Patty
                        },
                        height: 0.1,
                        sticky,
                        sticky_strength: strength,
                    },
                    Transform::default(),
                ))
                .id()
        }

        #[test]
        fn sticky_collision_bonds_and_applies_one_time_effects() {
            let mut app = adhesion_test_app();
            let sticky = spawn_ingredient(&mut app, true, 0.9);
            let plain = spawn_ingredient(&mut app, false, 0.0);

            app.world_mut().write_message(CollisionEvent::Started(
                sticky,
                plain,
                CollisionEventFlags::empty(),
            ));
            app.update();

            let joints = app.world().resource::<StickyJoints>();
            assert!(joints.contains_pair(sticky, plain));

            let impulse = app.world().get::<ExternalImpulse>(sticky).unwrap();
            assert!(impulse.impulse.y < 0.0, "corrective impulse points down");
            let damping = app.world().get::<Damping>(sticky).unwrap();
            assert!(damping.linear_damping >= 0.8);

            // Strength 0.9 > 0.8: mass reduction applies.
            assert!(app.world().get::<ColliderMassProperties>(sticky).is_some());
        }

        #[test]
        fn repeated_collisions_bond_only_once() {
            let mut app = adhesion_test_app();
            let sticky = spawn_ingredient(&mut app, true, 1.2);
            let plain = spawn_ingredient(&mut app, false, 0.0);

            for _ in 0..2 {
                app.world_mut().write_message(CollisionEvent::Started(
                    sticky,
                    plain,
                    CollisionEventFlags::empty(),
                ));
                app.update();
            }

            assert_eq!(app.world().resource::<StickyJoints>().len(), 1);
        }

        #[test]
        fn plain_pair_is_ignored() {
            let mut app = adhesion_test_app();
            let a = spawn_ingredient(&mut app, false, 0.0);
            let b = spawn_ingredient(&mut app, false, 0.0);

            app.world_mut().write_message(CollisionEvent::Started(
                a,
                b,
                CollisionEventFlags::empty(),
            ));
            app.update();

            assert!(app.world().resource::<StickyJoints>().is_empty());
        }

        #[test]
        fn leaving_running_clears_all_joints() {
            let mut app = adhesion_test_app();
            app.add_systems(Update, adhesion_maintenance_system);
            let sticky = spawn_ingredient(&mut app, true, 0.9);
            let plain = spawn_ingredient(&mut app, false, 0.0);

            app.world_mut()
                .resource_mut::<NextState<GamePhase>>()
                .set(GamePhase::Running);
            app.update();

            app.world_mut().write_message(CollisionEvent::Started(
                sticky,
                plain,
                CollisionEventFlags::empty(),
            ));
            app.update();
            assert_eq!(app.world().resource::<StickyJoints>().len(), 1);

            app.world_mut()
                .resource_mut::<NextState<GamePhase>>()
                .set(GamePhase::Finished);
            app.update();
            app.update();

            assert!(app.world().resource::<StickyJoints>().is_empty());
        }
    }
}
