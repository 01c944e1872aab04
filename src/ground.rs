//! Ground-contact resolver: converts a ground hit into a life loss and a
//! score penalty, exactly once per physical contact episode.
//!
//! ## Flow
//!
//! 1. `ground_contact_system` listens for `CollisionEvent::Started` pairs
//!    where exactly one side is the ground slab.
//! 2. The other body's identifier is checked against [`GroundDedup`], a
//!    per-body TTL set — multi-frame contact raises several callbacks for
//!    the same body, and only the first within the window may penalise.
//! 3. The matching drop record is removed from the [`DropLedger`] (making
//!    the delayed landed check a no-op for this body), then the session
//!    takes the penalty: −1 life, −1 score floored at 0.
//! 4. If the penalty exhausts lives, the post-penalty score has already been
//!    captured inside the same call (see
//!    [`GameSession::apply_ground_penalty`]) and a [`RoundEndRequested`]
//!    message is queued for the state machine.
//! 5. The offending entity is despawned from the world.
//!
//! Ordering independence: a ground callback may arrive before or after the
//! body's landed timer fires.  Either way each side resolves through ledger
//! removal, so at most one of the two outcomes ever applies.

use crate::drops::DropLedger;
use crate::session::{EndReason, GameSession, RoundEndRequested};
use crate::{catalog::IngredientBody, config::GameConfig};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashMap;

/// Marker component for the ground slab beneath the tower.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ground;

// ── Dedup set ─────────────────────────────────────────────────────────────────

/// Set of body identifiers that have already triggered a ground-contact
/// resolution, each expiring after a grace window.
///
/// Explicit key→age map with a timer-driven sweep rather than one deferred
/// callback per entry: expiry order does not matter, only the "at most one
/// penalty per identifier per window" guarantee.
#[derive(Resource, Debug, Default)]
pub struct GroundDedup {
    entries: HashMap<Entity, f32>,
}

impl GroundDedup {
    /// Mark `entity` as penalised.  Returns `false` if it is already marked
    /// (the caller must ignore the contact).
    pub fn try_mark(&mut self, entity: Entity) -> bool {
        if self.entries.contains_key(&entity) {
            return false;
        }
        self.entries.insert(entity, 0.0);
        true
    }

    /// Age every entry by `dt` and drop those past the expiry window.
    pub fn sweep(&mut self, dt: f32, expiry: f32) {
        for age in self.entries.values_mut() {
            *age += dt;
        }
        self.entries.retain(|_, age| *age < expiry);
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Result of one ground-contact callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundOutcome {
    /// The contact penalised the session.
    Penalized(crate::session::PenaltyOutcome),
    /// The body already triggered a penalty within the dedup window.
    DuplicateContact,
    /// The body was not in the ledger — already resolved by the other race
    /// participant (or never tracked).
    AlreadyResolved,
}

/// Apply the ground-contact state machine for one callback.
///
/// Guarantee: each physical ground contact yields exactly one life loss and
/// at most one score deduction, regardless of how many callbacks the physics
/// adapter raises for the same body within the dedup window.
pub fn resolve_ground_contact(
    session: &mut GameSession,
    ledger: &mut DropLedger,
    dedup: &mut GroundDedup,
    body: Entity,
) -> GroundOutcome {
    if !dedup.try_mark(body) {
        return GroundOutcome::DuplicateContact;
    }
    if ledger.remove(body).is_none() {
        return GroundOutcome::AlreadyResolved;
    }
    GroundOutcome::Penalized(session.apply_ground_penalty())
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Consume ground-collision events and penalise the session.
///
/// Matches `CollisionEvent::Started` pairs; ignores `Stopped`.  Pairs where
/// neither or both sides are the ground slab are not ground contacts and are
/// skipped defensively.
pub fn ground_contact_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    mut session: ResMut<GameSession>,
    mut ledger: ResMut<DropLedger>,
    mut dedup: ResMut<GroundDedup>,
    q_ground: Query<(), With<Ground>>,
    q_body: Query<(), With<IngredientBody>>,
    mut end_writer: MessageWriter<RoundEndRequested>,
) {
    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let body = if q_ground.contains(e1) && !q_ground.contains(e2) {
            e2
        } else if q_ground.contains(e2) && !q_ground.contains(e1) {
            e1
        } else {
            continue;
        };
        if !q_body.contains(body) {
            continue;
        }

        match resolve_ground_contact(&mut session, &mut ledger, &mut dedup, body) {
            GroundOutcome::Penalized(outcome) => {
                commands.entity(body).despawn();
                info!(
                    "ground hit: score {} lives {}",
                    outcome.score, outcome.lives
                );
                if outcome.lives_exhausted {
                    end_writer.write(RoundEndRequested {
                        reason: EndReason::LivesExhausted,
                    });
                }
            }
            GroundOutcome::DuplicateContact | GroundOutcome::AlreadyResolved => {}
        }
    }
}

/// Expire dedup entries past the grace window.
pub fn ground_dedup_sweep_system(
    time: Res<Time>,
    mut dedup: ResMut<GroundDedup>,
    config: Res<GameConfig>,
) {
    dedup.sweep(time.delta_secs(), config.ground_dedup_expiry_secs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IngredientKind;

    fn test_entities(count: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..count).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn first_contact_penalises_exactly_once() {
        let e = test_entities(1);
        let mut session = GameSession::default();
        let mut ledger = DropLedger::default();
        let mut dedup = GroundDedup::default();
        session.score = 3;
        ledger.submit(e[0], IngredientKind::Patty, Vec2::ZERO);

        let first = resolve_ground_contact(&mut session, &mut ledger, &mut dedup, e[0]);
        assert!(matches!(first, GroundOutcome::Penalized(_)));
        assert_eq!(session.score, 2);
        assert_eq!(session.lives, 2);

        // Multi-frame contact: repeated callbacks within the window no-op.
        for _ in 0..4 {
            let again = resolve_ground_contact(&mut session, &mut ledger, &mut dedup, e[0]);
            assert_eq!(again, GroundOutcome::DuplicateContact);
        }
        assert_eq!(session.score, 2);
        assert_eq!(session.lives, 2);
    }

    #[test]
    fn untracked_body_is_ignored_after_dedup_mark() {
        let e = test_entities(1);
        let mut session = GameSession::default();
        let mut ledger = DropLedger::default();
        let mut dedup = GroundDedup::default();

        let outcome = resolve_ground_contact(&mut session, &mut ledger, &mut dedup, e[0]);
        assert_eq!(outcome, GroundOutcome::AlreadyResolved);
        assert_eq!(session.lives, crate::constants::STARTING_LIVES);
        // The identifier is still marked, per the resolution order.
        assert!(dedup.contains(e[0]));
    }

    #[test]
    fn dedup_expires_after_the_grace_window() {
        let e = test_entities(1);
        let mut dedup = GroundDedup::default();
        assert!(dedup.try_mark(e[0]));

        dedup.sweep(0.3, 0.5);
        assert!(dedup.contains(e[0]));
        dedup.sweep(0.3, 0.5);
        assert!(!dedup.contains(e[0]));
        assert!(dedup.try_mark(e[0]));
    }

    #[test]
    fn penalty_removes_record_so_landed_check_noops() {
        let e = test_entities(1);
        let mut session = GameSession::default();
        let mut ledger = DropLedger::default();
        let mut dedup = GroundDedup::default();
        ledger.submit(e[0], IngredientKind::Cheese, Vec2::ZERO);

        resolve_ground_contact(&mut session, &mut ledger, &mut dedup, e[0]);
        assert!(ledger.tick(5.0, 2.0).is_empty());
        assert_eq!(session.score, 0);
    }

    #[test]
    fn exhausting_penalty_reports_and_captures_score() {
        let e = test_entities(3);
        let mut session = GameSession::default();
        let mut ledger = DropLedger::default();
        let mut dedup = GroundDedup::default();
        session.score = 2;
        for entity in &e {
            ledger.submit(*entity, IngredientKind::Bun, Vec2::ZERO);
        }

        let mut exhausted_seen = 0;
        for entity in &e {
            if let GroundOutcome::Penalized(outcome) =
                resolve_ground_contact(&mut session, &mut ledger, &mut dedup, *entity)
            {
                if outcome.lives_exhausted {
                    exhausted_seen += 1;
                }
            }
        }

        assert_eq!(exhausted_seen, 1);
        // Score went 2 → 1 → 0 → 0; captured at the third penalty.
        assert_eq!(session.final_score, Some(0));
        assert_eq!(session.authoritative_score(), 0);
    }

    // ── Headless system tests ─────────────────────────────────────────────────

    mod systems {
        use super::*;
        use bevy::state::app::StatesPlugin;
        use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

        fn ground_test_app() -> App {
            let mut app = App::new();
            app.add_plugins((MinimalPlugins, StatesPlugin));
            app.init_state::<crate::session::GamePhase>();
            app.add_message::<CollisionEvent>();
            app.add_message::<RoundEndRequested>();
            app.insert_resource(GameConfig::default());
            app.insert_resource(GameSession::default());
            app.insert_resource(DropLedger::default());
            app.insert_resource(GroundDedup::default());
            app.add_systems(PostUpdate, ground_contact_system);
            app
        }

        fn spawn_tracked_body(app: &mut App) -> Entity {
            let body = app
                .world_mut()
                .spawn((
                    crate::catalog::IngredientBody {
                        kind: IngredientKind::Patty,
                        height: 0.22,
                        sticky: false,
                        sticky_strength: 0.0,
                    },
                    Transform::default(),
                ))
                .id();
            app.world_mut()
                .resource_mut::<DropLedger>()
                .submit(body, IngredientKind::Patty, Vec2::ZERO);
            body
        }

        #[test]
        fn ground_event_penalises_and_despawns_body() {
            let mut app = ground_test_app();
            let ground = app.world_mut().spawn(Ground).id();
            let body = spawn_tracked_body(&mut app);

            app.world_mut().write_message(CollisionEvent::Started(
                ground,
                body,
                CollisionEventFlags::empty(),
            ));
            app.update();

            let session = app.world().resource::<GameSession>();
            assert_eq!(session.lives, crate::constants::STARTING_LIVES - 1);
            assert!(app.world().get_entity(body).is_err());
        }

        #[test]
        fn repeated_events_same_frame_penalise_once() {
            let mut app = ground_test_app();
            let ground = app.world_mut().spawn(Ground).id();
            let body = spawn_tracked_body(&mut app);

            for _ in 0..3 {
                app.world_mut().write_message(CollisionEvent::Started(
                    body,
                    ground,
                    CollisionEventFlags::empty(),
                ));
            }
            app.update();

            let session = app.world().resource::<GameSession>();
            assert_eq!(session.lives, crate::constants::STARTING_LIVES - 1);
        }

        #[test]
        fn non_ground_pair_is_ignored() {
            let mut app = ground_test_app();
            let _ground = app.world_mut().spawn(Ground).id();
            let a = spawn_tracked_body(&mut app);
            let b = spawn_tracked_body(&mut app);

            app.world_mut().write_message(CollisionEvent::Started(
                a,
                b,
                CollisionEventFlags::empty(),
            ));
            app.update();

            let session = app.world().resource::<GameSession>();
            assert_eq!(session.lives, crate::constants::STARTING_LIVES);
        }
    }
}
