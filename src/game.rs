//! Root game controller: spawning, drop submission, end-of-round flow.
//!
//! ## Round lifecycle
//!
//! 1. A [`NewGameRequested`] message (menu button or Enter key) atomically
//!    resets the session, the drop ledger, the dedup set, the sticky joints
//!    and the tower stack, then arms the setup delay.
//! 2. When the delay elapses the phase becomes `Running` and the first
//!    ingredient spawn is armed.
//! 3. The active ingredient traverses its animation path left to right.
//!    Space / left-click converts it into a physics-tracked drop at its
//!    current position, advances the tower offset by its stacking height,
//!    and arms the next spawn.
//! 4. Three triggers end a round — explicit stop (Escape), animation
//!    overflow past the travel boundary, lives exhausted — all funnelled
//!    through the [`RoundEndRequested`] queue and closed exactly once by
//!    `round_end_system`: any active ingredient is force-dropped with
//!    normal accounting, the terminal top bun drops from above the tower,
//!    the final score is reported, and the phase transitions to its
//!    terminal state.
//!
//! Drops in flight when the round closes still resolve through the ledger;
//! the report uses the authoritative captured score, so a late landed bonus
//! never changes what was transmitted.

use crate::arena::TowerStack;
use crate::catalog::{
    dropped_ingredient_physics, IngredientBody, IngredientCatalog, IngredientKind,
    IngredientVisual,
};
use crate::config::GameConfig;
use crate::drops::DropLedger;
use crate::ground::GroundDedup;
use crate::reporting::{ReportOutcome, ScoreReporting};
use crate::session::{EndReason, GamePhase, GameSession, RoundEndRequested};
use crate::{adhesion, arena, catalog, config, drops, ground};
use bevy::prelude::*;

// ── Messages & resources ──────────────────────────────────────────────────────

/// Request a fresh round (menu button, Enter on an overlay).
#[derive(Message, Debug, Clone, Copy)]
pub struct NewGameRequested;

/// Pending one-shot delays owned by the state machine.
#[derive(Resource, Debug, Default)]
pub struct RoundFlow {
    /// Countdown to the `Running` transition after a reset; lets the reset
    /// state propagate before the first spawn.
    pub pending_start: Option<f32>,
    /// Countdown to the next ingredient spawn.
    pub pending_spawn: Option<f32>,
}

/// The single entity currently traversing its pre-drop animation path.
///
/// Exactly 0 or 1 instance exists at any time.  Purely animated — it gains
/// physics components only when converted into a drop.
#[derive(Component, Debug, Clone, Copy)]
pub struct ActiveIngredient {
    pub kind: IngredientKind,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the phase machine, core resources, and every gameplay system.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GamePhase>()
            .init_resource::<GameSession>()
            .init_resource::<DropLedger>()
            .init_resource::<GroundDedup>()
            .init_resource::<adhesion::StickyJoints>()
            .init_resource::<TowerStack>()
            .init_resource::<RoundFlow>()
            .init_resource::<IngredientCatalog>()
            .init_resource::<ScoreReporting>()
            .add_message::<NewGameRequested>()
            .add_message::<RoundEndRequested>()
            .add_systems(
                Startup,
                (
                    catalog::validate_catalog.after(config::load_game_config),
                    arena::spawn_arena.after(config::load_game_config),
                ),
            )
            .add_systems(
                Update,
                (
                    new_game_system,
                    setup_delay_system,
                    drops::drop_resolution_system,
                    ground::ground_dedup_sweep_system,
                    adhesion::adhesion_maintenance_system,
                    arena::base_offset_system,
                    catalog::attach_ingredient_mesh_system,
                ),
            )
            .add_systems(
                Update,
                (
                    spawn_ingredient_system,
                    animate_active_system,
                    drop_input_system,
                    stop_input_system,
                )
                    .run_if(in_state(GamePhase::Running)),
            )
            .add_systems(
                PostUpdate,
                (
                    ground::ground_contact_system,
                    adhesion::adhesion_contact_system,
                    round_end_system,
                )
                    .chain(),
            );
    }
}

// ── Round lifecycle systems ───────────────────────────────────────────────────

/// Atomically reset all round state and arm the setup delay.
pub fn new_game_system(
    mut commands: Commands,
    mut requests: MessageReader<NewGameRequested>,
    mut session: ResMut<GameSession>,
    mut ledger: ResMut<DropLedger>,
    mut dedup: ResMut<GroundDedup>,
    mut joints: ResMut<adhesion::StickyJoints>,
    mut stack: ResMut<TowerStack>,
    mut flow: ResMut<RoundFlow>,
    config: Res<GameConfig>,
    q_entities: Query<Entity, Or<(With<IngredientBody>, With<ActiveIngredient>)>>,
) {
    if requests.read().next().is_none() {
        return;
    }

    for entity in q_entities.iter() {
        commands.entity(entity).despawn();
    }
    session.reset(config.starting_lives);
    ledger.clear();
    dedup.clear();
    joints.clear();
    stack.reset(&config);
    flow.pending_start = Some(config.setup_delay_secs);
    flow.pending_spawn = None;
    info!("new game: state reset, starting in {:.1}s", config.setup_delay_secs);
}

/// Tick the setup delay; on expiry enter `Running` and arm the first spawn.
pub fn setup_delay_system(
    time: Res<Time>,
    mut flow: ResMut<RoundFlow>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    let Some(remaining) = flow.pending_start.as_mut() else {
        return;
    };
    *remaining -= time.delta_secs();
    if *remaining <= 0.0 {
        flow.pending_start = None;
        flow.pending_spawn = Some(0.0);
        next_state.set(GamePhase::Running);
    }
}

/// Tick the spawn delay; on expiry install a random type as the active
/// entity.  Runs only in `Running` — spawning is a no-op in any other phase.
pub fn spawn_ingredient_system(
    mut commands: Commands,
    time: Res<Time>,
    mut flow: ResMut<RoundFlow>,
    catalog: Res<IngredientCatalog>,
    config: Res<GameConfig>,
) {
    let Some(remaining) = flow.pending_spawn.as_mut() else {
        return;
    };
    *remaining -= time.delta_secs();
    if *remaining > 0.0 {
        return;
    }
    flow.pending_spawn = None;

    let ty = catalog.select_random();
    commands.spawn((
        ActiveIngredient { kind: ty.kind },
        IngredientVisual {
            kind: ty.kind,
            height: ty.height,
        },
        Transform::from_xyz(config.active_path_start_x, config.active_path_y, 0.0),
        GlobalTransform::default(),
        Visibility::default(),
    ));
}

/// Advance the active entity along its lateral path; request an overflow
/// end-of-round when it exceeds the travel boundary.
pub fn animate_active_system(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut q_active: Query<&mut Transform, With<ActiveIngredient>>,
    mut end_writer: MessageWriter<RoundEndRequested>,
) {
    let Ok(mut transform) = q_active.single_mut() else {
        return;
    };
    transform.translation.x += config.active_path_speed * time.delta_secs();
    if transform.translation.x > config.overflow_boundary_x {
        end_writer.write(RoundEndRequested {
            reason: EndReason::Overflow,
        });
    }
}

/// Convert the active entity into a physics-tracked drop on player input.
pub fn drop_input_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    q_active: Query<(Entity, &Transform, &ActiveIngredient)>,
    mut session: ResMut<GameSession>,
    mut ledger: ResMut<DropLedger>,
    mut flow: ResMut<RoundFlow>,
    catalog: Res<IngredientCatalog>,
    config: Res<GameConfig>,
) {
    if !(keys.just_pressed(KeyCode::Space) || buttons.just_pressed(MouseButton::Left)) {
        return;
    }
    // No active entity → guarded no-op, not an error.
    let Ok((entity, transform, active)) = q_active.single() else {
        return;
    };
    convert_active_to_drop(
        &mut commands,
        entity,
        transform,
        active,
        &mut session,
        &mut ledger,
        &catalog,
        &config,
    );
    flow.pending_spawn = Some(config.next_spawn_delay_secs);
}

/// Explicit stop: Escape requests an end-of-round.
pub fn stop_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut end_writer: MessageWriter<RoundEndRequested>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        end_writer.write(RoundEndRequested {
            reason: EndReason::Stopped,
        });
    }
}

/// Hand the active entity to the physics world and the drop ledger.
///
/// Shared by the player drop path and the end-of-round force-drop so both
/// take identical accounting (ledger entry, tower offset, delayed
/// landed/fell resolution).
#[allow(clippy::too_many_arguments)]
fn convert_active_to_drop(
    commands: &mut Commands,
    entity: Entity,
    transform: &Transform,
    active: &ActiveIngredient,
    session: &mut GameSession,
    ledger: &mut DropLedger,
    catalog: &IngredientCatalog,
    config: &GameConfig,
) {
    let Some(ty) = catalog.get(active.kind) else {
        return;
    };
    commands
        .entity(entity)
        .remove::<ActiveIngredient>()
        .insert(dropped_ingredient_physics(ty, config));
    ledger.submit(entity, ty.kind, transform.translation.truncate());
    session.advance_tower(ty.height);
}

/// Close the round exactly once, whatever combination of triggers fired.
///
/// Drains every pending [`RoundEndRequested`]; the first request wins and
/// the `round_closed` latch makes later frames' requests no-ops, so stop
/// pressed twice — or overflow and lives-exhausted in the same frame —
/// still yields one terminal drop and one score report.
#[allow(clippy::too_many_arguments)]
pub fn round_end_system(
    mut commands: Commands,
    mut requests: MessageReader<RoundEndRequested>,
    mut session: ResMut<GameSession>,
    mut ledger: ResMut<DropLedger>,
    mut flow: ResMut<RoundFlow>,
    q_active: Query<(Entity, &Transform, &ActiveIngredient)>,
    q_dropped: Query<&Transform, With<IngredientBody>>,
    catalog: Res<IngredientCatalog>,
    config: Res<GameConfig>,
    reporting: Res<ScoreReporting>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    let mut reason = None;
    for request in requests.read() {
        if reason.is_none() {
            reason = Some(request.reason);
        }
    }
    let Some(reason) = reason else {
        return;
    };
    if session.round_closed {
        return;
    }
    session.round_closed = true;

    // Force-drop any active entity with the same accounting as a player drop
    // (its landed/fell resolution is still scheduled; no next spawn).
    if let Ok((entity, transform, active)) = q_active.single() {
        convert_active_to_drop(
            &mut commands,
            entity,
            transform,
            active,
            &mut session,
            &mut ledger,
            &catalog,
            &config,
        );
    }

    // Terminal closing ingredient, dropped from above the current tower.
    let top = q_dropped
        .iter()
        .map(|t| t.translation.y)
        .fold(config.base_center_y + config.base_half_height, f32::max);
    let terminal = catalog.terminal();
    commands.spawn((
        IngredientVisual {
            kind: terminal.kind,
            height: terminal.height,
        },
        Transform::from_xyz(0.0, top + config.terminal_drop_clearance, 0.0),
        GlobalTransform::default(),
        Visibility::default(),
        dropped_ingredient_physics(terminal, &config),
    ));

    let score = session.authoritative_score();
    match reporting.report(score) {
        ReportOutcome::Delivered => {
            info!("round over ({reason:?}); score {score} delivered");
        }
        ReportOutcome::NotDelivered => {
            warn!("round over ({reason:?}); score {score} could not be delivered");
        }
    }

    flow.pending_start = None;
    flow.pending_spawn = None;
    next_state.set(reason.terminal_phase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::ScoreReporter;
    use bevy::state::app::StatesPlugin;
    use std::sync::{Arc, Mutex};

    struct RecordingReporter {
        scores: Arc<Mutex<Vec<u32>>>,
    }

    impl ScoreReporter for RecordingReporter {
        fn report(&self, score: u32) -> ReportOutcome {
            self.scores.lock().unwrap().push(score);
            ReportOutcome::Delivered
        }
    }

    fn round_test_app() -> (App, Arc<Mutex<Vec<u32>>>) {
        let scores = Arc::new(Mutex::new(Vec::new()));
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin));
        app.init_state::<GamePhase>();
        app.add_message::<NewGameRequested>();
        app.add_message::<RoundEndRequested>();
        app.insert_resource(GameConfig::default());
        app.insert_resource(GameSession::default());
        app.insert_resource(DropLedger::default());
        app.insert_resource(GroundDedup::default());
        app.insert_resource(adhesion::StickyJoints::default());
        app.insert_resource(TowerStack::default());
        app.insert_resource(RoundFlow::default());
        app.insert_resource(IngredientCatalog::default());
        app.insert_resource(ScoreReporting::new(Box::new(RecordingReporter {
            scores: scores.clone(),
        })));
        app.add_systems(Update, (new_game_system, setup_delay_system));
        app.add_systems(PostUpdate, round_end_system);
        (app, scores)
    }

    fn top_bun_count(world: &mut World) -> usize {
        world
            .query::<&IngredientVisual>()
            .iter(world)
            .filter(|v| v.kind == IngredientKind::TopBun)
            .count()
    }

    #[test]
    fn new_game_resets_session_and_arms_setup_delay() {
        let (mut app, _) = round_test_app();
        {
            let mut session = app.world_mut().resource_mut::<GameSession>();
            session.score = 9;
            session.lives = 0;
            session.round_closed = true;
        }

        app.world_mut().write_message(NewGameRequested);
        app.update();

        let session = app.world().resource::<GameSession>();
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, crate::constants::STARTING_LIVES);
        assert!(!session.round_closed);
        let flow = app.world().resource::<RoundFlow>();
        assert!(flow.pending_start.is_some());
    }

    #[test]
    fn setup_delay_expiry_enters_running_and_arms_first_spawn() {
        let (mut app, _) = round_test_app();
        app.world_mut().resource_mut::<RoundFlow>().pending_start = Some(0.0);

        app.update(); // timer fires; Running queued
        app.update(); // StateTransition applies

        let phase = app.world().resource::<State<GamePhase>>();
        assert_eq!(*phase.get(), GamePhase::Running);
        let flow = app.world().resource::<RoundFlow>();
        assert!(flow.pending_start.is_none());
        assert_eq!(flow.pending_spawn, Some(0.0));
    }

    #[test]
    fn single_trigger_closes_round_and_reports_once() {
        let (mut app, scores) = round_test_app();
        app.world_mut().resource_mut::<GameSession>().score = 4;

        app.world_mut().write_message(RoundEndRequested {
            reason: EndReason::Overflow,
        });
        app.update();
        app.update();

        assert_eq!(*scores.lock().unwrap(), vec![4]);
        assert_eq!(top_bun_count(app.world_mut()), 1);
        let phase = app.world().resource::<State<GamePhase>>();
        assert_eq!(*phase.get(), GamePhase::Finished);
    }

    #[test]
    fn simultaneous_triggers_close_round_exactly_once() {
        let (mut app, scores) = round_test_app();

        // Overflow and lives-exhausted land in the same frame.
        app.world_mut().write_message(RoundEndRequested {
            reason: EndReason::Overflow,
        });
        app.world_mut().write_message(RoundEndRequested {
            reason: EndReason::LivesExhausted,
        });
        app.update();

        assert_eq!(scores.lock().unwrap().len(), 1);
        assert_eq!(top_bun_count(app.world_mut()), 1);
    }

    #[test]
    fn repeated_stop_is_a_noop_after_the_first() {
        let (mut app, scores) = round_test_app();

        app.world_mut().write_message(RoundEndRequested {
            reason: EndReason::Stopped,
        });
        app.update();
        app.world_mut().write_message(RoundEndRequested {
            reason: EndReason::Stopped,
        });
        app.update();
        app.update();

        assert_eq!(scores.lock().unwrap().len(), 1);
        assert_eq!(top_bun_count(app.world_mut()), 1);
        let phase = app.world().resource::<State<GamePhase>>();
        assert_eq!(*phase.get(), GamePhase::Paused);
    }

    #[test]
    fn report_prefers_captured_final_score() {
        let (mut app, scores) = round_test_app();
        {
            let mut session = app.world_mut().resource_mut::<GameSession>();
            session.score = 2;
            // Three penalties from score 2: 2 → 1 → 0, capture at exhaustion.
            session.apply_ground_penalty();
            session.apply_ground_penalty();
            session.apply_ground_penalty();
            // A landed timer fires after the capture.
            session.apply_landed();
        }

        app.world_mut().write_message(RoundEndRequested {
            reason: EndReason::LivesExhausted,
        });
        app.update();

        assert_eq!(*scores.lock().unwrap(), vec![0]);
    }

    #[test]
    fn force_drop_takes_normal_accounting() {
        let (mut app, _) = round_test_app();
        let active = app
            .world_mut()
            .spawn((
                ActiveIngredient {
                    kind: IngredientKind::Patty,
                },
                Transform::from_xyz(1.0, 5.0, 0.0),
                GlobalTransform::default(),
            ))
            .id();

        app.world_mut().write_message(RoundEndRequested {
            reason: EndReason::Stopped,
        });
        app.update();

        // Converted, ledger-tracked, tower advanced; no longer active.
        assert!(app.world().get::<ActiveIngredient>(active).is_none());
        assert!(app.world().get::<IngredientBody>(active).is_some());
        assert!(app.world().resource::<DropLedger>().contains(active));
        let session = app.world().resource::<GameSession>();
        assert!(session.tower_offset > 0.0);
    }
}
