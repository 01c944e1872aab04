//! Menu overlays — main menu, round-stopped overlay, and game-over screen.
//!
//! ## Systems (registered by `MenuPlugin`)
//!
//! | System                    | Schedule                | Purpose                        |
//! |---------------------------|-------------------------|--------------------------------|
//! | `setup_main_menu`         | `OnEnter(Idle)`         | Spawn splash menu UI           |
//! | `cleanup_main_menu`       | `OnExit(Idle)`          | Despawn menu UI entities       |
//! | `setup_stopped_overlay`   | `OnEnter(Paused)`       | Spawn round-stopped overlay    |
//! | `cleanup_stopped_overlay` | `OnExit(Paused)`        | Despawn overlay                |
//! | `setup_game_over`         | `OnEnter(Finished)`     | Spawn game-over overlay        |
//! | `cleanup_game_over`       | `OnExit(Finished)`      | Despawn overlay                |
//! | `menu_button_system`      | `Update` (any overlay)  | Handle Start / Restart / Quit  |

use crate::game::NewGameRequested;
use crate::session::{GamePhase, GameSession};
use bevy::prelude::*;

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the main-menu UI.
#[derive(Component)]
pub struct MainMenuRoot;

/// Root node of the round-stopped overlay.
#[derive(Component)]
pub struct StoppedOverlayRoot;

/// Root node of the game-over overlay.
#[derive(Component)]
pub struct GameOverRoot;

/// Tags any button that starts (or restarts) a round.
#[derive(Component)]
pub struct StartButton;

/// Tags the "Quit" button.
#[derive(Component)]
pub struct QuitButton;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GamePhase::Idle), setup_main_menu)
            .add_systems(OnExit(GamePhase::Idle), cleanup_main_menu)
            .add_systems(OnEnter(GamePhase::Paused), setup_stopped_overlay)
            .add_systems(OnExit(GamePhase::Paused), cleanup_stopped_overlay)
            .add_systems(OnEnter(GamePhase::Finished), setup_game_over)
            .add_systems(OnExit(GamePhase::Finished), cleanup_game_over)
            .add_systems(
                Update,
                menu_button_system.run_if(not(in_state(GamePhase::Running))),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn start_bg() -> Color {
    Color::srgb(0.08, 0.36, 0.14)
}
fn start_border() -> Color {
    Color::srgb(0.18, 0.72, 0.28)
}
fn start_text() -> Color {
    Color::srgb(0.75, 1.0, 0.80)
}
fn quit_bg() -> Color {
    Color::srgb(0.28, 0.06, 0.06)
}
fn quit_border() -> Color {
    Color::srgb(0.60, 0.12, 0.12)
}
fn quit_text() -> Color {
    Color::srgb(1.0, 0.65, 0.65)
}
fn title_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn subtitle_color() -> Color {
    Color::srgb(0.55, 0.55, 0.65)
}
fn hint_color() -> Color {
    Color::srgb(0.38, 0.38, 0.45)
}

/// Spawn a fixed-height invisible spacer node.
fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

/// Spawn a labelled menu button.
fn menu_button(
    parent: &mut ChildSpawnerCommands<'_>,
    label: &str,
    bg: Color,
    border: Color,
    text: Color,
    marker: impl Bundle,
) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(220.0),
                height: Val::Px(50.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(bg),
            BorderColor::all(border),
            marker,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(text),
            ));
        });
}

// ── Main menu ─────────────────────────────────────────────────────────────────

/// Spawn the full-screen main-menu splash.
pub fn setup_main_menu(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::BLACK),
            MainMenuRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("STACKER"),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
                TextColor(title_color()),
            ));

            spacer(root, 10.0);

            root.spawn((
                Text::new("Drop ingredients, build the tower"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(subtitle_color()),
            ));

            spacer(root, 52.0);
            menu_button(
                root,
                "START GAME",
                start_bg(),
                start_border(),
                start_text(),
                StartButton,
            );
            spacer(root, 14.0);
            menu_button(root, "QUIT", quit_bg(), quit_border(), quit_text(), QuitButton);
            spacer(root, 52.0);

            root.spawn((
                Text::new("Space to drop · Esc to stop"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(hint_color()),
            ));
        });
}

/// Recursively despawn all main-menu entities.
pub fn cleanup_main_menu(mut commands: Commands, query: Query<Entity, With<MainMenuRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Terminal overlays ─────────────────────────────────────────────────────────

/// Shared card layout for the two terminal overlays.
fn spawn_overlay(
    commands: &mut Commands,
    root_marker: impl Bundle,
    title: &str,
    title_color: Color,
    score_line: String,
) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.82)),
            ZIndex(300),
            root_marker,
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(40.0)),
                        row_gap: Val::Px(16.0),
                        border: UiRect::all(Val::Px(2.0)),
                        min_width: Val::Px(320.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.06, 0.02, 0.02)),
                    BorderColor::all(Color::srgb(0.55, 0.10, 0.10)),
                ))
                .with_children(|card| {
                    card.spawn((
                        Text::new(title),
                        TextFont {
                            font_size: 46.0,
                            ..default()
                        },
                        TextColor(title_color),
                    ));

                    card.spawn((
                        Text::new(score_line),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(subtitle_color()),
                    ));

                    menu_button(
                        card,
                        "PLAY AGAIN",
                        start_bg(),
                        start_border(),
                        start_text(),
                        StartButton,
                    );
                    menu_button(card, "QUIT", quit_bg(), quit_border(), quit_text(), QuitButton);

                    card.spawn((
                        Text::new("Press Enter to play again"),
                        TextFont {
                            font_size: 12.0,
                            ..default()
                        },
                        TextColor(hint_color()),
                    ));
                });
        });
}

/// Spawn the round-stopped overlay over the frozen world.
pub fn setup_stopped_overlay(mut commands: Commands, session: Res<GameSession>) {
    spawn_overlay(
        &mut commands,
        StoppedOverlayRoot,
        "ROUND STOPPED",
        Color::srgb(0.95, 0.80, 0.30),
        format!(
            "Score: {}   ({} drops landed)",
            session.authoritative_score(),
            session.drops_landed
        ),
    );
}

pub fn cleanup_stopped_overlay(
    mut commands: Commands,
    query: Query<Entity, With<StoppedOverlayRoot>>,
) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Spawn the game-over overlay showing the reported score.
pub fn setup_game_over(mut commands: Commands, session: Res<GameSession>) {
    spawn_overlay(
        &mut commands,
        GameOverRoot,
        "GAME OVER",
        Color::srgb(1.0, 0.22, 0.22),
        format!(
            "Score: {}   ({} drops landed)",
            session.authoritative_score(),
            session.drops_landed
        ),
    );
}

pub fn cleanup_game_over(mut commands: Commands, query: Query<Entity, With<GameOverRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Button interaction ────────────────────────────────────────────────────────

/// Handle Start / Play Again / Quit on whichever overlay is showing.
#[allow(clippy::type_complexity)]
pub fn menu_button_system(
    start_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<StartButton>)>,
    quit_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<QuitButton>)>,
    mut btn_text: Query<&mut TextColor>,
    mut new_game: MessageWriter<NewGameRequested>,
    mut exit: MessageWriter<bevy::app::AppExit>,
    keys: Res<ButtonInput<KeyCode>>,
) {
    let wants_start = keys.just_pressed(KeyCode::Enter)
        || start_query.iter().any(|(i, _)| *i == Interaction::Pressed);

    if wants_start {
        new_game.write(NewGameRequested);
        return;
    }

    for (interaction, children) in start_query.iter() {
        match interaction {
            Interaction::Hovered => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(Color::WHITE);
                    }
                }
            }
            Interaction::None => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(start_text());
                    }
                }
            }
            Interaction::Pressed => {}
        }
    }

    for (interaction, children) in quit_query.iter() {
        match interaction {
            Interaction::Pressed => {
                exit.write(bevy::app::AppExit::Success);
            }
            Interaction::Hovered => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(Color::WHITE);
                    }
                }
            }
            Interaction::None => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(quit_text());
                    }
                }
            }
        }
    }
}
