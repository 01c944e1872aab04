//! HUD: the permanent score / lives / tower-height overlay.

use crate::config::GameConfig;
use crate::session::GameSession;
use bevy::prelude::*;

/// Marker for the permanent HUD text node.
#[derive(Component)]
pub struct HudDisplay;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
            .add_systems(Update, hud_display_system);
    }
}

/// Spawn the fixed top-left HUD node.
fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Text::new("Score: 0   Lives: 3   Height: 0.0"),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(Color::srgb(0.92, 0.92, 0.85)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(14.0),
            ..default()
        },
        HudDisplay,
    ));
    eprintln!("[SETUP] HUD spawned");
}

/// Refresh the HUD text from the live session.
fn hud_display_system(
    session: Res<GameSession>,
    config: Res<GameConfig>,
    mut q_text: Query<&mut Text, With<HudDisplay>>,
) {
    if !session.is_changed() {
        return;
    }
    let Ok(mut text) = q_text.single_mut() else {
        return;
    };
    let lives = session.lives.max(0);
    let height = config.base_center_y + config.base_half_height + session.tower_offset;
    *text = Text::new(format!(
        "Score: {}   Lives: {}   Height: {:.1}",
        session.score, lives, height
    ));
}
