//! HUD bar and game-over overlay.
//!
//! The HUD shows the score under the player name on the left, then the coin
//! counter, the countdown and the remaining lives. UI entities
//! live in Bevy's UI world and are rendered above the game camera output.

use bevy::prelude::*;

use crate::level::LevelSession;
use crate::player::Player;
use crate::state::GameState;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_hud)
            .add_systems(
                Update,
                update_hud.run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::GameOver), spawn_game_over_overlay);
    }
}

#[derive(Component)]
struct ScoreLabel;

#[derive(Component)]
struct CoinLabel;

#[derive(Component)]
struct TimeLabel;

#[derive(Component)]
struct LivesLabel;

fn hud_text(value: impl Into<String>) -> TextBundle {
    TextBundle::from_section(
        value.into(),
        TextStyle {
            font_size: 18.0,
            color: Color::WHITE,
            ..default()
        },
    )
}

/// Spawns the top HUD bar with one labelled column per counter.
fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Name::new("Hud"),
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    justify_content: JustifyContent::SpaceBetween,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn(NodeBundle {
                    style: Style {
                        flex_direction: FlexDirection::Column,
                        ..default()
                    },
                    ..default()
                })
                .with_children(|column| {
                    column.spawn(hud_text("MARIO"));
                    column.spawn((ScoreLabel, hud_text("0")));
                });
            parent.spawn((CoinLabel, hud_text("x0")));
            parent.spawn((TimeLabel, hud_text("TIME:500")));
            parent.spawn((LivesLabel, hud_text("LIVES:5")));
        });
}

fn update_hud(
    session: Res<LevelSession>,
    players: Query<&Player>,
    mut labels: ParamSet<(
        Query<&mut Text, With<ScoreLabel>>,
        Query<&mut Text, With<CoinLabel>>,
        Query<&mut Text, With<TimeLabel>>,
        Query<&mut Text, With<LivesLabel>>,
    )>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    if let Ok(mut text) = labels.p0().get_single_mut() {
        text.sections[0].value = player.score.to_string();
    }
    if let Ok(mut text) = labels.p1().get_single_mut() {
        text.sections[0].value = format!("x{}", player.coins);
    }
    if let Ok(mut text) = labels.p2().get_single_mut() {
        text.sections[0].value = format!("TIME:{}", session.time);
    }
    if let Ok(mut text) = labels.p3().get_single_mut() {
        text.sections[0].value = format!("LIVES:{}", session.lives);
    }
}

/// Full-screen overlay shown when the run ends, win or lose.
fn spawn_game_over_overlay(mut commands: Commands) {
    commands
        .spawn((
            Name::new("GameOver"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "GAME OVER\nPress ESC to exit",
                TextStyle {
                    font_size: 36.0,
                    color: Color::srgba(0.9, 0.9, 0.9, 1.0),
                    ..default()
                },
            ));
        });
}
