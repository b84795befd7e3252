//! Global game state definitions. States are stored by Bevy in a stack; switching states simply
//! updates an enum value and triggers on-enter/on-exit schedules.

use bevy::app::AppExit;
use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

/// High-level state machine for the game loop. `Loading` waits for the sprite
/// sheets, `Playing` runs the fixed-step simulation, and `GameOver` is the
/// terminal state entered when the last life is lost or the level has been
/// won and its timer drained.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    GameOver,
}

/// Named system sets fixing the per-tick update order inside `FixedUpdate`:
/// input snapshot, player physics and collisions, camera focus, enemies,
/// items, then level bookkeeping (timer, spawning, pruning, resets).
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Player,
    Camera,
    Enemies,
    Items,
    Level,
}

/// Running out of lives is a terminal state transition, not an error; the
/// host frame loop is stopped by the user pressing `ESC` on the game-over
/// screen. This is the only exit path.
pub fn exit_after_game_over(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut exit: EventWriter<AppExit>,
) {
    if *state.get() == GameState::GameOver && keyboard.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}
