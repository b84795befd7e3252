//! Keyboard snapshot for the fixed-step simulation.
//!
//! Gameplay systems never touch `ButtonInput<KeyCode>` directly: a snapshot
//! system samples the small fixed set of boolean key states once per tick and
//! publishes them as a resource. This keeps the simulation deterministic with
//! respect to its inputs and makes player logic trivially testable by
//! inserting a hand-built `InputState`.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::state::{GameSet, GameState};

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputState>().add_systems(
            FixedUpdate,
            snapshot_input
                .in_set(GameSet::Input)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Boolean key states polled once per tick. No event queue is consumed by
/// the simulation; held keys simply read as `true` every tick.
///
/// There is deliberately no action/run button: nothing in the game consumes
/// one (no run modifier, no projectile), so the snapshot carries exactly the
/// four states gameplay reads.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub down: bool,
}

fn snapshot_input(keyboard: Res<ButtonInput<KeyCode>>, mut input: ResMut<InputState>) {
    input.left = keyboard.pressed(KeyCode::ArrowLeft) || keyboard.pressed(KeyCode::KeyA);
    input.right = keyboard.pressed(KeyCode::ArrowRight) || keyboard.pressed(KeyCode::KeyD);
    input.jump = keyboard.pressed(KeyCode::ArrowUp) || keyboard.pressed(KeyCode::Space);
    input.down = keyboard.pressed(KeyCode::ArrowDown) || keyboard.pressed(KeyCode::KeyS);
}
