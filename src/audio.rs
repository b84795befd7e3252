//! Sound effect playback driven by gameplay events.
//!
//! Handles are loaded up front and kept alive in a resource; each gameplay
//! event spawns a one-shot `AudioBundle` that despawns itself when the clip
//! finishes. Missing audio files degrade to silence without touching the
//! simulation.

use bevy::prelude::*;

use crate::events::{BlockBroken, CoinCollected, PlayerJumped};
use crate::state::GameState;

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_systems(OnEnter(GameState::Loading), load_audio_handles)
            .add_systems(
                Update,
                play_effect_sounds.run_if(in_state(GameState::Playing)),
            );
    }
}

/// Cloneable pointers into Bevy's asset storage, one per sound effect.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub jump: Option<Handle<AudioSource>>,
    pub coin: Option<Handle<AudioSource>>,
    pub break_block: Option<Handle<AudioSource>>,
}

fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    handles.jump = Some(asset_server.load("audio/jump.ogg"));
    handles.coin = Some(asset_server.load("audio/coin.ogg"));
    handles.break_block = Some(asset_server.load("audio/break.ogg"));
}

fn play_one_shot(commands: &mut Commands, handle: &Option<Handle<AudioSource>>) {
    if let Some(source) = handle {
        commands.spawn(AudioBundle {
            source: source.clone(),
            settings: PlaybackSettings::DESPAWN,
        });
    }
}

fn play_effect_sounds(
    mut commands: Commands,
    handles: Res<AudioHandles>,
    mut jumps: EventReader<PlayerJumped>,
    mut coins: EventReader<CoinCollected>,
    mut breaks: EventReader<BlockBroken>,
) {
    if jumps.read().next().is_some() {
        play_one_shot(&mut commands, &handles.jump);
    }
    if coins.read().next().is_some() {
        play_one_shot(&mut commands, &handles.coin);
    }
    if breaks.read().next().is_some() {
        play_one_shot(&mut commands, &handles.break_block);
    }
}
