//! High-level plugin composition.
//!
//! The `RetroPlatformerPlugin` glues together all domain-specific plugins
//! (assets, tiles, player, enemies, items, level orchestration, rendering,
//! HUD, audio) and pins down the fixed-update ordering. The simulation runs
//! at the classic 30 ticks per second; each gameplay stage runs as one
//! chained set so the tick always resolves input, then the player, then the
//! camera, enemies, items and finally the level bookkeeping.

use bevy::prelude::*;

use crate::assets::GameAssetsPlugin;
use crate::audio::GameAudioPlugin;
use crate::background::BackgroundPlugin;
use crate::camera::CameraPlugin;
use crate::config::TICK_RATE;
use crate::enemies::EnemiesPlugin;
use crate::events::GameEventsPlugin;
use crate::hud::HudPlugin;
use crate::input::InputPlugin;
use crate::items::ItemsPlugin;
use crate::level::LevelPlugin;
use crate::particles::ParticlesPlugin;
use crate::player::PlayerPlugin;
use crate::render::RenderPlugin;
use crate::state::{exit_after_game_over, GameSet, GameState};
use crate::tiles::TilesPlugin;

pub struct RetroPlatformerPlugin;

impl Plugin for RetroPlatformerPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .insert_resource(Time::<Fixed>::from_hz(TICK_RATE as f64))
            .add_plugins((
                GameEventsPlugin,
                GameAssetsPlugin,
                InputPlugin,
                TilesPlugin,
                ParticlesPlugin,
                ItemsPlugin,
                EnemiesPlugin,
                PlayerPlugin,
                CameraPlugin,
                BackgroundPlugin,
                LevelPlugin,
            ))
            .add_plugins((RenderPlugin, HudPlugin, GameAudioPlugin))
            .configure_sets(
                FixedUpdate,
                (
                    GameSet::Input,
                    GameSet::Player,
                    GameSet::Camera,
                    GameSet::Enemies,
                    GameSet::Items,
                    GameSet::Level,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, exit_after_game_over);
    }
}
