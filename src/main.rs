//! Application entry point: composes the Bevy runtime, window configuration
//! and the game plugin defined in `app.rs`.
//!
//! The game simulates a 256x200 screen; the window opens at a 3x scale and
//! the fixed-scaling camera letterboxes anything else. Nearest-neighbor
//! sampling keeps the pixel art crisp.

mod animation;
mod app;
mod assets;
mod audio;
mod background;
mod camera;
mod config;
mod enemies;
mod events;
mod geometry;
mod hud;
mod input;
mod items;
mod level;
mod particles;
mod player;
mod render;
mod state;
mod tiles;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod wasm;

use app::RetroPlatformerPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

use config::{SCREEN_HEIGHT, SCREEN_WIDTH};

fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    wasm::set_panic_hook();

    let primary_window = Window {
        title: "Retro Platformer".to_string(),
        resolution: WindowResolution::new(SCREEN_WIDTH as f32 * 3.0, SCREEN_HEIGHT as f32 * 3.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: SCREEN_WIDTH as f32,
            min_height: SCREEN_HEIGHT as f32,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    let mut default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest());

    #[cfg(not(target_arch = "wasm32"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(true),
            ..default()
        });
    }

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(false),
            ..default()
        });
    }

    App::new()
        // Sky blue clear color behind the parallax layers.
        .insert_resource(ClearColor(Color::srgb(0.38, 0.66, 0.99)))
        .add_plugins(default_plugins)
        .add_plugins(RetroPlatformerPlugin)
        .run();
}
