//! Sprite-sheet plumbing: image handles, atlas layouts and the named region
//! table.
//!
//! Three images back the whole game: a tile sheet (level geometry, items,
//! particles), an actor sheet (player and enemies) and a parallax background.
//! The region table is built once by carving sub-rectangles out of two
//! `TextureAtlasLayout`s; gameplay code refers to regions by field name and
//! never touches pixel coordinates. The `Loading` state watches the image
//! loads and enters `Playing` either way, warning when a sheet is missing so
//! the simulation still runs with blank sprites.

use bevy::asset::LoadState;
use bevy::math::URect;
use bevy::prelude::*;

use crate::state::GameState;

pub struct GameAssetsPlugin;

impl Plugin for GameAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_sheets)
            .add_systems(
                Update,
                monitor_sheet_loading.run_if(in_state(GameState::Loading)),
            );
    }
}

/// Handles plus the named region table. Cloning handles is cheap; the atlas
/// layouts live in `Assets<TextureAtlasLayout>` and are shared by every
/// sprite spawned from a sheet.
#[derive(Resource)]
pub struct SpriteSheets {
    pub tiles_image: Handle<Image>,
    pub tiles_layout: Handle<TextureAtlasLayout>,
    pub actors_image: Handle<Image>,
    pub actors_layout: Handle<TextureAtlasLayout>,
    pub background_image: Handle<Image>,
    pub regions: Regions,
}

/// Atlas indices for every named sub-image, split by sheet.
///
/// Coordinates follow the sheet artwork: the tile sheet packs level
/// geometry and effect sprites, the actor sheet packs the small/big player
/// rows and the enemy rows.
pub struct Regions {
    // Tile sheet.
    pub question: [usize; 5],
    pub used_block: usize,
    pub block: usize,
    pub floor: usize,
    pub stair: usize,
    pub pipe_upper_left: usize,
    pub pipe_upper_right: usize,
    pub pipe_lower_right: usize,
    pub pipe_lower_left: usize,
    pub mushroom: usize,
    pub debris: usize,
    pub coin: [usize; 3],
    pub firework: [usize; 3],
    pub castle: usize,
    pub banner: usize,
    pub flag_tip: usize,
    pub flag_pole: usize,
    pub finish_flag: usize,

    // Actor sheet.
    pub goomba_walk: [usize; 2],
    pub goomba_dead: usize,
    pub koopa_walk: [usize; 2],
    pub koopa_shell: usize,
    pub small_stand: usize,
    pub small_walk: [usize; 3],
    pub small_turn: usize,
    pub small_jump: usize,
    pub small_dead: usize,
    pub small_grab: [usize; 2],
    pub big_stand: usize,
    pub big_walk: [usize; 3],
    pub big_turn: usize,
    pub big_jump: usize,
    pub big_crouch: usize,
    pub big_grab: [usize; 2],
    pub grow: [usize; 10],
}

fn region(layout: &mut TextureAtlasLayout, x: u32, y: u32, w: u32, h: u32) -> usize {
    layout.add_texture(URect::new(x, y, x + w, y + h))
}

impl Regions {
    fn build(tiles: &mut TextureAtlasLayout, actors: &mut TextureAtlasLayout) -> Self {
        Self {
            question: core::array::from_fn(|i| region(tiles, i as u32 * 16, 0, 16, 16)),
            used_block: region(tiles, 80, 0, 16, 16),
            block: region(tiles, 0, 16, 16, 16),
            floor: region(tiles, 32, 16, 16, 16),
            stair: region(tiles, 48, 16, 16, 16),
            pipe_upper_left: region(tiles, 0, 32, 16, 16),
            pipe_upper_right: region(tiles, 16, 32, 16, 16),
            pipe_lower_right: region(tiles, 16, 48, 16, 16),
            pipe_lower_left: region(tiles, 0, 48, 16, 16),
            mushroom: region(tiles, 48, 32, 16, 16),
            debris: region(tiles, 80, 24, 8, 8),
            coin: core::array::from_fn(|i| region(tiles, i as u32 * 8, 144, 8, 16)),
            firework: core::array::from_fn(|i| region(tiles, 32 + i as u32 * 16, 144, 16, 16)),
            castle: region(tiles, 0, 64, 80, 80),
            banner: region(tiles, 80, 80, 16, 16),
            flag_tip: region(tiles, 80, 112, 16, 16),
            flag_pole: region(tiles, 80, 128, 16, 16),
            finish_flag: region(tiles, 80, 96, 16, 16),

            goomba_walk: core::array::from_fn(|i| region(actors, i as u32 * 16, 0, 16, 16)),
            goomba_dead: region(actors, 32, 0, 16, 16),
            koopa_walk: core::array::from_fn(|i| region(actors, i as u32 * 16, 16, 16, 24)),
            koopa_shell: region(actors, 32, 24, 16, 16),
            small_stand: region(actors, 0, 40, 16, 16),
            small_walk: core::array::from_fn(|i| region(actors, 16 + i as u32 * 16, 40, 16, 16)),
            small_turn: region(actors, 64, 40, 16, 16),
            small_jump: region(actors, 80, 40, 16, 16),
            small_dead: region(actors, 96, 40, 16, 16),
            small_grab: core::array::from_fn(|i| region(actors, 112 + i as u32 * 16, 40, 16, 16)),
            big_stand: region(actors, 0, 56, 16, 32),
            big_walk: core::array::from_fn(|i| region(actors, 16 + i as u32 * 16, 56, 16, 32)),
            big_turn: region(actors, 64, 56, 16, 32),
            big_jump: region(actors, 80, 56, 16, 32),
            big_crouch: region(actors, 96, 56, 16, 32),
            big_grab: core::array::from_fn(|i| region(actors, 112 + i as u32 * 16, 56, 16, 32)),
            grow: core::array::from_fn(|i| region(actors, i as u32 * 16, 88, 16, 32)),
        }
    }
}

impl SpriteSheets {
    /// Sheets with default handles and a real region table, for tests that
    /// exercise gameplay logic without an asset server.
    #[cfg(test)]
    pub fn placeholder() -> Self {
        let mut tiles = TextureAtlasLayout::new_empty(UVec2::new(256, 256));
        let mut actors = TextureAtlasLayout::new_empty(UVec2::new(256, 128));
        let regions = Regions::build(&mut tiles, &mut actors);
        Self {
            tiles_image: Handle::default(),
            tiles_layout: Handle::default(),
            actors_image: Handle::default(),
            actors_layout: Handle::default(),
            background_image: Handle::default(),
            regions,
        }
    }
}

fn load_sheets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
) {
    let mut tiles = TextureAtlasLayout::new_empty(UVec2::new(256, 256));
    let mut actors = TextureAtlasLayout::new_empty(UVec2::new(256, 128));
    let regions = Regions::build(&mut tiles, &mut actors);

    commands.insert_resource(SpriteSheets {
        tiles_image: asset_server.load("textures/tiles.png"),
        tiles_layout: layouts.add(tiles),
        actors_image: asset_server.load("textures/actors.png"),
        actors_layout: layouts.add(actors),
        background_image: asset_server.load("textures/background.png"),
        regions,
    });
}

/// Waits until every sheet has finished loading, then starts the game. A
/// failed load logs a warning and the game starts anyway; sprites referencing
/// the missing sheet simply render blank.
fn monitor_sheet_loading(
    asset_server: Res<AssetServer>,
    sheets: Res<SpriteSheets>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let handles = [
        &sheets.tiles_image,
        &sheets.actors_image,
        &sheets.background_image,
    ];

    let mut all_settled = true;
    for handle in handles {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {}
            Some(LoadState::Failed(_)) => {
                warn!(
                    "Sprite sheet {:?} failed to load; continuing with blank sprites.",
                    handle.path()
                );
            }
            _ => all_settled = false,
        }
    }

    if all_settled {
        next_state.set(GameState::Playing);
    }
}
