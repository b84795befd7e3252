//! Mirrors the integer, y-down simulation into Bevy's y-up float transforms.
//!
//! Gameplay systems only ever touch `Aabb` rectangles and animation state;
//! every visual consequence (position, atlas frame, flipping, blinking,
//! bounce displacement) is applied here once per frame. Draw order is fixed
//! through z layers: background behind tiles, castle behind the player,
//! enemies and items above the player, particles on top.

use bevy::prelude::*;

use crate::enemies::{Enemy, EnemyKind};
use crate::geometry::{Aabb, Facing};
use crate::level::LevelSession;
use crate::particles::Particle;
use crate::player::Player;
use crate::state::GameState;
use crate::tiles::{Tile, TileKind};

pub const Z_BACKGROUND: f32 = 0.0;
pub const Z_TILES: f32 = 1.0;
pub const Z_CASTLE: f32 = 2.0;
pub const Z_PLAYER: f32 = 3.0;
pub const Z_ENEMIES: f32 = 4.0;
pub const Z_ITEMS: f32 = 5.0;
pub const Z_PARTICLES: f32 = 6.0;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                sync_transforms,
                sync_player_sprite,
                sync_enemy_sprites,
                sync_tile_sprites,
                sync_particle_sprites,
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Positions every rectangle-backed entity. The simulation's y axis grows
/// downward, so the world y is negated here and nowhere else.
fn sync_transforms(
    mut entities: Query<(
        &Aabb,
        &mut Transform,
        Option<&Tile>,
        Option<&Enemy>,
    )>,
) {
    for (aabb, mut transform, tile, enemy) in &mut entities {
        let mut draw_y = aabb.center_y();
        if let Some(tile) = tile {
            draw_y += tile.bounce_offset;
        }
        if let Some(enemy) = enemy {
            if enemy.hidden_in_shell() {
                // The 16px shell sits at the bottom of the 24px koopa box.
                draw_y += 4;
            }
        }
        transform.translation.x = aabb.center_x() as f32;
        transform.translation.y = -(draw_y as f32);
    }
}

fn sync_player_sprite(
    session: Res<LevelSession>,
    mut players: Query<(&Player, &mut Sprite, &mut TextureAtlas, &mut Visibility)>,
) {
    let Ok((player, mut sprite, mut atlas, mut visibility)) = players.get_single_mut() else {
        return;
    };
    if let Some(index) = player.animation.current() {
        atlas.index = index;
    }
    sprite.flip_x = player.facing == Facing::Left;

    // Invulnerability blinks by skipping every other frame; entering the
    // castle hides the avatar for good.
    *visibility = if player.inside_castle || (player.invulnerable && session.tick % 2 == 1) {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
}

fn sync_enemy_sprites(mut enemies: Query<(&Enemy, &mut Sprite, &mut TextureAtlas)>) {
    for (enemy, mut sprite, mut atlas) in &mut enemies {
        if let Some(index) = enemy.animation.current() {
            atlas.index = index;
        }
        // The koopa art faces left; the goomba is symmetric.
        sprite.flip_x = matches!(enemy.kind, EnemyKind::Koopa { .. })
            && enemy.facing == Facing::Right
            && !enemy.hidden_in_shell();
    }
}

/// State-dependent tile frames: the question block shimmers until used, and
/// blocks that have paid out all their coins show the spent face.
fn sync_tile_sprites(
    session: Res<LevelSession>,
    sheets: Res<crate::assets::SpriteSheets>,
    mut tiles: Query<(&Tile, &mut TextureAtlas)>,
) {
    let regions = &sheets.regions;
    for (tile, mut atlas) in &mut tiles {
        match tile.kind {
            TileKind::Question { used } => {
                atlas.index = if used {
                    regions.used_block
                } else {
                    regions.question[(session.tick / 8) as usize % regions.question.len()]
                };
            }
            TileKind::CoinBlock { coins } => {
                atlas.index = if coins == 0 {
                    regions.used_block
                } else {
                    regions.block
                };
            }
            _ => {}
        }
    }
}

fn sync_particle_sprites(mut particles: Query<(&Particle, &mut TextureAtlas)>) {
    for (particle, mut atlas) in &mut particles {
        if let Some(index) = particle.animation.current() {
            atlas.index = index;
        }
    }
}
