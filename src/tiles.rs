//! Static level geometry and its hit reactions.
//!
//! Tiles are enum-tagged rather than type-dispatched: the head-hit switch
//! returns an exhaustive `HeadHit` value that the player converts into
//! events, so the compiler checks every tile/reaction pairing. A tile whose
//! `broken` flag is observed true during the tile pass is despawned on that
//! same tick and replaced by a debris burst.

use bevy::prelude::*;

use crate::assets::{Regions, SpriteSheets};
use crate::config::TICK_RATE;
use crate::events::BlockBroken;
use crate::geometry::Aabb;
use crate::render;
use crate::state::{GameSet, GameState};

/// Ticks a hit block stays displaced before returning to rest.
pub const BOUNCE_TICKS: u32 = (TICK_RATE / 3) as u32;

pub struct TilesPlugin;

impl Plugin for TilesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            update_tiles
                .in_set(GameSet::Level)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Which corner of a pipe a tile draws; collision is identical for all four.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeCorner {
    UpperLeft,
    UpperRight,
    LowerRight,
    LowerLeft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Floor,
    Block { breakable: bool },
    Question { used: bool },
    CoinBlock { coins: u32 },
    Stair,
    Pipe(PipeCorner),
    FlagPole,
    FlagTip,
    FinishFlag,
}

/// Outcome of the player hitting a tile from below.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadHit {
    /// Solid contact, nothing else happens.
    Blocked,
    /// Breakable block hit by the small player: bounces and returns.
    Bounced,
    /// Breakable block hit by the big player: destroyed.
    Broken,
    /// Question block dispenses its mushroom.
    Item,
    /// A coin (plus score) is awarded.
    Coin,
}

#[derive(Component)]
pub struct Tile {
    pub kind: TileKind,
    pub broken: bool,
    pub bouncing: bool,
    bounce_ticks: u32,
    /// Vertical draw displacement while bouncing; collision uses the real
    /// rectangle, only rendering is offset.
    pub bounce_offset: i32,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            broken: false,
            bouncing: false,
            bounce_ticks: 0,
            bounce_offset: 0,
        }
    }

    /// Flag-pole pieces redirect horizontal contact into the level-finish
    /// sequence instead of blocking movement.
    pub fn is_pole_piece(&self) -> bool {
        matches!(self.kind, TileKind::FlagPole | TileKind::FlagTip)
    }

    /// Finish decorations never take part in vertical collision.
    pub fn is_finish_piece(&self) -> bool {
        matches!(
            self.kind,
            TileKind::FlagPole | TileKind::FlagTip | TileKind::FinishFlag
        )
    }

    pub fn bounce(&mut self) {
        self.bouncing = true;
    }

    pub fn destroy(&mut self) {
        self.broken = true;
    }

    /// Resolves an underside hit. Mutates the tile's own state (single-use
    /// latch, coin count, bounce/break) and reports what the player should
    /// make of it.
    pub fn head_hit(&mut self, player_is_big: bool) -> HeadHit {
        match &mut self.kind {
            TileKind::Block { breakable } => {
                if !*breakable {
                    HeadHit::Blocked
                } else if player_is_big {
                    self.destroy();
                    HeadHit::Broken
                } else {
                    self.bounce();
                    HeadHit::Bounced
                }
            }
            TileKind::Question { used } => {
                if *used {
                    HeadHit::Blocked
                } else {
                    *used = true;
                    if player_is_big {
                        // The mushroom would be redundant; pay out directly.
                        HeadHit::Coin
                    } else {
                        HeadHit::Item
                    }
                }
            }
            TileKind::CoinBlock { coins } => {
                if *coins > 0 {
                    *coins -= 1;
                    HeadHit::Coin
                } else {
                    HeadHit::Blocked
                }
            }
            _ => HeadHit::Blocked,
        }
    }

    /// Advances the bounce displacement one tick and snaps the block back to
    /// rest once the bounce duration has elapsed.
    pub fn step_bounce(&mut self) {
        if !self.bouncing {
            return;
        }
        if self.bounce_ticks >= BOUNCE_TICKS {
            self.bounce_offset = 0;
            self.bouncing = false;
            self.bounce_ticks = 0;
        } else {
            self.bounce_offset -= 1;
            self.bounce_ticks += 1;
        }
    }
}

/// Atlas region a tile shows at spawn time; state-dependent swaps (used
/// question block, emptied coin block) happen in the render sync.
pub fn base_region(kind: TileKind, regions: &Regions) -> usize {
    match kind {
        TileKind::Floor => regions.floor,
        TileKind::Block { .. } => regions.block,
        TileKind::Question { .. } => regions.question[0],
        TileKind::CoinBlock { .. } => regions.block,
        TileKind::Stair => regions.stair,
        TileKind::Pipe(PipeCorner::UpperLeft) => regions.pipe_upper_left,
        TileKind::Pipe(PipeCorner::UpperRight) => regions.pipe_upper_right,
        TileKind::Pipe(PipeCorner::LowerRight) => regions.pipe_lower_right,
        TileKind::Pipe(PipeCorner::LowerLeft) => regions.pipe_lower_left,
        TileKind::FlagPole => regions.flag_pole,
        TileKind::FlagTip => regions.flag_tip,
        TileKind::FinishFlag => regions.finish_flag,
    }
}

/// Spawns one tile entity as a child of the level root.
pub fn spawn_tile(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    root: Entity,
    kind: TileKind,
    x: i32,
    y: i32,
) {
    commands
        .spawn((
            Tile::new(kind),
            Aabb::new(x, y, 16, 16),
            SpriteBundle {
                texture: sheets.tiles_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_TILES)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.tiles_layout.clone(),
                index: base_region(kind, &sheets.regions),
            },
        ))
        .set_parent(root);
}

/// Steps bounce displacements and removes tiles marked broken, announcing
/// each removal so the debris burst and sound can follow.
fn update_tiles(
    mut commands: Commands,
    mut tiles: Query<(Entity, &mut Tile, &Aabb)>,
    mut broken: EventWriter<BlockBroken>,
) {
    for (entity, mut tile, aabb) in &mut tiles {
        tile.step_bounce();
        if tile.broken {
            broken.send(BlockBroken {
                x: aabb.x,
                y: aabb.y,
            });
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_block_yields_exactly_n_coins() {
        let mut tile = Tile::new(TileKind::CoinBlock { coins: 3 });
        let mut payouts = 0;
        for _ in 0..10 {
            if tile.head_hit(false) == HeadHit::Coin {
                payouts += 1;
            }
        }
        assert_eq!(payouts, 3);
        // Permanently inert afterwards, for either player size.
        assert_eq!(tile.head_hit(true), HeadHit::Blocked);
    }

    #[test]
    fn question_block_is_single_use() {
        let mut tile = Tile::new(TileKind::Question { used: false });
        assert_eq!(tile.head_hit(false), HeadHit::Item);
        assert_eq!(tile.head_hit(false), HeadHit::Blocked);
        assert_eq!(tile.head_hit(true), HeadHit::Blocked);
    }

    #[test]
    fn question_block_pays_coin_to_big_player() {
        let mut tile = Tile::new(TileKind::Question { used: false });
        assert_eq!(tile.head_hit(true), HeadHit::Coin);
        assert_eq!(tile.head_hit(true), HeadHit::Blocked);
    }

    #[test]
    fn breakable_block_bounces_for_small_and_breaks_for_big() {
        let mut tile = Tile::new(TileKind::Block { breakable: true });
        assert_eq!(tile.head_hit(false), HeadHit::Bounced);
        assert!(tile.bouncing);
        assert!(!tile.broken);

        let mut tile = Tile::new(TileKind::Block { breakable: true });
        assert_eq!(tile.head_hit(true), HeadHit::Broken);
        assert!(tile.broken);
    }

    #[test]
    fn solid_block_never_reacts() {
        let mut tile = Tile::new(TileKind::Block { breakable: false });
        assert_eq!(tile.head_hit(true), HeadHit::Blocked);
        assert!(!tile.broken && !tile.bouncing);
    }

    #[test]
    fn bounce_returns_to_rest_after_duration() {
        let mut tile = Tile::new(TileKind::Block { breakable: true });
        tile.bounce();
        for _ in 0..BOUNCE_TICKS {
            tile.step_bounce();
        }
        assert!(tile.bouncing);
        assert!(tile.bounce_offset < 0);

        // The tick after the bounce window restores the rest position.
        tile.step_bounce();
        assert!(!tile.bouncing);
        assert_eq!(tile.bounce_offset, 0);
    }

    #[test]
    fn broken_tiles_are_removed_and_announced() {
        let mut world = World::new();
        world.init_resource::<Events<BlockBroken>>();
        let mut breaking = Tile::new(TileKind::Block { breakable: true });
        breaking.destroy();
        let doomed = world.spawn((breaking, Aabb::new(32, 48, 16, 16))).id();
        let intact = world
            .spawn((Tile::new(TileKind::Floor), Aabb::new(0, 48, 16, 16)))
            .id();
        let mut schedule = Schedule::default();
        schedule.add_systems(update_tiles);

        schedule.run(&mut world);
        assert!(world.get_entity(doomed).is_none());
        assert!(world.get_entity(intact).is_some());
        let removals: Vec<BlockBroken> = world
            .resource_mut::<Events<BlockBroken>>()
            .drain()
            .collect();
        assert_eq!(removals.len(), 1);
        assert_eq!((removals[0].x, removals[0].y), (32, 48));
    }
}
