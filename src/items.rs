//! Power-up items. The only item kind is the mushroom: it falls under a
//! lighter gravity cap than entities, patrols horizontally, reverses on wall
//! contact and hops off blocks that bounce or break underneath it. The
//! player marks it used on contact and this module removes it on the next
//! item pass.

use bevy::prelude::*;

use crate::assets::SpriteSheets;
use crate::config::{apply_gravity, ITEM_MAX_FALL_SPEED, ITEM_SIZE};
use crate::events::ItemDispensed;
use crate::geometry::{Aabb, Facing};
use crate::level::LevelRoot;
use crate::render;
use crate::state::{GameSet, GameState};
use crate::tiles::{Tile, TileKind};

pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (spawn_dispensed_items, update_items)
                .chain()
                .in_set(GameSet::Items)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[derive(Component)]
pub struct Item {
    /// Set by the player on pickup; the item pass removes used items.
    pub used: bool,
    pub facing: Facing,
    pub vy: i32,
    pub speed: i32,
}

/// Spawns a mushroom walking right from the given top-left position.
pub fn spawn_mushroom(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    root: Entity,
    x: i32,
    y: i32,
) {
    commands
        .spawn((
            Item {
                used: false,
                facing: Facing::Right,
                vy: 0,
                speed: 1,
            },
            Aabb::new(x, y, ITEM_SIZE as u32, ITEM_SIZE as u32),
            SpriteBundle {
                texture: sheets.tiles_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_ITEMS)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.tiles_layout.clone(),
                index: sheets.regions.mushroom,
            },
        ))
        .set_parent(root);
}

/// Question blocks dispense through an event so the player pass never spawns
/// into the item collection itself. The mushroom appears one item-height
/// above the block.
fn spawn_dispensed_items(
    mut commands: Commands,
    mut events: EventReader<ItemDispensed>,
    sheets: Res<SpriteSheets>,
    root: Query<Entity, With<LevelRoot>>,
) {
    let Ok(root) = root.get_single() else {
        return;
    };
    for event in events.read() {
        spawn_mushroom(&mut commands, &sheets, root, event.x, event.y - ITEM_SIZE);
    }
}

fn update_items(
    mut commands: Commands,
    mut items: Query<(Entity, &mut Item, &mut Aabb)>,
    tiles: Query<(&Tile, &Aabb), Without<Item>>,
) {
    for (entity, mut item, mut aabb) in &mut items {
        if item.used {
            commands.entity(entity).despawn();
            continue;
        }

        apply_gravity(&mut item.vy, ITEM_MAX_FALL_SPEED);

        aabb.x += item.facing.step() * item.speed;
        resolve_horizontal(&mut *item, &mut *aabb, &tiles);

        aabb.y += item.vy;
        resolve_vertical(&mut *item, &mut *aabb, &tiles);
    }
}

/// Wall contact reverses the patrol direction.
fn resolve_horizontal(
    item: &mut Item,
    aabb: &mut Aabb,
    tiles: &Query<(&Tile, &Aabb), Without<Item>>,
) {
    for (_, tile_aabb) in tiles {
        if aabb.intersects(tile_aabb) {
            match item.facing {
                Facing::Left => aabb.set_left(tile_aabb.right()),
                Facing::Right => aabb.set_right(tile_aabb.left()),
            }
            item.facing = item.facing.flipped();
        }
    }
}

/// Landing on a block that is bouncing or breaking flings the item upward
/// and reverses it; otherwise vertical contact just snaps the rectangle.
fn resolve_vertical(
    item: &mut Item,
    aabb: &mut Aabb,
    tiles: &Query<(&Tile, &Aabb), Without<Item>>,
) {
    for (tile, tile_aabb) in tiles {
        if aabb.intersects(tile_aabb) {
            if item.vy > 0 {
                aabb.set_bottom(tile_aabb.top());
                if matches!(tile.kind, TileKind::Block { .. }) && (tile.broken || tile.bouncing) {
                    item.vy = -10;
                    item.facing = item.facing.flipped();
                }
            } else {
                aabb.set_top(tile_aabb.bottom());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_world() -> (World, Schedule) {
        let world = World::new();
        let mut schedule = Schedule::default();
        schedule.add_systems(update_items);
        (world, schedule)
    }

    fn spawn_loose_mushroom(world: &mut World, x: i32, y: i32, facing: Facing) -> Entity {
        world
            .spawn((
                Item {
                    used: false,
                    facing,
                    vy: 0,
                    speed: 1,
                },
                Aabb::new(x, y, ITEM_SIZE as u32, ITEM_SIZE as u32),
            ))
            .id()
    }

    #[test]
    fn fall_speed_stays_under_the_item_cap() {
        let (mut world, mut schedule) = scenario_world();
        let item = spawn_loose_mushroom(&mut world, 0, 0, Facing::Right);
        for _ in 0..10 {
            schedule.run(&mut world);
        }
        assert_eq!(world.get::<Item>(item).unwrap().vy, ITEM_MAX_FALL_SPEED);
    }

    #[test]
    fn wall_contact_reverses_the_patrol() {
        let (mut world, mut schedule) = scenario_world();
        let item = spawn_loose_mushroom(&mut world, 0, 0, Facing::Right);
        world.spawn((Tile::new(TileKind::Stair), Aabb::new(16, 0, 16, 16)));

        schedule.run(&mut world);
        let aabb = *world.get::<Aabb>(item).unwrap();
        // Snapped flush against the wall, walking back the other way.
        assert_eq!(aabb.right(), 16);
        assert_eq!(world.get::<Item>(item).unwrap().facing, Facing::Left);
    }

    #[test]
    fn bouncing_block_underneath_flings_the_item() {
        let (mut world, mut schedule) = scenario_world();
        let item = spawn_loose_mushroom(&mut world, 0, 144, Facing::Right);
        let mut block = Tile::new(TileKind::Block { breakable: true });
        block.bounce();
        world.spawn((block, Aabb::new(0, 160, 16, 16)));

        schedule.run(&mut world);
        let state = world.get::<Item>(item).unwrap();
        assert_eq!(state.vy, -10);
        assert_eq!(state.facing, Facing::Left);
        assert_eq!(world.get::<Aabb>(item).unwrap().bottom(), 160);
    }

    #[test]
    fn used_items_are_removed_on_the_next_pass() {
        let (mut world, mut schedule) = scenario_world();
        let item = spawn_loose_mushroom(&mut world, 0, 0, Facing::Right);
        world.get_mut::<Item>(item).unwrap().used = true;

        schedule.run(&mut world);
        assert!(world.get_entity(item).is_none());
    }
}
