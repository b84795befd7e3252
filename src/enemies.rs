//! Enemy behaviour: goombas and koopa troopas.
//!
//! Both kinds live in one enum-tagged component updated by a single system,
//! so the per-kind dispatch is an exhaustive match instead of a class
//! hierarchy. Cross-enemy interaction (a moving shell killing goombas) is
//! resolved by collecting shell rectangles first and applying hits in a
//! second pass, which avoids aliased mutable access to the enemy list.

use bevy::prelude::*;

use crate::animation::Animation;
use crate::assets::{Regions, SpriteSheets};
use crate::config::{apply_gravity, EnemySettings, DESPAWN_DISTANCE, MAX_FALL_SPEED, SCREEN_HEIGHT, TICK_RATE};
use crate::geometry::{Aabb, Facing};
use crate::player::{normal_play, Player};
use crate::render;
use crate::state::{GameSet, GameState};
use crate::tiles::{Tile, TileKind};

pub struct EnemiesPlugin;

impl Plugin for EnemiesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemySettings>().add_systems(
            FixedUpdate,
            (update_enemies, shell_kills, prune_enemies)
                .chain()
                .in_set(GameSet::Enemies)
                .run_if(in_state(GameState::Playing))
                .run_if(normal_play),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Goomba,
    Koopa {
        in_shell: bool,
        shell_moving: bool,
        /// Center of the patrol band the koopa walks while on foot.
        spawn_x: i32,
    },
}

#[derive(Component)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub facing: Facing,
    pub dead: bool,
    pub vx: i32,
    pub vy: i32,
    pub speed: i32,
    pub animation: Animation,
}

impl Enemy {
    /// Whether touching this enemy hurts the player right now. A koopa shell
    /// only stops being dangerous while it sits completely still.
    pub fn does_damage(&self) -> bool {
        match self.kind {
            EnemyKind::Goomba => !self.dead,
            EnemyKind::Koopa { in_shell, .. } => {
                if in_shell {
                    self.vx != 0 || self.vy != 0
                } else {
                    true
                }
            }
        }
    }

    pub fn hidden_in_shell(&self) -> bool {
        matches!(self.kind, EnemyKind::Koopa { in_shell: true, .. })
    }

    /// Applies one hit (stomp, shell touch or kick). `hit_from` is the
    /// direction the hitter was facing and becomes the travel direction of a
    /// kicked shell.
    pub fn hit(&mut self, hit_from: Facing, regions: &Regions) {
        match &mut self.kind {
            EnemyKind::Goomba => {
                self.animation.set_frames(vec![regions.goomba_dead]);
                self.dead = true;
            }
            EnemyKind::Koopa {
                in_shell,
                shell_moving,
                ..
            } => {
                if *in_shell {
                    *shell_moving = !*shell_moving;
                    self.facing = hit_from;
                } else {
                    // First hit tucks the koopa into its shell. The rectangle
                    // keeps its walking height so stacked koopas cannot slip
                    // into each other's space.
                    *in_shell = true;
                    self.vx = 0;
                    self.animation.set_frames(vec![regions.koopa_shell]);
                }
            }
        }
    }
}

pub fn spawn_goomba(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    settings: &EnemySettings,
    root: Entity,
    x: i32,
    y: i32,
) {
    let animation = Animation::new(sheets.regions.goomba_walk.to_vec(), (TICK_RATE / 2) as u32);
    spawn_enemy(
        commands,
        sheets,
        root,
        Enemy {
            kind: EnemyKind::Goomba,
            facing: Facing::Left,
            dead: false,
            vx: 0,
            vy: 0,
            speed: settings.goomba_speed,
            animation,
        },
        Aabb::new(x, y, 16, 16),
    );
}

pub fn spawn_koopa(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    settings: &EnemySettings,
    root: Entity,
    x: i32,
    y: i32,
) {
    let animation = Animation::new(sheets.regions.koopa_walk.to_vec(), (TICK_RATE / 2) as u32);
    spawn_enemy(
        commands,
        sheets,
        root,
        Enemy {
            kind: EnemyKind::Koopa {
                in_shell: false,
                shell_moving: false,
                spawn_x: x,
            },
            facing: Facing::Left,
            dead: false,
            vx: 0,
            vy: 0,
            speed: settings.koopa_speed,
            animation,
        },
        Aabb::new(x, y, 16, 24),
    );
}

fn spawn_enemy(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    root: Entity,
    enemy: Enemy,
    aabb: Aabb,
) {
    let index = enemy.animation.current().unwrap_or_default();
    commands
        .spawn((
            enemy,
            aabb,
            SpriteBundle {
                texture: sheets.actors_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_ENEMIES)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.actors_layout.clone(),
                index,
            },
        ))
        .set_parent(root);
}

pub(crate) fn update_enemies(
    settings: Res<EnemySettings>,
    mut enemies: Query<(&mut Enemy, &mut Aabb)>,
    mut tiles: Query<(&mut Tile, &Aabb), Without<Enemy>>,
) {
    for (mut enemy, mut aabb) in &mut enemies {
        // Falling into a pit kills outright; the removal happens in the
        // prune pass once the current pose has been shown.
        if aabb.y > SCREEN_HEIGHT {
            enemy.dead = true;
        }

        enemy.animation.tick();

        match enemy.kind {
            EnemyKind::Goomba => {
                // A dying goomba holds still through its death pose.
                if enemy.dead {
                    continue;
                }
                apply_gravity(&mut enemy.vy, MAX_FALL_SPEED);
                enemy.vx = enemy.facing.step() * enemy.speed;

                aabb.x += enemy.vx;
                walker_horizontal(&mut *enemy, &mut *aabb, &mut tiles, false);

                aabb.y += enemy.vy;
                goomba_vertical(&mut *enemy, &mut *aabb, &tiles);
            }
            EnemyKind::Koopa {
                in_shell,
                shell_moving,
                spawn_x,
            } => {
                apply_gravity(&mut enemy.vy, MAX_FALL_SPEED);

                if !in_shell {
                    // Walk a fixed band around the spawn point.
                    if (spawn_x - aabb.x).abs() > settings.koopa_walk_area {
                        enemy.facing = enemy.facing.flipped();
                    }
                    enemy.vx = enemy.facing.step() * enemy.speed;
                } else if shell_moving {
                    enemy.vx = enemy.facing.step() * settings.shell_speed;
                } else {
                    enemy.vx = 0;
                }

                let breaks_blocks = in_shell && shell_moving;
                aabb.x += enemy.vx;
                walker_horizontal(&mut *enemy, &mut *aabb, &mut tiles, breaks_blocks);

                aabb.y += enemy.vy;
                koopa_vertical(&mut *enemy, &mut *aabb, &tiles);
            }
        }
    }
}

/// Wall contact snaps the walker out of the tile and reverses it. A moving
/// shell additionally destroys breakable blocks it rams.
fn walker_horizontal(
    enemy: &mut Enemy,
    aabb: &mut Aabb,
    tiles: &mut Query<(&mut Tile, &Aabb), Without<Enemy>>,
    breaks_blocks: bool,
) {
    for (mut tile, tile_aabb) in tiles {
        if aabb.intersects(tile_aabb) {
            match enemy.facing {
                Facing::Left => aabb.set_left(tile_aabb.right()),
                Facing::Right => aabb.set_right(tile_aabb.left()),
            }
            enemy.facing = enemy.facing.flipped();

            if breaks_blocks && matches!(tile.kind, TileKind::Block { breakable: true }) {
                tile.destroy();
            }
        }
    }
}

fn goomba_vertical(
    enemy: &mut Enemy,
    aabb: &mut Aabb,
    tiles: &Query<(&mut Tile, &Aabb), Without<Enemy>>,
) {
    for (tile, tile_aabb) in tiles.iter() {
        if aabb.intersects(tile_aabb) {
            if enemy.vy > 0 {
                aabb.set_bottom(tile_aabb.top());
                // The ground itself can kill: a block bouncing or breaking
                // under a goomba takes it out.
                if matches!(tile.kind, TileKind::Block { .. }) && (tile.broken || tile.bouncing) {
                    enemy.dead = true;
                }
            } else {
                aabb.set_top(tile_aabb.bottom());
            }
            enemy.vy = 0;
        }
    }
}

fn koopa_vertical(
    enemy: &mut Enemy,
    aabb: &mut Aabb,
    tiles: &Query<(&mut Tile, &Aabb), Without<Enemy>>,
) {
    for (_, tile_aabb) in tiles.iter() {
        if aabb.intersects(tile_aabb) {
            if enemy.vy > 0 {
                aabb.set_bottom(tile_aabb.top());
            } else {
                aabb.set_top(tile_aabb.bottom());
            }
            enemy.vy = 0;
        }
    }
}

/// A goomba death frame cannot be set inside `update_enemies` while shells
/// are borrowed, so shell kills run as their own pass: collect the dangerous
/// shell rectangles, then hit every goomba overlapping one.
pub(crate) fn shell_kills(sheets: Res<SpriteSheets>, mut enemies: Query<(&mut Enemy, &Aabb)>) {
    let shells: Vec<Aabb> = enemies
        .iter()
        .filter(|(enemy, _)| enemy.hidden_in_shell() && enemy.does_damage())
        .map(|(_, aabb)| *aabb)
        .collect();
    if shells.is_empty() {
        return;
    }

    for (mut enemy, aabb) in &mut enemies {
        if enemy.kind == EnemyKind::Goomba && !enemy.dead {
            if shells.iter().any(|shell| aabb.intersects(shell)) {
                enemy.hit(Facing::Left, &sheets.regions);
            }
        }
    }
}

/// Removes enemies that wandered too far from the player (so the spawner can
/// replace them) and dead enemies whose death pose has played through once.
pub(crate) fn prune_enemies(
    mut commands: Commands,
    player: Query<&Aabb, With<Player>>,
    enemies: Query<(Entity, &Enemy, &Aabb), Without<Player>>,
) {
    let Ok(player_aabb) = player.get_single() else {
        return;
    };

    for (entity, enemy, aabb) in &enemies {
        if (player_aabb.x - aabb.x).abs() > DESPAWN_DISTANCE {
            commands.entity(entity).despawn();
        } else if enemy.dead && enemy.animation.played_once() {
            debug!("removing defeated enemy at x={}", aabb.x);
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SpriteSheets;

    fn walking_koopa() -> Enemy {
        Enemy {
            kind: EnemyKind::Koopa {
                in_shell: false,
                shell_moving: false,
                spawn_x: 100,
            },
            facing: Facing::Left,
            dead: false,
            vx: 0,
            vy: 0,
            speed: 1,
            animation: Animation::default(),
        }
    }

    #[test]
    fn koopa_hit_cycle_walk_shell_moving_shell() {
        let sheets = SpriteSheets::placeholder();
        let mut koopa = walking_koopa();
        assert!(koopa.does_damage());

        // First hit: tucked into a stationary shell.
        koopa.hit(Facing::Right, &sheets.regions);
        assert!(koopa.hidden_in_shell());
        assert_eq!(koopa.vx, 0);
        assert!(!koopa.does_damage());

        // Second hit: the shell takes off in the hit direction.
        koopa.hit(Facing::Right, &sheets.regions);
        assert!(matches!(
            koopa.kind,
            EnemyKind::Koopa {
                in_shell: true,
                shell_moving: true,
                ..
            }
        ));
        assert_eq!(koopa.facing, Facing::Right);
        koopa.vx = 6;
        assert!(koopa.does_damage());

        // Third hit stops it again; the cycle repeats indefinitely.
        koopa.hit(Facing::Left, &sheets.regions);
        assert!(matches!(
            koopa.kind,
            EnemyKind::Koopa {
                shell_moving: false,
                ..
            }
        ));
        koopa.vx = 0;
        koopa.vy = 0;
        assert!(!koopa.does_damage());
    }

    #[test]
    fn goomba_hit_is_lethal_and_swaps_to_death_pose() {
        let sheets = SpriteSheets::placeholder();
        let mut goomba = Enemy {
            kind: EnemyKind::Goomba,
            facing: Facing::Left,
            dead: false,
            vx: 0,
            vy: 0,
            speed: 1,
            animation: Animation::new(sheets.regions.goomba_walk.to_vec(), 15),
        };
        assert!(goomba.does_damage());

        goomba.hit(Facing::Left, &sheets.regions);
        assert!(goomba.dead);
        assert!(!goomba.does_damage());
        assert_eq!(goomba.animation.frames(), &[sheets.regions.goomba_dead]);
        // The pose was just set, so removal is not yet allowed.
        assert!(!goomba.animation.played_once());
    }

    #[test]
    fn goomba_reverses_once_at_a_wall_and_never_enters_it() {
        let mut world = World::new();
        world.init_resource::<EnemySettings>();
        let goomba = world
            .spawn((
                Enemy {
                    kind: EnemyKind::Goomba,
                    facing: Facing::Right,
                    dead: false,
                    vx: 0,
                    vy: 0,
                    speed: 1,
                    animation: Animation::default(),
                },
                Aabb::new(0, 0, 16, 16),
            ))
            .id();
        world.spawn((Tile::new(TileKind::Stair), Aabb::new(16, 0, 16, 16)));
        let mut schedule = Schedule::default();
        schedule.add_systems(update_enemies);

        schedule.run(&mut world);
        let aabb = *world.get::<Aabb>(goomba).unwrap();
        // Snapped flush against the wall, never inside it.
        assert_eq!(aabb.right(), 16);
        assert_eq!(world.get::<Enemy>(goomba).unwrap().facing, Facing::Left);

        // One flip per contact: the next tick walks away without another.
        schedule.run(&mut world);
        let aabb = *world.get::<Aabb>(goomba).unwrap();
        assert_eq!(aabb.x, -1);
        assert_eq!(world.get::<Enemy>(goomba).unwrap().facing, Facing::Left);
    }

    #[test]
    fn airborne_stationary_shell_still_damages() {
        let sheets = SpriteSheets::placeholder();
        let mut koopa = walking_koopa();
        koopa.hit(Facing::Left, &sheets.regions);
        koopa.vy = 3;
        assert!(koopa.does_damage());
        koopa.vy = 0;
        assert!(!koopa.does_damage());
    }
}
