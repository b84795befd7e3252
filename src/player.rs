//! The player avatar: action state machine, physics, and the collision
//! pipeline.
//!
//! Collision resolution is two-pass and axis-separated, horizontal before
//! vertical, each pass checking the full tile set with rectangle
//! intersection. The vertical pass is where tile reactions happen (bounce,
//! break, dispense, coin payout); the horizontal pass is where the flag-pole
//! finish sequence starts. Enemy and item contacts follow the tile passes in
//! that order every tick.

use bevy::prelude::*;

use crate::animation::Animation;
use crate::assets::{Regions, SpriteSheets};
use crate::config::{
    apply_gravity, PlayerSettings, MAX_FALL_SPEED, SCREEN_HEIGHT, TICK_RATE, TILE_SIZE,
};
use crate::enemies::{Enemy, EnemyKind};
use crate::events::{CoinCollected, ItemDispensed, PlayerJumped, ScoreAwarded};
use crate::geometry::{Aabb, Facing};
use crate::input::InputState;
use crate::items::Item;
use crate::level::LevelData;
use crate::render;
use crate::state::{GameSet, GameState};
use crate::tiles::{HeadHit, Tile};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerSettings>().add_systems(
            FixedUpdate,
            update_player
                .in_set(GameSet::Player)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Animation/control state. Each action maps to a fixed frame set and delay,
/// selected by player size where both sizes exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Stand,
    Walk,
    Turn,
    Jump,
    Crouch,
    Grow,
    Grab,
    Death,
}

#[derive(Component)]
pub struct Player {
    pub action: Action,
    pub facing: Facing,
    pub dead: bool,
    pub big: bool,
    pub vx: i32,
    pub vy: i32,
    /// True while standing on ground; cleared before every vertical pass and
    /// re-established by a downward tile contact.
    pub can_jump: bool,
    pub score: u32,
    pub coins: u32,
    pub invulnerable: bool,
    invulnerable_ticks: u32,
    /// Set when the flag pole is touched; the scripted finish sequence runs
    /// instead of normal control from then on.
    pub finishing_on_pole: bool,
    /// Set once the finish walk reaches the castle; the avatar is hidden and
    /// the level-end bookkeeping takes over.
    pub inside_castle: bool,
    pole_touch_y: i32,
    landing_score_added: bool,
    pub animation: Animation,
}

impl Player {
    pub fn new(regions: &Regions) -> Self {
        let mut player = Self {
            action: Action::Stand,
            facing: Facing::Right,
            dead: false,
            big: false,
            vx: 0,
            vy: 0,
            can_jump: false,
            score: 0,
            coins: 0,
            invulnerable: false,
            invulnerable_ticks: 0,
            finishing_on_pole: false,
            inside_castle: false,
            pole_touch_y: 0,
            landing_score_added: false,
            animation: Animation::default(),
        };
        player.change_action(Action::Stand, regions);
        player
    }

    /// Switches the action and installs the matching frame set and delay.
    pub fn change_action(&mut self, action: Action, regions: &Regions) {
        self.action = action;
        let standard_delay = (TICK_RATE / 6) as u32;
        match action {
            Action::Stand => {
                self.animation.set_delay(standard_delay);
                self.animation.set_frames(vec![if self.big {
                    regions.big_stand
                } else {
                    regions.small_stand
                }]);
            }
            Action::Walk => {
                self.animation.set_delay(standard_delay);
                self.animation.set_frames(if self.big {
                    regions.big_walk.to_vec()
                } else {
                    regions.small_walk.to_vec()
                });
            }
            Action::Turn => {
                self.animation.set_delay(standard_delay);
                self.animation.set_frames(vec![if self.big {
                    regions.big_turn
                } else {
                    regions.small_turn
                }]);
            }
            Action::Jump => {
                self.animation.set_delay(standard_delay);
                self.animation.set_frames(vec![if self.big {
                    regions.big_jump
                } else {
                    regions.small_jump
                }]);
            }
            Action::Grow => {
                // Fast cycle through the ten grow frames.
                self.animation.set_delay((TICK_RATE / 15) as u32);
                self.animation.set_frames(regions.grow.to_vec());
            }
            Action::Crouch => {
                // Only the big player crouches.
                self.animation.set_delay(standard_delay);
                self.animation.set_frames(vec![regions.big_crouch]);
            }
            Action::Grab => {
                self.animation.set_delay(standard_delay);
                self.animation.set_frames(if self.big {
                    regions.big_grab.to_vec()
                } else {
                    regions.small_grab.to_vec()
                });
            }
            Action::Death => {
                // The repeated frame stretches the pose so the level reset
                // waits a beat before kicking in.
                self.animation.set_delay(TICK_RATE as u32);
                self.animation.set_frames(vec![
                    regions.small_dead,
                    regions.small_dead,
                    regions.small_dead,
                ]);
            }
        }
    }

    /// Kills the player with the classic upward death hop. Control is
    /// disabled from here on; the level waits for the pose to finish.
    pub fn die(&mut self, regions: &Regions) {
        self.dead = true;
        self.vy = -15;
        self.change_action(Action::Death, regions);
    }

    /// Grows to big size. Idempotent: growing while already big changes
    /// nothing.
    pub fn grow(&mut self, aabb: &mut Aabb, regions: &Regions) {
        if !self.big {
            self.big = true;
            aabb.y -= 16;
            aabb.height = 32;
            self.change_action(Action::Grow, regions);
        }
    }

    /// Takes one hit from an enemy. Big downgrades to small with a temporary
    /// invulnerability window; small dies.
    pub fn take_hit(&mut self, aabb: &mut Aabb, regions: &Regions) {
        if self.invulnerable {
            return;
        }
        if self.big {
            self.invulnerable = true;
            self.big = false;
            aabb.y += 16;
            aabb.height = 16;
            self.change_action(Action::Stand, regions);
        } else {
            self.die(regions);
        }
    }

    /// Grounded direction changes detour through the turn pose, which must
    /// play once before walking resumes.
    fn update_walk_animation(&mut self, new_facing: Facing, regions: &Regions) {
        if !self.can_jump {
            return;
        }
        if self.facing != new_facing {
            self.change_action(Action::Turn, regions);
        }
        if self.action != Action::Walk {
            if self.action == Action::Turn {
                if self.animation.played_once() {
                    self.change_action(Action::Walk, regions);
                }
            } else {
                self.change_action(Action::Walk, regions);
            }
        }
    }
}

/// Run condition for everything that only advances during regular play:
/// enemy updates, spawning and the countdown freeze while the player is
/// growing, finishing or dead.
pub fn normal_play(players: Query<&Player>) -> bool {
    players
        .get_single()
        .map(|p| p.action != Action::Grow && !p.finishing_on_pole && !p.dead)
        .unwrap_or(false)
}

pub fn spawn_player(commands: &mut Commands, sheets: &SpriteSheets, root: Entity, x: i32, y: i32) {
    let player = Player::new(&sheets.regions);
    let index = player.animation.current().unwrap_or_default();
    commands
        .spawn((
            player,
            Aabb::new(x, y, 16, 16),
            SpriteBundle {
                texture: sheets.actors_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_PLAYER)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.actors_layout.clone(),
                index,
            },
        ))
        .set_parent(root);
}

fn award(
    player: &mut Player,
    aabb: &Aabb,
    amount: u32,
    score_events: &mut EventWriter<ScoreAwarded>,
) {
    player.score += amount;
    score_events.send(ScoreAwarded {
        amount,
        x: aabb.x,
        y: aabb.y,
    });
}

type TileQuery<'w, 's> =
    Query<'w, 's, (&'static mut Tile, &'static Aabb), (Without<Player>, Without<Enemy>, Without<Item>)>;

pub(crate) fn update_player(
    input: Res<InputState>,
    settings: Res<PlayerSettings>,
    sheets: Res<SpriteSheets>,
    level: Res<LevelData>,
    mut players: Query<(&mut Player, &mut Aabb)>,
    mut tiles: TileQuery,
    mut enemies: Query<(&mut Enemy, &mut Aabb), (With<Enemy>, Without<Player>)>,
    mut items: Query<(&mut Item, &Aabb), (Without<Player>, Without<Enemy>)>,
    mut score_events: EventWriter<ScoreAwarded>,
    mut coin_events: EventWriter<CoinCollected>,
    mut item_events: EventWriter<ItemDispensed>,
    mut jump_events: EventWriter<PlayerJumped>,
) {
    let Ok((mut player, mut aabb)) = players.get_single_mut() else {
        return;
    };
    let player = &mut *player;
    let aabb = &mut *aabb;
    let regions = &sheets.regions;

    player.animation.tick();

    if player.finishing_on_pole {
        finish_sequence(
            player,
            aabb,
            &settings,
            regions,
            &level,
            &mut tiles,
            &mut score_events,
            &mut coin_events,
            &mut item_events,
        );
        return;
    }

    if player.action != Action::Grow && player.action != Action::Death {
        if player.invulnerable {
            player.invulnerable_ticks += 1;
            if player.invulnerable_ticks >= settings.invulnerable_ticks {
                player.invulnerable = false;
                player.invulnerable_ticks = 0;
            }
        }

        apply_gravity(&mut player.vy, MAX_FALL_SPEED);

        if player.can_jump {
            if input.jump {
                player.vy -= settings.jump_force;
                jump_events.send(PlayerJumped);
            } else if input.down && player.big {
                if player.action != Action::Crouch {
                    player.change_action(Action::Crouch, regions);
                }
            } else if player.action == Action::Jump {
                // Back on the ground after a jump.
                player.change_action(Action::Stand, regions);
            }
        } else if player.action != Action::Jump {
            // Falling shows the jump pose regardless of other input.
            player.change_action(Action::Jump, regions);
        }

        player.vx = 0;
        if input.left {
            player.vx = -settings.speed;
            player.update_walk_animation(Facing::Left, regions);
            player.facing = Facing::Left;
        }
        if input.right {
            player.vx = settings.speed;
            player.update_walk_animation(Facing::Right, regions);
            player.facing = Facing::Right;
        }
        if player.vx == 0 && matches!(player.action, Action::Walk | Action::Turn) {
            player.change_action(Action::Stand, regions);
        }

        aabb.x += player.vx;
        resolve_horizontal_tiles(player, aabb, &mut tiles);
        resolve_horizontal_enemies(player, aabb, &mut enemies, regions);

        player.can_jump = false;
        aabb.y += player.vy;
        resolve_vertical_tiles(
            player,
            aabb,
            &mut tiles,
            &mut score_events,
            &mut coin_events,
            &mut item_events,
        );
        resolve_vertical_enemies(player, aabb, &mut enemies, regions, &settings, &mut score_events);

        resolve_item_pickups(player, aabb, &mut items, regions, &mut score_events);

        if aabb.x < 0 {
            aabb.x = 0;
        }
        if aabb.y > SCREEN_HEIGHT {
            player.die(regions);
        }
    }

    if player.action == Action::Grow {
        if player.animation.played_once() {
            player.change_action(Action::Stand, regions);
        }
    } else if player.action == Action::Death {
        // The death hop ignores all collision.
        apply_gravity(&mut player.vy, MAX_FALL_SPEED);
        aabb.y += player.vy;
    }
}

/// Horizontal pass: snap the leading edge to the tile, except that touching
/// a flag-pole piece while moving right starts the finish sequence instead
/// of blocking movement.
fn resolve_horizontal_tiles(player: &mut Player, aabb: &mut Aabb, tiles: &mut TileQuery) {
    for (tile, tile_aabb) in tiles.iter() {
        if !aabb.intersects(tile_aabb) {
            continue;
        }
        if player.facing == Facing::Left {
            aabb.set_left(tile_aabb.right());
        } else if !player.finishing_on_pole {
            if tile.is_pole_piece() {
                player.pole_touch_y = tile_aabb.y;
                aabb.set_center_x(tile_aabb.center_x());
                player.finishing_on_pole = true;
            } else if !tile.is_finish_piece() {
                aabb.set_right(tile_aabb.left());
            }
        } else if !tile.is_finish_piece() {
            aabb.set_right(tile_aabb.left());
        }
    }
}

/// Vertical pass: downward contact grounds the player, upward contact snaps
/// to the tile underside and triggers the tile's head-hit reaction.
fn resolve_vertical_tiles(
    player: &mut Player,
    aabb: &mut Aabb,
    tiles: &mut TileQuery,
    score_events: &mut EventWriter<ScoreAwarded>,
    coin_events: &mut EventWriter<CoinCollected>,
    item_events: &mut EventWriter<ItemDispensed>,
) {
    for (mut tile, tile_aabb) in tiles.iter_mut() {
        if !aabb.intersects(tile_aabb) || tile.is_finish_piece() {
            continue;
        }
        if player.vy > 0 {
            aabb.set_bottom(tile_aabb.top());
            player.can_jump = true;
        } else {
            aabb.set_top(tile_aabb.bottom());
            match tile.head_hit(player.big) {
                HeadHit::Blocked | HeadHit::Bounced | HeadHit::Broken => {}
                HeadHit::Item => {
                    item_events.send(ItemDispensed {
                        x: tile_aabb.x,
                        y: tile_aabb.y,
                    });
                }
                HeadHit::Coin => {
                    player.coins += 1;
                    coin_events.send(CoinCollected {
                        x: tile_aabb.x,
                        y: tile_aabb.y,
                    });
                    award(player, aabb, 100, score_events);
                }
            }
        }
        player.vy = 0;
    }
}

/// Sideways enemy contact hurts if the enemy is dangerous; a resting shell
/// is kicked in the player's facing direction instead.
fn resolve_horizontal_enemies(
    player: &mut Player,
    aabb: &mut Aabb,
    enemies: &mut Query<(&mut Enemy, &mut Aabb), (With<Enemy>, Without<Player>)>,
    regions: &Regions,
) {
    for (mut enemy, enemy_aabb) in enemies.iter_mut() {
        if !aabb.intersects(&enemy_aabb) {
            continue;
        }
        if enemy.does_damage() {
            player.take_hit(aabb, regions);
        } else if matches!(enemy.kind, EnemyKind::Koopa { .. }) {
            enemy.hit(player.facing, regions);
        }
    }
}

/// Stomping a live enemy bounces the player and hits the enemy; any other
/// vertical contact with a dangerous enemy hurts the player.
fn resolve_vertical_enemies(
    player: &mut Player,
    aabb: &mut Aabb,
    enemies: &mut Query<(&mut Enemy, &mut Aabb), (With<Enemy>, Without<Player>)>,
    regions: &Regions,
    settings: &PlayerSettings,
    score_events: &mut EventWriter<ScoreAwarded>,
) {
    for (mut enemy, enemy_aabb) in enemies.iter_mut() {
        if !aabb.intersects(&enemy_aabb) {
            continue;
        }
        if player.vy > 0 {
            if !enemy.dead {
                award(player, aabb, 100, score_events);
                player.vy = -(settings.jump_force * 5) / 6;
                aabb.set_bottom(enemy_aabb.top());
                enemy.hit(player.facing, regions);
                if enemy.hidden_in_shell() {
                    aabb.set_bottom(enemy_aabb.top());
                }
            }
        } else if enemy.does_damage() {
            player.take_hit(aabb, regions);
        }
    }
}

/// Touching a mushroom consumes it, grows the player and awards its score.
fn resolve_item_pickups(
    player: &mut Player,
    aabb: &mut Aabb,
    items: &mut Query<(&mut Item, &Aabb), (Without<Player>, Without<Enemy>)>,
    regions: &Regions,
    score_events: &mut EventWriter<ScoreAwarded>,
) {
    for (mut item, item_aabb) in items.iter_mut() {
        if item.used || !aabb.intersects(item_aabb) {
            continue;
        }
        item.used = true;
        player.grow(aabb, regions);
        award(player, aabb, 1000, score_events);
    }
}

/// Scripted level finish: slide down the pole, collect the landing score,
/// walk to the castle and disappear inside it.
#[allow(clippy::too_many_arguments)]
fn finish_sequence(
    player: &mut Player,
    aabb: &mut Aabb,
    settings: &PlayerSettings,
    regions: &Regions,
    level: &LevelData,
    tiles: &mut TileQuery,
    score_events: &mut EventWriter<ScoreAwarded>,
    coin_events: &mut EventWriter<CoinCollected>,
    item_events: &mut EventWriter<ItemDispensed>,
) {
    let still_sliding = if player.big {
        aabb.y < 128
    } else {
        aabb.y - (aabb.height as i32) < 128
    };

    if still_sliding {
        if player.action != Action::Grab {
            player.change_action(Action::Grab, regions);
        }
        aabb.y += 2;
        resolve_vertical_tiles(player, aabb, tiles, score_events, coin_events, item_events);
        return;
    }

    if !player.landing_score_added {
        // The higher the pole was touched, the more points: inversely
        // proportional to the touch height, rounded down to hundreds.
        let flag_score = 50000 / player.pole_touch_y.max(1);
        let rounded = (flag_score / 100) * 100;
        award(player, aabb, rounded.max(0) as u32, score_events);
        player.landing_score_added = true;
    }

    aabb.x += settings.speed;
    if aabb.x >= level.world_width - TILE_SIZE * 21 {
        player.facing = Facing::Right;
        // Keep the walk pinned to the ground in front of the castle.
        aabb.set_bottom(TILE_SIZE * 11);
    } else {
        player.facing = Facing::Left;
    }
    if player.action != Action::Walk {
        player.change_action(Action::Walk, regions);
    }

    apply_gravity(&mut player.vy, MAX_FALL_SPEED);
    aabb.y += player.vy;
    resolve_vertical_tiles(player, aabb, tiles, score_events, coin_events, item_events);

    if aabb.x >= level.world_width - TILE_SIZE * 8 {
        player.inside_castle = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SpriteSheets;

    fn fresh_player() -> (Player, Aabb, SpriteSheets) {
        let sheets = SpriteSheets::placeholder();
        let player = Player::new(&sheets.regions);
        let aabb = Aabb::new(0, 100, 16, 16);
        (player, aabb, sheets)
    }

    #[test]
    fn grow_is_idempotent() {
        let (mut player, mut aabb, sheets) = fresh_player();
        player.grow(&mut aabb, &sheets.regions);
        assert!(player.big);
        assert_eq!(player.action, Action::Grow);
        assert_eq!(aabb.height, 32);
        assert_eq!(aabb.y, 84);

        let snapshot = aabb;
        player.change_action(Action::Stand, &sheets.regions);
        player.grow(&mut aabb, &sheets.regions);
        assert_eq!(aabb, snapshot);
        assert_eq!(player.action, Action::Stand);
    }

    #[test]
    fn hit_while_big_shrinks_with_invulnerability() {
        let (mut player, mut aabb, sheets) = fresh_player();
        player.grow(&mut aabb, &sheets.regions);

        player.take_hit(&mut aabb, &sheets.regions);
        assert!(!player.big);
        assert!(player.invulnerable);
        assert!(!player.dead);
        assert_eq!(aabb.height, 16);

        // The window absorbs follow-up hits entirely.
        player.take_hit(&mut aabb, &sheets.regions);
        assert!(!player.dead);
    }

    #[test]
    fn hit_while_small_is_fatal_with_death_hop() {
        let (mut player, mut aabb, sheets) = fresh_player();
        player.take_hit(&mut aabb, &sheets.regions);
        assert!(player.dead);
        assert_eq!(player.action, Action::Death);
        assert_eq!(player.vy, -15);
    }

    #[test]
    fn turn_pose_must_complete_before_walking_resumes() {
        let (mut player, _aabb, sheets) = fresh_player();
        player.can_jump = true;
        player.facing = Facing::Right;
        player.change_action(Action::Walk, &sheets.regions);

        // Reversing direction while grounded enters the turn pose. The
        // caller records the new facing right after the check, so the pose
        // is not re-triggered on following ticks.
        player.update_walk_animation(Facing::Left, &sheets.regions);
        player.facing = Facing::Left;
        assert_eq!(player.action, Action::Turn);

        // Still turning until the pose has played once.
        player.update_walk_animation(Facing::Left, &sheets.regions);
        assert_eq!(player.action, Action::Turn);

        while !player.animation.played_once() {
            player.animation.tick();
        }
        player.update_walk_animation(Facing::Left, &sheets.regions);
        assert_eq!(player.action, Action::Walk);
    }

    fn scenario_world() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(SpriteSheets::placeholder());
        world.init_resource::<InputState>();
        world.init_resource::<PlayerSettings>();
        world.init_resource::<LevelData>();
        world.init_resource::<Events<ScoreAwarded>>();
        world.init_resource::<Events<CoinCollected>>();
        world.init_resource::<Events<ItemDispensed>>();
        world.init_resource::<Events<PlayerJumped>>();
        let mut schedule = Schedule::default();
        schedule.add_systems(update_player);
        (world, schedule)
    }

    fn spawn_scenario_player(world: &mut World, x: i32, y: i32) -> Entity {
        let player = Player::new(&world.resource::<SpriteSheets>().regions);
        world.spawn((player, Aabb::new(x, y, 16, 16))).id()
    }

    #[test]
    fn player_falls_onto_floor_and_can_jump() {
        let (mut world, mut schedule) = scenario_world();
        let player = spawn_scenario_player(&mut world, 0, 100);
        for col in 0..4 {
            world.spawn((
                crate::tiles::Tile::new(crate::tiles::TileKind::Floor),
                Aabb::new(col * 16, 160, 16, 16),
            ));
        }

        for _ in 0..30 {
            schedule.run(&mut world);
        }
        let aabb = *world.get::<Aabb>(player).unwrap();
        assert_eq!(aabb.bottom(), 160);
        assert!(world.get::<Player>(player).unwrap().can_jump);

        // Jump input launches the player; the jump pose follows on the next
        // tick, once the ground contact is gone.
        world.resource_mut::<InputState>().jump = true;
        schedule.run(&mut world);
        assert!(world.get::<Player>(player).unwrap().vy < 0);
        schedule.run(&mut world);
        let state = world.get::<Player>(player).unwrap();
        assert!(state.vy < 0);
        assert_eq!(state.action, Action::Jump);
        let jumps = world
            .resource_mut::<Events<PlayerJumped>>()
            .drain()
            .count();
        assert_eq!(jumps, 1);
    }

    #[test]
    fn head_hitting_a_coin_block_pays_out() {
        let (mut world, mut schedule) = scenario_world();
        let player = spawn_scenario_player(&mut world, 0, 84);
        world.get_mut::<Player>(player).unwrap().vy = -6;
        world.spawn((
            crate::tiles::Tile::new(crate::tiles::TileKind::CoinBlock { coins: 2 }),
            Aabb::new(0, 64, 16, 16),
        ));

        schedule.run(&mut world);

        let state = world.get::<Player>(player).unwrap();
        assert_eq!(state.coins, 1);
        assert_eq!(state.score, 100);
        assert_eq!(state.vy, 0);
        // Snapped to the block underside.
        assert_eq!(world.get::<Aabb>(player).unwrap().top(), 80);
        let coins = world
            .resource_mut::<Events<CoinCollected>>()
            .drain()
            .count();
        assert_eq!(coins, 1);
    }

    #[test]
    fn stomping_a_goomba_bounces_and_kills() {
        use crate::enemies::{Enemy, EnemyKind};
        use crate::animation::Animation;

        let (mut world, mut schedule) = scenario_world();
        let player = spawn_scenario_player(&mut world, 0, 133);
        let goomba = world
            .spawn((
                Enemy {
                    kind: EnemyKind::Goomba,
                    facing: Facing::Left,
                    dead: false,
                    vx: 0,
                    vy: 0,
                    speed: 1,
                    animation: Animation::default(),
                },
                Aabb::new(0, 150, 16, 16),
            ))
            .id();

        // First tick closes the gap; the second lands on the goomba.
        schedule.run(&mut world);
        schedule.run(&mut world);

        assert!(world.get::<Enemy>(goomba).unwrap().dead);
        let state = world.get::<Player>(player).unwrap();
        assert!(!state.dead);
        assert_eq!(state.vy, -10);
        assert_eq!(state.score, 100);
    }

    #[test]
    fn touching_a_mushroom_grows_and_scores_once() {
        let (mut world, mut schedule) = scenario_world();
        let player = spawn_scenario_player(&mut world, 0, 100);
        let item = world
            .spawn((
                Item {
                    used: false,
                    facing: Facing::Right,
                    vy: 0,
                    speed: 1,
                },
                Aabb::new(0, 100, 16, 16),
            ))
            .id();

        schedule.run(&mut world);
        let state = world.get::<Player>(player).unwrap();
        assert!(state.big);
        assert_eq!(state.action, Action::Grow);
        assert_eq!(state.score, 1000);
        assert!(world.get::<Item>(item).unwrap().used);

        // The used mushroom waits for the item pass; a second tick over the
        // same spot must not pay again.
        schedule.run(&mut world);
        assert_eq!(world.get::<Player>(player).unwrap().score, 1000);
        let awards = world
            .resource_mut::<Events<ScoreAwarded>>()
            .drain()
            .count();
        assert_eq!(awards, 1);
    }

    #[test]
    fn walking_into_a_live_goomba_hurts_the_small_player() {
        use crate::enemies::{Enemy, EnemyKind};
        use crate::animation::Animation;

        let (mut world, mut schedule) = scenario_world();
        let player = spawn_scenario_player(&mut world, 0, 144);
        world.spawn((
            crate::tiles::Tile::new(crate::tiles::TileKind::Floor),
            Aabb::new(0, 160, 16, 16),
        ));
        world.spawn((
            crate::tiles::Tile::new(crate::tiles::TileKind::Floor),
            Aabb::new(16, 160, 16, 16),
        ));
        world.spawn((
            Enemy {
                kind: EnemyKind::Goomba,
                facing: Facing::Left,
                dead: false,
                vx: 0,
                vy: 0,
                speed: 1,
                animation: Animation::default(),
            },
            Aabb::new(20, 144, 16, 16),
        ));

        world.resource_mut::<InputState>().right = true;
        for _ in 0..3 {
            schedule.run(&mut world);
        }
        assert!(world.get::<Player>(player).unwrap().dead);
    }

    #[test]
    fn death_pose_spans_three_long_frames() {
        let (mut player, _aabb, sheets) = fresh_player();
        player.die(&sheets.regions);
        assert_eq!(player.animation.frames().len(), 3);
        // Removal gate: one full cycle of the pose.
        for _ in 0..(TICK_RATE as u32 + 1) * 3 {
            assert!(!player.animation.played_once());
            player.animation.tick();
        }
        assert!(player.animation.played_once());
    }
}
