//! Level orchestration: parsing the character layout into entities, the
//! session bookkeeping (countdown timer, lives, tick counter), periodic
//! enemy waves, the finish celebration and the death/reset cycle.
//!
//! Everything spawned for a run hangs off a single `LevelRoot` entity, so a
//! reset is one recursive despawn followed by a fresh build from the same
//! layout data.

use bevy::prelude::*;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::assets::SpriteSheets;
use crate::background::Parallax;
use crate::camera::GameCamera;
use crate::config::{
    EnemySettings, SCREEN_WIDTH, STARTING_LIVES, STARTING_TIME, TICK_RATE, TILE_SIZE,
};
use crate::enemies::{spawn_goomba, spawn_koopa, Enemy};
use crate::geometry::Aabb;
use crate::particles::spawn_firework;
use crate::player::{normal_play, spawn_player, Player};
use crate::render;
use crate::state::{GameSet, GameState};
use crate::tiles::{spawn_tile, PipeCorner, TileKind};

/// The banner starts at the castle top and rises to this height.
const BANNER_START_Y: i32 = 100;
const BANNER_REST_Y: i32 = 80;

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelData>()
            .init_resource::<LevelSession>()
            .add_systems(OnEnter(GameState::Playing), spawn_level)
            .add_systems(
                FixedUpdate,
                advance_clock
                    .in_set(GameSet::Input)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                FixedUpdate,
                (
                    (tick_timer, spawn_enemy_wave).run_if(normal_play),
                    spawn_finish_decorations,
                    run_finish_celebration,
                    sync_banner,
                    handle_player_death,
                )
                    .in_set(GameSet::Level)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Root of everything belonging to the current run. Despawning it
/// recursively clears the whole level in one command.
#[derive(Component)]
pub struct LevelRoot;

/// The rising victory banner in front of the castle.
#[derive(Component)]
pub struct Banner;

/// Character layout of a level, one string per tile row.
#[derive(Resource, Clone, Serialize, Deserialize)]
pub struct LevelData {
    pub rows: Vec<String>,
    pub world_width: i32,
}

impl LevelData {
    pub fn from_rows(rows: Vec<String>) -> Self {
        let world_width = rows
            .first()
            .map(|row| row.chars().count() as i32 * TILE_SIZE)
            .unwrap_or(SCREEN_WIDTH);
        Self { rows, world_width }
    }
}

impl Default for LevelData {
    fn default() -> Self {
        Self::from_rows(LEVEL_ONE.iter().map(|row| row.to_string()).collect())
    }
}

/// Per-run bookkeeping that survives entity resets. `tick` counts fixed
/// updates since the run began and never resets, mirroring a global frame
/// counter; lives persist across in-level resets.
#[derive(Resource)]
pub struct LevelSession {
    pub time: i32,
    pub lives: u32,
    pub tick: u64,
    pub flag_y: i32,
}

impl Default for LevelSession {
    fn default() -> Self {
        Self {
            time: STARTING_TIME,
            lives: STARTING_LIVES,
            tick: 0,
            flag_y: BANNER_START_Y,
        }
    }
}

/// Maps one layout character to the tile it spawns, with the draw-x offset
/// the finish flag needs to hang beside its pole.
fn tile_for_char(ch: char, rng: &mut impl Rng) -> Option<(TileKind, i32)> {
    let kind = match ch {
        'F' => TileKind::Floor,
        'B' => TileKind::Block { breakable: true },
        'Q' => TileKind::Question { used: false },
        'C' => TileKind::CoinBlock {
            coins: rng.gen_range(1..=5),
        },
        '■' => TileKind::Stair,
        '<' => TileKind::Pipe(PipeCorner::UpperLeft),
        '>' => TileKind::Pipe(PipeCorner::UpperRight),
        '(' => TileKind::Pipe(PipeCorner::LowerLeft),
        ')' => TileKind::Pipe(PipeCorner::LowerRight),
        'º' => TileKind::FlagTip,
        '|' => TileKind::FlagPole,
        '/' => return Some((TileKind::FinishFlag, TILE_SIZE / 2)),
        _ => return None,
    };
    Some((kind, 0))
}

/// Builds every entity for one run under a fresh level root. Characters
/// without a mapping (spaces, decorative markers) are skipped on purpose.
fn build_level(commands: &mut Commands, sheets: &SpriteSheets, data: &LevelData) {
    let root = commands
        .spawn((LevelRoot, SpatialBundle::default()))
        .id();

    let mut rng = thread_rng();
    let mut player_start = (0, 0);
    for (row_index, row) in data.rows.iter().enumerate() {
        for (col_index, ch) in row.chars().enumerate() {
            let x = col_index as i32 * TILE_SIZE;
            let y = row_index as i32 * TILE_SIZE;
            if ch == 'P' {
                player_start = (x, y);
            } else if let Some((kind, x_offset)) = tile_for_char(ch, &mut rng) {
                spawn_tile(commands, sheets, root, kind, x + x_offset, y);
            }
        }
    }

    spawn_player(commands, sheets, root, player_start.0, player_start.1);
}

fn spawn_level(
    mut commands: Commands,
    sheets: Res<SpriteSheets>,
    data: Res<LevelData>,
    mut camera: ResMut<GameCamera>,
    mut parallax: ResMut<Parallax>,
    mut session: ResMut<LevelSession>,
) {
    *session = LevelSession::default();
    camera.reset(data.world_width);
    parallax.reset();
    build_level(&mut commands, &sheets, &data);
}

fn advance_clock(mut session: ResMut<LevelSession>) {
    session.tick += 1;
}

/// One second of real time removes one unit from the countdown; running out
/// kills the player.
fn tick_timer(
    mut session: ResMut<LevelSession>,
    sheets: Res<SpriteSheets>,
    mut players: Query<&mut Player>,
) {
    if session.tick % TICK_RATE != 0 {
        return;
    }
    session.time -= 1;
    if session.time <= 0 {
        if let Ok(mut player) = players.get_single_mut() {
            player.die(&sheets.regions);
        }
    }
}

/// Periodically drops a fresh enemy just past the right edge of the view
/// while fewer than the cap are alive.
fn spawn_enemy_wave(
    mut commands: Commands,
    session: Res<LevelSession>,
    settings: Res<EnemySettings>,
    sheets: Res<SpriteSheets>,
    camera: Res<GameCamera>,
    enemies: Query<(), With<Enemy>>,
    root: Query<Entity, With<LevelRoot>>,
) {
    if enemies.iter().count() >= settings.max_alive || session.tick % settings.spawn_interval != 0 {
        return;
    }
    let Ok(root) = root.get_single() else {
        return;
    };
    let x = camera.x + SCREEN_WIDTH;
    if thread_rng().gen_bool(settings.koopa_chance) {
        spawn_koopa(&mut commands, &sheets, &settings, root, x, 0);
    } else {
        spawn_goomba(&mut commands, &sheets, &settings, root, x, 0);
    }
}

/// The moment the pole is touched, the castle and its banner appear at the
/// end of the level.
fn spawn_finish_decorations(
    mut commands: Commands,
    sheets: Res<SpriteSheets>,
    session: Res<LevelSession>,
    data: Res<LevelData>,
    players: Query<&Player>,
    banners: Query<(), With<Banner>>,
    root: Query<Entity, With<LevelRoot>>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    if !player.finishing_on_pole || !banners.is_empty() {
        return;
    }
    let Ok(root) = root.get_single() else {
        return;
    };

    // Banner first so the castle overlaps it.
    commands
        .spawn((
            Banner,
            Aabb::new(data.world_width - 8 * TILE_SIZE, session.flag_y, 16, 16),
            SpriteBundle {
                texture: sheets.tiles_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_TILES)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.tiles_layout.clone(),
                index: sheets.regions.banner,
            },
        ))
        .set_parent(root);

    commands
        .spawn((
            Aabb::new(data.world_width - 10 * TILE_SIZE, 6 * TILE_SIZE, 80, 80),
            SpriteBundle {
                texture: sheets.tiles_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_CASTLE)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.tiles_layout.clone(),
                index: sheets.regions.castle,
            },
        ))
        .set_parent(root);
}

/// After the player disappears into the castle: the banner rises, fireworks
/// go off and the remaining countdown drains into score. When the countdown
/// is spent the run is over.
fn run_finish_celebration(
    mut commands: Commands,
    mut session: ResMut<LevelSession>,
    sheets: Res<SpriteSheets>,
    camera: Res<GameCamera>,
    mut players: Query<&mut Player>,
    root: Query<Entity, With<LevelRoot>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };
    if !player.inside_castle {
        return;
    }

    if session.flag_y > BANNER_REST_Y {
        session.flag_y -= 1;
    }
    if session.time > 0 {
        if session.tick % 10 == 0 {
            if let Ok(root) = root.get_single() {
                let mut rng = thread_rng();
                spawn_firework(
                    &mut commands,
                    &sheets,
                    root,
                    &mut rng,
                    camera.x + SCREEN_WIDTH / 2,
                    session.flag_y,
                );
            }
        }
        player.score += 200;
        session.time -= 2;
    } else {
        session.time = 0;
        next_state.set(GameState::GameOver);
    }
}

fn sync_banner(session: Res<LevelSession>, mut banners: Query<&mut Aabb, With<Banner>>) {
    for mut aabb in &mut banners {
        aabb.y = session.flag_y;
    }
}

/// Once the death pose has played out, either restart the level on a spare
/// life or end the game.
fn handle_player_death(
    mut commands: Commands,
    sheets: Res<SpriteSheets>,
    data: Res<LevelData>,
    mut session: ResMut<LevelSession>,
    mut camera: ResMut<GameCamera>,
    mut parallax: ResMut<Parallax>,
    players: Query<&Player>,
    roots: Query<Entity, With<LevelRoot>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    if !player.dead || !player.animation.played_once() {
        return;
    }

    if session.lives == 0 {
        next_state.set(GameState::GameOver);
        return;
    }
    session.lives -= 1;

    for root in &roots {
        commands.entity(root).despawn_recursive();
    }
    session.time = STARTING_TIME;
    session.flag_y = BANNER_START_Y;
    camera.reset(data.world_width);
    parallax.reset();
    build_level(&mut commands, &sheets, &data);
}

const LEVEL_ONE: [&str; 13] = [
    "                                                                                                                                                                                                                            ",
    "                                                                                                                                                                                                     º                      ",
    "                                                                                                                                                                                                    /|                      ",
    "                                                                               BBBBBBBBBBBB   BBBQ                Q              BBB     BQQB                                                 ■■     |                      ",
    "                                                                                                                                                                                             ■■■     |                      ",
    "                     Q                                                                                                                                                                      ■■■■     |                      ",
    "                                                                                                                                                                                           ■■■■■     |                      ",
    "                                             <>         <>                  BQB                  C       BB     Q Q Q        S            CB      ■  ■          ■■  ■                     ■■■■■■     |                      ",
    "                   BQBQB             <>      ()         ()                                                                                       ■■  ■■        ■■■  ■■          QBB      ■■■■■■■     |                      ",
    "                           <>        ()      ()         ()                                                                                      ■■■  ■■■      ■■■■  ■■■     <>     <>   ■■■■■■■■     |                      ",
    "         P                 ()        ()      ()         ()                                                                                     ■■■■  ■■■■    ■■■■■  ■■■■    ()     ()  ■■■■■■■■■     ■         1            ",
    "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF  FFFFFFFFFFFFFFFFFF   FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF  FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
    "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF  FFFFFFFFFFFFFFFFFF   FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF  FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Action;
    use rand::rngs::mock::StepRng;

    #[test]
    fn default_layout_has_consistent_rows() {
        let data = LevelData::default();
        let width = data.rows[0].chars().count();
        for row in &data.rows {
            assert_eq!(row.chars().count(), width);
        }
        assert_eq!(data.world_width, width as i32 * TILE_SIZE);
    }

    #[test]
    fn unknown_characters_spawn_nothing() {
        let mut rng = StepRng::new(0, 1);
        assert!(tile_for_char(' ', &mut rng).is_none());
        assert!(tile_for_char('P', &mut rng).is_none());
        assert!(tile_for_char('?', &mut rng).is_none());
    }

    #[test]
    fn finish_flag_hangs_half_a_tile_right_of_its_column() {
        let mut rng = StepRng::new(0, 1);
        let (kind, offset) = tile_for_char('/', &mut rng).unwrap();
        assert_eq!(kind, TileKind::FinishFlag);
        assert_eq!(offset, TILE_SIZE / 2);
    }

    #[test]
    fn countdown_hitting_zero_kills_the_player() {
        let mut world = World::new();
        world.insert_resource(SpriteSheets::placeholder());
        world.insert_resource(LevelSession {
            time: 1,
            tick: TICK_RATE,
            ..Default::default()
        });
        let player = {
            let sheets = world.resource::<SpriteSheets>();
            Player::new(&sheets.regions)
        };
        let id = world.spawn((player, Aabb::new(0, 100, 16, 16))).id();
        let mut schedule = Schedule::default();
        schedule.add_systems(tick_timer);

        schedule.run(&mut world);
        assert_eq!(world.resource::<LevelSession>().time, 0);
        let player = world.get::<Player>(id).unwrap();
        assert!(player.dead);
        assert_eq!(player.action, Action::Death);
    }

    #[test]
    fn countdown_only_steps_on_whole_seconds() {
        let mut world = World::new();
        world.insert_resource(SpriteSheets::placeholder());
        world.insert_resource(LevelSession {
            time: 5,
            tick: TICK_RATE + 1,
            ..Default::default()
        });
        let mut schedule = Schedule::default();
        schedule.add_systems(tick_timer);

        schedule.run(&mut world);
        assert_eq!(world.resource::<LevelSession>().time, 5);
    }

    #[test]
    fn coin_blocks_start_with_one_to_five_coins() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let (kind, _) = tile_for_char('C', &mut rng).unwrap();
            match kind {
                TileKind::CoinBlock { coins } => assert!((1..=5).contains(&coins)),
                other => panic!("unexpected tile {other:?}"),
            }
        }
    }
}
