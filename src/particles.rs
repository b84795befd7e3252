//! Short-lived visual feedback entities: floating score text, coin pops,
//! broken-block debris and the end-of-level fireworks.
//!
//! Particles have their own simple physics and either a fixed lifetime or an
//! animation-completion trigger, after which they are despawned. They never
//! affect gameplay. Most of them are spawned from gameplay events so the
//! emitting pass stays free of cross-module spawning.

use bevy::prelude::*;
use rand::Rng;

use crate::animation::Animation;
use crate::assets::SpriteSheets;
use crate::config::{GRAVITY, TICK_RATE};
use crate::events::{BlockBroken, CoinCollected, ScoreAwarded};
use crate::geometry::Aabb;
use crate::level::LevelRoot;
use crate::render;
use crate::state::{GameSet, GameState};

/// Lifetime of the timed particle kinds, in ticks.
const PARTICLE_TICKS: u32 = TICK_RATE as u32;

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                update_particles,
                spawn_score_particles,
                spawn_coin_particles,
                spawn_debris_particles,
            )
                .in_set(GameSet::Level)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Which corner of the broken block a debris piece flies toward. Also picks
/// the sprite mirroring so one 8x8 image covers all four pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebrisCorner {
    UpperLeft,
    UpperRight,
    LowerRight,
    LowerLeft,
}

impl DebrisCorner {
    const ALL: [DebrisCorner; 4] = [
        DebrisCorner::UpperLeft,
        DebrisCorner::UpperRight,
        DebrisCorner::LowerRight,
        DebrisCorner::LowerLeft,
    ];

    fn velocity(self) -> (i32, i32) {
        match self {
            DebrisCorner::UpperLeft => (-5, -7),
            DebrisCorner::UpperRight => (5, -7),
            DebrisCorner::LowerRight => (5, -5),
            DebrisCorner::LowerLeft => (-5, -5),
        }
    }

    fn flips(self) -> (bool, bool) {
        let flip_x = matches!(self, DebrisCorner::UpperRight | DebrisCorner::LowerRight);
        let flip_y = matches!(self, DebrisCorner::LowerRight | DebrisCorner::LowerLeft);
        (flip_x, flip_y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    ScoreText,
    Coin,
    Debris,
    Firework,
}

#[derive(Component)]
pub struct Particle {
    pub kind: ParticleKind,
    pub vx: i32,
    pub vy: i32,
    pub age: u32,
    pub animation: Animation,
}

impl Particle {
    /// Steps the particle one tick. Returns false once it should be removed.
    pub fn step(&mut self, aabb: &mut Aabb) -> bool {
        match self.kind {
            ParticleKind::ScoreText => {
                if self.age >= PARTICLE_TICKS {
                    return false;
                }
                aabb.y -= 1;
                self.age += 1;
                true
            }
            ParticleKind::Coin => {
                self.animation.tick();
                if self.animation.played_once() {
                    return false;
                }
                aabb.y += self.vy;
                self.vy += GRAVITY;
                true
            }
            ParticleKind::Debris => {
                if self.age >= PARTICLE_TICKS {
                    return false;
                }
                aabb.x += self.vx;
                aabb.y += self.vy;
                self.vy += GRAVITY;
                self.age += 1;
                true
            }
            ParticleKind::Firework => {
                self.animation.tick();
                if self.animation.played_once() {
                    return false;
                }
                aabb.x += self.vx;
                aabb.y += self.vy;
                true
            }
        }
    }
}

/// Floating number shown wherever score was just awarded.
pub fn spawn_score_text(commands: &mut Commands, root: Entity, x: i32, y: i32, amount: u32) {
    commands
        .spawn((
            Particle {
                kind: ParticleKind::ScoreText,
                vx: 0,
                vy: 0,
                age: 0,
                animation: Animation::default(),
            },
            Aabb::new(x, y, 0, 0),
            Text2dBundle {
                text: Text::from_section(
                    amount.to_string(),
                    TextStyle {
                        font_size: 8.0,
                        color: Color::WHITE,
                        ..default()
                    },
                ),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_PARTICLES)),
                ..default()
            },
        ))
        .set_parent(root);
}

/// Coin popping out of a hit block; appears above the block, not inside it.
pub fn spawn_coin(commands: &mut Commands, sheets: &SpriteSheets, root: Entity, x: i32, y: i32) {
    let animation = Animation::new(sheets.regions.coin.to_vec(), (TICK_RATE / 5) as u32);
    let index = animation.current().unwrap_or_default();
    commands
        .spawn((
            Particle {
                kind: ParticleKind::Coin,
                vx: 0,
                vy: -10,
                age: 0,
                animation,
            },
            Aabb::new(x + 4, y - 16, 8, 16),
            SpriteBundle {
                texture: sheets.tiles_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_PARTICLES)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.tiles_layout.clone(),
                index,
            },
        ))
        .set_parent(root);
}

/// Four brick shards bursting out of a destroyed block. The lower two pieces
/// start half a tile below the upper two.
pub fn spawn_debris_burst(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    root: Entity,
    x: i32,
    y: i32,
) {
    for corner in DebrisCorner::ALL {
        let (vx, vy) = corner.velocity();
        let (flip_x, flip_y) = corner.flips();
        let piece_y = match corner {
            DebrisCorner::LowerRight | DebrisCorner::LowerLeft => y + 8,
            _ => y,
        };
        commands
            .spawn((
                Particle {
                    kind: ParticleKind::Debris,
                    vx,
                    vy,
                    age: 0,
                    animation: Animation::default(),
                },
                Aabb::new(x, piece_y, 8, 8),
                SpriteBundle {
                    texture: sheets.tiles_image.clone(),
                    sprite: Sprite {
                        flip_x,
                        flip_y,
                        ..default()
                    },
                    transform: Transform::from_translation(Vec3::new(
                        0.0,
                        0.0,
                        render::Z_PARTICLES,
                    )),
                    ..default()
                },
                TextureAtlas {
                    layout: sheets.tiles_layout.clone(),
                    index: sheets.regions.debris,
                },
            ))
            .set_parent(root);
    }
}

/// Celebration firework with randomized velocities.
pub fn spawn_firework(
    commands: &mut Commands,
    sheets: &SpriteSheets,
    root: Entity,
    rng: &mut impl Rng,
    x: i32,
    y: i32,
) {
    let animation = Animation::new(sheets.regions.firework.to_vec(), (TICK_RATE / 10) as u32);
    let index = animation.current().unwrap_or_default();
    commands
        .spawn((
            Particle {
                kind: ParticleKind::Firework,
                vx: rng.gen_range(-10..=10),
                vy: rng.gen_range(-6..=-2),
                age: 0,
                animation,
            },
            Aabb::new(x, y, 16, 16),
            SpriteBundle {
                texture: sheets.tiles_image.clone(),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, render::Z_PARTICLES)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.tiles_layout.clone(),
                index,
            },
        ))
        .set_parent(root);
}

fn update_particles(mut commands: Commands, mut particles: Query<(Entity, &mut Particle, &mut Aabb)>) {
    for (entity, mut particle, mut aabb) in &mut particles {
        if !particle.step(&mut aabb) {
            commands.entity(entity).despawn();
        }
    }
}

fn spawn_score_particles(
    mut commands: Commands,
    mut events: EventReader<ScoreAwarded>,
    root: Query<Entity, With<LevelRoot>>,
) {
    let Ok(root) = root.get_single() else {
        return;
    };
    for event in events.read() {
        spawn_score_text(&mut commands, root, event.x, event.y, event.amount);
    }
}

fn spawn_coin_particles(
    mut commands: Commands,
    mut events: EventReader<CoinCollected>,
    sheets: Res<SpriteSheets>,
    root: Query<Entity, With<LevelRoot>>,
) {
    let Ok(root) = root.get_single() else {
        return;
    };
    for event in events.read() {
        spawn_coin(&mut commands, &sheets, root, event.x, event.y);
    }
}

fn spawn_debris_particles(
    mut commands: Commands,
    mut events: EventReader<BlockBroken>,
    sheets: Res<SpriteSheets>,
    root: Query<Entity, With<LevelRoot>>,
) {
    let Ok(root) = root.get_single() else {
        return;
    };
    for event in events.read() {
        spawn_debris_burst(&mut commands, &sheets, root, event.x, event.y);
    }
}
