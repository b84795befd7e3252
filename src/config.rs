//! Fixed gameplay constants and tunable settings resources.
//!
//! Structural constants (screen geometry, tick rate, physics caps) are plain
//! `const`s because they are baked into the level format and the simulation's
//! integer pixel space. Anything a designer might reasonably tweak at runtime
//! lives in a `Resource` with a `Default` impl so it can be replaced or
//! hot-edited through the ECS without touching this file.

use bevy::prelude::*;

/// Simulation ticks per second. The whole game logic is stepped on Bevy's
/// `FixedUpdate` schedule at this rate, so one tick equals one frame of the
/// classic fixed-cadence loop.
pub const TICK_RATE: u64 = 30;

/// Logical screen size in pixels. The window can be any size; the camera
/// projection always shows exactly this many world pixels.
pub const SCREEN_WIDTH: i32 = 256;
pub const SCREEN_HEIGHT: i32 = 200;

/// Square tile edge length; level rows/columns scale by this.
pub const TILE_SIZE: i32 = 16;

/// Item sprites are one tile large.
pub const ITEM_SIZE: i32 = 16;

/// Downward acceleration applied every tick to airborne entities.
pub const GRAVITY: i32 = 1;

/// Terminal fall speed for the player and enemies.
pub const MAX_FALL_SPEED: i32 = 10;

/// Items fall with a lower cap so they read as lighter objects.
pub const ITEM_MAX_FALL_SPEED: i32 = 3;

/// Countdown timer value at level start, in displayed "seconds".
pub const STARTING_TIME: i32 = 500;

/// Lives the player starts a session with.
pub const STARTING_LIVES: u32 = 5;

/// Enemies farther than this from the player are pruned.
pub const DESPAWN_DISTANCE: i32 = SCREEN_WIDTH * 2;

/// Applies one tick of gravity to a vertical velocity, clamped to `cap`.
pub fn apply_gravity(vy: &mut i32, cap: i32) {
    *vy += GRAVITY;
    if *vy > cap {
        *vy = cap;
    }
}

/// Tunable player movement parameters, mirroring the shape of a movement
/// settings resource: systems read it instead of hard-coding magic numbers.
#[derive(Resource)]
pub struct PlayerSettings {
    /// Horizontal walk speed in pixels per tick.
    pub speed: i32,
    /// Upward impulse applied while the jump key is held on the ground.
    pub jump_force: i32,
    /// Ticks of post-hit invulnerability.
    pub invulnerable_ticks: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: 4,
            jump_force: 12,
            invulnerable_ticks: (TICK_RATE * 2) as u32,
        }
    }
}

/// Enemy behaviour tuning shared by the spawner and the update systems.
#[derive(Resource)]
pub struct EnemySettings {
    pub goomba_speed: i32,
    pub koopa_speed: i32,
    /// Speed of a kicked koopa shell.
    pub shell_speed: i32,
    /// Half-width of the patrol band a koopa walks around its spawn point.
    pub koopa_walk_area: i32,
    /// Maximum number of live enemies before the spawner pauses.
    pub max_alive: usize,
    /// Ticks between spawn attempts.
    pub spawn_interval: u64,
    /// Probability that a spawned enemy is a koopa rather than a goomba.
    pub koopa_chance: f64,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            goomba_speed: 1,
            koopa_speed: 1,
            shell_speed: 6,
            koopa_walk_area: 64,
            max_alive: 4,
            spawn_interval: TICK_RATE * 5,
            koopa_chance: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_accumulates_and_clamps() {
        let mut vy = 0;
        for _ in 0..MAX_FALL_SPEED + 5 {
            apply_gravity(&mut vy, MAX_FALL_SPEED);
        }
        assert_eq!(vy, MAX_FALL_SPEED);
    }

    #[test]
    fn item_cap_is_lighter_than_entity_cap() {
        assert!(ITEM_MAX_FALL_SPEED < MAX_FALL_SPEED);
    }
}
