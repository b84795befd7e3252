//! One-way scrolling camera.
//!
//! The view follows the player's center but never scrolls back past the
//! furthest point reached, and the player cannot walk off the left edge of
//! the view. Gameplay reads the camera as plain integers; a separate Update
//! system mirrors it onto the Bevy camera entity.

use bevy::prelude::*;
use bevy::render::camera::ScalingMode;

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::geometry::Aabb;
use crate::player::Player;
use crate::state::{GameSet, GameState};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameCamera>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                FixedUpdate,
                follow_player
                    .in_set(GameSet::Camera)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, sync_camera.run_if(in_state(GameState::Playing)));
    }
}

/// Marker component so the mirror system can locate the camera entity.
#[derive(Component)]
pub struct GameCameraTag;

/// Integer scroll state. `x` is the world x of the view's left edge.
#[derive(Resource, Default)]
pub struct GameCamera {
    pub x: i32,
    /// High-water mark the view can never scroll back past.
    max_x: i32,
    pub world_width: i32,
}

impl GameCamera {
    pub fn reset(&mut self, world_width: i32) {
        self.x = 0;
        self.max_x = 0;
        self.world_width = world_width;
    }

    /// Centers the view on the given world x, ratcheted and clamped to the
    /// level bounds.
    pub fn focus(&mut self, center_x: i32) {
        if self.x > self.max_x {
            self.max_x = self.x;
        }
        self.x = (center_x - SCREEN_WIDTH / 2)
            .max(self.max_x)
            .min((self.world_width - SCREEN_WIDTH).max(0));
    }

    /// Leftmost x the player is allowed to occupy.
    pub fn min_player_x(&self) -> i32 {
        self.x
    }

    /// How far the world has scrolled; the parallax layers divide this.
    pub fn x_shift(&self) -> i32 {
        -self.x
    }
}

fn setup_camera(mut commands: Commands) {
    let mut camera = Camera2dBundle::default();
    camera.projection.scaling_mode = ScalingMode::Fixed {
        width: SCREEN_WIDTH as f32,
        height: SCREEN_HEIGHT as f32,
    };
    commands.spawn((camera, GameCameraTag));
}

pub(crate) fn follow_player(mut camera: ResMut<GameCamera>, mut players: Query<(&Player, &mut Aabb)>) {
    let Ok((player, mut aabb)) = players.get_single_mut() else {
        return;
    };
    camera.focus(aabb.center_x());
    if !player.dead && aabb.x < camera.min_player_x() {
        aabb.x = camera.min_player_x();
    }
}

/// Mirrors the integer camera onto the render camera, converting to the
/// centered, y-up convention.
fn sync_camera(camera: Res<GameCamera>, mut transforms: Query<&mut Transform, With<GameCameraTag>>) {
    let Ok(mut transform) = transforms.get_single_mut() else {
        return;
    };
    transform.translation.x = (camera.x + SCREEN_WIDTH / 2) as f32;
    transform.translation.y = -(SCREEN_HEIGHT / 2) as f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_centers_on_focus_within_bounds() {
        let mut camera = GameCamera::default();
        camera.reset(2048);
        camera.focus(400);
        assert_eq!(camera.x, 400 - SCREEN_WIDTH / 2);
    }

    #[test]
    fn camera_never_scrolls_back() {
        let mut camera = GameCamera::default();
        camera.reset(2048);
        camera.focus(800);
        let high_water = camera.x;

        camera.focus(100);
        assert_eq!(camera.x, high_water);

        // Forward progress still works after a failed backtrack.
        camera.focus(1000);
        assert!(camera.x > high_water);
    }

    #[test]
    fn camera_clamps_to_level_edges() {
        let mut camera = GameCamera::default();
        camera.reset(1000);
        camera.focus(0);
        assert_eq!(camera.x, 0);
        camera.focus(5000);
        assert_eq!(camera.x, 1000 - SCREEN_WIDTH);
    }

    #[test]
    fn reset_clears_the_high_water_mark() {
        let mut camera = GameCamera::default();
        camera.reset(2048);
        camera.focus(1000);
        camera.reset(2048);
        camera.focus(100);
        assert_eq!(camera.x, 0);
    }
}
