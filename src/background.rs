//! Scrolling parallax backdrop.
//!
//! Two copies of one 256px-wide image leapfrog each other as the camera
//! advances: whenever the slowed scroll has covered a full image width, the
//! trailing copy jumps ahead of the leading one. The layers move at a third
//! of the camera speed.

use bevy::prelude::*;

use crate::assets::SpriteSheets;
use crate::camera::{follow_player, GameCamera};
use crate::render;
use crate::state::{GameSet, GameState};

const BACKGROUND_WIDTH: i32 = 256;
const PARALLAX_SCROLL: i32 = 3;

pub struct BackgroundPlugin;

impl Plugin for BackgroundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Parallax>()
            .add_systems(OnEnter(GameState::Playing), spawn_layers)
            .add_systems(
                FixedUpdate,
                advance_parallax
                    .in_set(GameSet::Camera)
                    .after(follow_player)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, sync_layers.run_if(in_state(GameState::Playing)));
    }
}

/// Marks the two backdrop sprites; the index selects the tracked layer.
#[derive(Component)]
pub struct BackgroundLayer(pub usize);

#[derive(Resource)]
pub struct Parallax {
    layer_x: [i32; 2],
    /// Which layer currently trails and is next to jump ahead.
    first_layer_left: bool,
    change: i32,
}

impl Default for Parallax {
    fn default() -> Self {
        Self {
            layer_x: [0, BACKGROUND_WIDTH],
            first_layer_left: true,
            change: 0,
        }
    }
}

impl Parallax {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Leapfrogs the trailing layer once the slowed scroll has crossed
    /// another full image width.
    pub fn update(&mut self, x_shift: i32) {
        let crossed = -x_shift / (BACKGROUND_WIDTH * PARALLAX_SCROLL);
        if crossed > self.change {
            if self.first_layer_left {
                self.layer_x[0] = self.layer_x[1] + BACKGROUND_WIDTH;
                self.first_layer_left = false;
            } else {
                self.layer_x[1] = self.layer_x[0] + BACKGROUND_WIDTH;
                self.first_layer_left = true;
            }
            self.change += 1;
        }
    }

    /// Screen-space left edge of a layer for the given scroll amount.
    pub fn layer_screen_x(&self, layer: usize, x_shift: i32) -> i32 {
        self.layer_x[layer] + x_shift / PARALLAX_SCROLL
    }
}

fn spawn_layers(mut commands: Commands, sheets: Res<SpriteSheets>) {
    for index in 0..2 {
        commands.spawn((
            BackgroundLayer(index),
            SpriteBundle {
                texture: sheets.background_image.clone(),
                transform: Transform::from_translation(Vec3::new(
                    0.0,
                    0.0,
                    render::Z_BACKGROUND,
                )),
                ..default()
            },
        ));
    }
}

fn advance_parallax(mut parallax: ResMut<Parallax>, camera: Res<GameCamera>) {
    parallax.update(camera.x_shift());
}

/// Converts the screen-space layer positions back into world coordinates so
/// the scrolling render camera shows them at the right place. The image is
/// 256x256 and drawn with its top edge 64px above the world origin.
fn sync_layers(
    parallax: Res<Parallax>,
    camera: Res<GameCamera>,
    mut layers: Query<(&BackgroundLayer, &mut Transform)>,
) {
    for (layer, mut transform) in &mut layers {
        let screen_x = parallax.layer_screen_x(layer.0, camera.x_shift());
        transform.translation.x = (screen_x + camera.x + BACKGROUND_WIDTH / 2) as f32;
        // Top edge at world y = -64, so the 256px image centers at y = 64.
        transform.translation.y = -64.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_leapfrog_as_the_scroll_advances() {
        let mut parallax = Parallax::default();

        // Not far enough yet: both layers stay put.
        parallax.update(-(BACKGROUND_WIDTH * PARALLAX_SCROLL) + 1);
        assert_eq!(parallax.layer_x, [0, BACKGROUND_WIDTH]);

        // One slowed image width crossed: the left layer jumps ahead.
        parallax.update(-(BACKGROUND_WIDTH * PARALLAX_SCROLL));
        assert_eq!(parallax.layer_x, [2 * BACKGROUND_WIDTH, BACKGROUND_WIDTH]);

        // The next crossing moves the other layer.
        parallax.update(-2 * BACKGROUND_WIDTH * PARALLAX_SCROLL);
        assert_eq!(parallax.layer_x, [2 * BACKGROUND_WIDTH, 3 * BACKGROUND_WIDTH]);
    }

    #[test]
    fn layers_drift_at_a_third_of_the_scroll() {
        let parallax = Parallax::default();
        assert_eq!(parallax.layer_screen_x(0, -300), -100);
        assert_eq!(parallax.layer_screen_x(1, -300), BACKGROUND_WIDTH - 100);
    }
}
