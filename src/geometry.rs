//! Integer rectangle geometry used by every collidable object.
//!
//! The simulation runs in the classic y-down pixel space: positions are whole
//! pixels (`i32`), extents are `u32` so a rectangle can never have a negative
//! size. `render.rs` is the only place that converts these rectangles into
//! Bevy's y-up float world.

use bevy::prelude::*;

/// Horizontal orientation shared by the player, enemies and items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    /// Signed unit step for this direction.
    pub fn step(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
///
/// Edge setters reposition the rectangle while preserving its size, which is
/// what collision resolution relies on: snapping `set_bottom(tile.top())`
/// moves the whole body up against the tile.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Aabb {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width as i32 / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height as i32 / 2
    }

    pub fn set_left(&mut self, left: i32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: i32) {
        self.x = right - self.width as i32;
    }

    pub fn set_top(&mut self, top: i32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: i32) {
        self.y = bottom - self.height as i32;
    }

    pub fn set_center_x(&mut self, center_x: i32) {
        self.x = center_x - self.width as i32 / 2;
    }

    /// Strict-inequality overlap test: rectangles that merely share an edge
    /// do not intersect. This keeps a body resting exactly on top of a tile
    /// from colliding with it every tick.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rectangles_intersect_symmetrically() {
        let a = Aabb::new(0, 0, 16, 16);
        let b = Aabb::new(8, 8, 16, 16);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn edge_adjacent_rectangles_do_not_intersect() {
        let a = Aabb::new(0, 0, 16, 16);
        let b = Aabb::new(16, 0, 16, 16);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let below = Aabb::new(0, 16, 16, 16);
        assert!(!a.intersects(&below));
        assert!(!below.intersects(&a));
    }

    #[test]
    fn disjoint_rectangles_do_not_intersect() {
        let a = Aabb::new(0, 0, 16, 16);
        let b = Aabb::new(100, 100, 16, 16);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn edge_setters_preserve_size() {
        let mut r = Aabb::new(10, 20, 16, 32);
        r.set_right(64);
        assert_eq!(r.x, 48);
        assert_eq!(r.right(), 64);
        assert_eq!(r.width, 16);

        r.set_bottom(100);
        assert_eq!(r.y, 68);
        assert_eq!(r.bottom(), 100);
        assert_eq!(r.height, 32);

        r.set_center_x(0);
        assert_eq!(r.x, -8);
    }

    #[test]
    fn facing_step_signs() {
        assert_eq!(Facing::Left.step(), -1);
        assert_eq!(Facing::Right.step(), 1);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }
}
