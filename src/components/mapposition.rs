use bevy_ecs::prelude::Component;
use glam::Vec3;

/// World-space position of a body's center.
///
/// `x` is the lateral axis, `y` points up and `z` runs along the road; bodies
/// ahead of the controlled vehicle have negative `z`.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct MapPosition {
    pub pos: Vec3,
}

impl MapPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
        }
    }
}

impl From<Vec3> for MapPosition {
    fn from(pos: Vec3) -> Self {
        Self { pos }
    }
}
