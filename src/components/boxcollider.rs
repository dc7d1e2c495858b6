use bevy_ecs::prelude::Component;
use glam::Vec3;

/// Axis-aligned box extent, centered on the entity position plus `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct BoxCollider {
    pub size: Vec3,
    pub offset: Vec3,
}

impl BoxCollider {
    /// Create a BoxCollider with given size
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            size: Vec3::new(width, height, depth),
            offset: Vec3::ZERO,
        }
    }

    /// Modify BoxCollider with given offset
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Returns (min, max) of the collider AABB for a given entity position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn aabb(&self, position: Vec3) -> (Vec3, Vec3) {
        let center = position + self.offset;
        let half = self.size.abs() * 0.5;
        (center - half, center + half)
    }

    /// Inclusive AABB overlap test: boxes that merely touch count as overlapping.
    pub fn overlaps(&self, position: Vec3, other: &Self, other_position: Vec3) -> bool {
        let (min_a, max_a) = self.aabb(position);
        let (min_b, max_b) = other.aabb(other_position);
        min_a.x <= max_b.x
            && max_a.x >= min_b.x
            && min_a.y <= max_b.y
            && max_a.y >= min_b.y
            && min_a.z <= max_b.z
            && max_a.z >= min_b.z
    }
}
