//! Collision event types.
//!
//! The collision system builds one [`CollisionEvent`] per overlapping pair it
//! finds and publishes it on the bus before handing it to the filtered
//! listeners. The obstacle field turns hazard contacts into
//! [`HazardDestroyed`] and [`HazardHit`].

use bevy_ecs::entity::Entity;
use glam::Vec3;
use serde::Serialize;

use crate::components::category::EntityCategory;
use crate::events::eventbus::BusEvent;

/// Geometric relationship of a pair at the moment of overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CollisionKind {
    /// Lateral distance dominates.
    Side,
    /// The source's `z` is at most the target's.
    Front,
    /// The source's `z` is greater than the target's.
    Back,
}

impl CollisionKind {
    /// Classify `source` against `target`.
    ///
    /// `|dx| > |dz|` is a side contact; otherwise the sign of the `z`
    /// difference picks front or back, with ties going to front.
    pub fn classify(source: Vec3, target: Vec3) -> Self {
        let dx = (source.x - target.x).abs();
        let dz = (source.z - target.z).abs();
        if dx > dz {
            CollisionKind::Side
        } else if source.z > target.z {
            CollisionKind::Back
        } else {
            CollisionKind::Front
        }
    }
}

/// One detected overlap between two registered bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub source: Entity,
    pub source_category: EntityCategory,
    pub target: Entity,
    pub target_category: EntityCategory,
    pub kind: CollisionKind,
    pub position: Vec3,
}

/// A collectible hazard was touched and removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardDestroyed {
    pub hazard: Entity,
    pub position: Vec3,
    pub category: EntityCategory,
    pub collided_with: Entity,
}

/// A solid hazard was touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardHit {
    pub hazard: Entity,
    pub position: Vec3,
    pub category: EntityCategory,
    pub collided_with: Entity,
}

impl BusEvent for CollisionEvent {}
impl BusEvent for HazardDestroyed {}
impl BusEvent for HazardHit {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_side() {
        let kind = CollisionKind::classify(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.2));
        assert_eq!(kind, CollisionKind::Side);
    }

    #[test]
    fn test_classify_front_and_back() {
        let behind = Vec3::new(0.0, 0.0, 0.0);
        let ahead = Vec3::new(0.2, 0.0, -1.5);
        assert_eq!(CollisionKind::classify(behind, ahead), CollisionKind::Back);
        assert_eq!(CollisionKind::classify(ahead, behind), CollisionKind::Front);
    }

    #[test]
    fn test_classify_equal_axes_is_not_side() {
        let a = Vec3::new(1.0, 0.0, -1.0);
        assert_eq!(CollisionKind::classify(a, Vec3::ZERO), CollisionKind::Front);
        let b = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(CollisionKind::classify(b, Vec3::ZERO), CollisionKind::Back);
    }

    #[test]
    fn test_classify_same_z_goes_to_front() {
        let a = Vec3::new(0.0, 1.0, 4.0);
        let b = Vec3::new(0.0, 0.0, 4.0);
        assert_eq!(CollisionKind::classify(a, b), CollisionKind::Front);
    }
}
