//! Collision categories and the permission matrix between them.
//!
//! Every collidable body belongs to exactly one [`EntityCategory`]. The
//! category decides which registry the body lives in and which other
//! categories it is tested against. [`CategoryTag`] is stamped on the entity
//! when it is registered so listeners can look the category up from an
//! `Entity` alone.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Closed set of collidable body kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// The single player-steered vehicle.
    ControlledVehicle,
    /// Traffic that moves on its own.
    AutonomousVehicle,
    /// Collectible hazard; destroyed on contact.
    HazardTypeA,
    /// Solid hazard; stays in place when hit.
    HazardTypeB,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::ControlledVehicle,
        EntityCategory::AutonomousVehicle,
        EntityCategory::HazardTypeA,
        EntityCategory::HazardTypeB,
    ];

    /// Categories this one is tested against, in test order.
    pub fn collides_with(self) -> &'static [EntityCategory] {
        use EntityCategory::*;
        match self {
            ControlledVehicle => &[AutonomousVehicle, HazardTypeA, HazardTypeB],
            AutonomousVehicle => &[
                ControlledVehicle,
                AutonomousVehicle,
                HazardTypeA,
                HazardTypeB,
            ],
            HazardTypeA | HazardTypeB => &[ControlledVehicle, AutonomousVehicle],
        }
    }

    pub fn can_collide(self, other: EntityCategory) -> bool {
        self.collides_with().contains(&other)
    }

    pub fn is_hazard(self) -> bool {
        matches!(self, EntityCategory::HazardTypeA | EntityCategory::HazardTypeB)
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityCategory::ControlledVehicle => "controlled_vehicle",
            EntityCategory::AutonomousVehicle => "autonomous_vehicle",
            EntityCategory::HazardTypeA => "hazard_a",
            EntityCategory::HazardTypeB => "hazard_b",
        }
    }
}

/// Category a registered entity was given by the collision system.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTag(pub EntityCategory);
