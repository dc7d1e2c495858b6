use bevy_ecs::prelude::Component;

use crate::components::category::EntityCategory;

/// Static obstacle lying on the road.
///
/// `kind` is either [`EntityCategory::HazardTypeA`] (collectible) or
/// [`EntityCategory::HazardTypeB`] (solid).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hazard {
    pub kind: EntityCategory,
}

impl Hazard {
    pub fn collectible() -> Self {
        Self {
            kind: EntityCategory::HazardTypeA,
        }
    }

    pub fn solid() -> Self {
        Self {
            kind: EntityCategory::HazardTypeB,
        }
    }
}
