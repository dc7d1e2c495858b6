//! Delayed removal.
//!
//! Wrecked traffic gets a [`Ttl`] so the wreck stays on the road for a
//! moment. [`update_ttls`](crate::systems::countdown::update_ttls) takes
//! expired entities out of the collision system and despawns them.

use bevy_ecs::prelude::Component;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Ttl {
    /// Seconds left.
    pub remaining: f32,
}

impl Ttl {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Advance by `dt` seconds; true once the time is used up.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}
