use bevy_ecs::prelude::*;
use fastrand::Rng;

use crate::resources::gameconfig::ObstacleConfig;

/// Hazards owned by the obstacle field plus its spawn clock.
#[derive(Resource)]
pub struct ObstacleField {
    pub config: ObstacleConfig,
    pub max_lateral: f32,
    /// Seconds since the last regular spawn.
    pub since_spawn: f32,
    pub hazards: Vec<Entity>,
    pub rng: Rng,
}

impl ObstacleField {
    pub fn new(config: ObstacleConfig, max_lateral: f32, rng: Rng) -> Self {
        Self {
            config,
            max_lateral,
            since_spawn: 0.0,
            hazards: Vec::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}
