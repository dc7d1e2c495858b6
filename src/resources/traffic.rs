use bevy_ecs::prelude::*;
use fastrand::Rng;

use crate::resources::gameconfig::TrafficConfig;
use crate::resources::particlefield::ParticleField;

/// Autonomous vehicles owned by the traffic manager and its spawn clocks.
#[derive(Resource)]
pub struct Traffic {
    pub config: TrafficConfig,
    pub max_lateral: f32,
    /// Seconds until the next regular spawn; the first car appears at once.
    pub next_spawn: f32,
    /// Seconds until a scheduled follow-up car, if any.
    pub follow_up: Option<f32>,
    pub cars: Vec<Entity>,
    /// Wreck particles.
    pub particles: ParticleField,
    pub rng: Rng,
}

impl Traffic {
    pub fn new(config: TrafficConfig, max_lateral: f32, rng: Rng) -> Self {
        Self {
            config,
            max_lateral,
            next_spawn: 0.0,
            follow_up: None,
            cars: Vec::new(),
            particles: ParticleField::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Forget every car and pending spawn.
    pub fn reset(&mut self) {
        self.next_spawn = 0.0;
        self.follow_up = None;
        self.cars.clear();
        self.particles.clear();
    }
}
