//! Simulation clock.
//!
//! Advanced once per [`Simulation::tick`](crate::game::Simulation::tick)
//! before the frame tick is published. `time_scale` slows down or speeds up
//! everything downstream, since listeners only ever see the scaled delta.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    /// Scaled seconds since the simulation was built.
    pub elapsed: f32,
    /// Scaled delta of the last frame.
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    /// Count one frame of `dt` unscaled seconds and return the scaled delta,
    /// kept within `[0, max_delta]`.
    pub fn advance(&mut self, dt: f32, max_delta: f32) -> f32 {
        self.delta = (dt * self.time_scale).clamp(0.0, max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.delta
    }
}
