//! Kinematic and damage state of the controlled vehicle.
//!
//! Speed is a scalar in simulation units per frame step; the displayed speed
//! is `round(speed * speed_scale)` km/h. Lateral motion is an offset clamped
//! to the road. The damage state machine is
//!
//! ```text
//! Driving --fatal impact--> Destroying { elapsed } --elapsed >= duration--> Wrecked
//!    ^                                                                        |
//!    +---------------------------------- reset ------------------------------+
//! ```
//!
//! World-facing behavior (collision responses, particles, telemetry) lives in
//! [`crate::systems::physics`].

use bevy_ecs::prelude::*;
use fastrand::Rng;

use crate::events::input::ControlIntent;
use crate::events::vehicle::PhysicsUpdated;
use crate::resources::gameconfig::PhysicsConfig;
use crate::resources::particlefield::ParticleField;

/// Seconds into the destruction sequence after which the body is hidden.
const VANISH_AFTER: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DriveState {
    #[default]
    Driving,
    /// Fatal impact happened `elapsed` seconds ago.
    Destroying { elapsed: f32 },
    /// Destruction finished; only a reset leaves this state.
    Wrecked,
}

/// Impact classes the controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// Glancing contact with traffic.
    Side,
    /// Front or back contact with traffic, or a solid hazard.
    HeadOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionResponse {
    /// Speed damped.
    Slowed,
    /// Speed set to zero.
    Stopped,
    /// Destruction sequence started.
    Destroying,
    /// Impact arrived while not driving.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructionProgress {
    NotDestroying,
    InProgress,
    Finished,
}

#[derive(Resource)]
pub struct VehiclePhysics {
    pub vehicle: Option<Entity>,
    pub speed: f32,
    pub lateral_offset: f32,
    pub max_lateral: f32,
    pub distance: f32,
    pub state: DriveState,
    pub controls: ControlIntent,
    pub particles: ParticleField,
    pub rng: Rng,
    pub tuning: PhysicsConfig,
}

impl VehiclePhysics {
    pub fn new(tuning: PhysicsConfig, max_lateral: f32) -> Self {
        Self::with_rng(tuning, max_lateral, Rng::new())
    }

    pub fn with_rng(tuning: PhysicsConfig, max_lateral: f32, rng: Rng) -> Self {
        Self {
            vehicle: None,
            speed: tuning.initial_speed,
            lateral_offset: 0.0,
            max_lateral,
            distance: 0.0,
            state: DriveState::Driving,
            controls: ControlIntent::default(),
            particles: ParticleField::new(),
            rng,
            tuning,
        }
    }

    pub fn is_driving(&self) -> bool {
        self.state == DriveState::Driving
    }

    pub fn is_destroying(&self) -> bool {
        matches!(self.state, DriveState::Destroying { .. })
    }

    /// Speed in km/h as shown to the driver.
    pub fn display_speed(&self) -> f32 {
        (self.speed * self.tuning.speed_scale).round()
    }

    /// 0.0 below the shake threshold, ramping linearly to 1.0.
    pub fn camera_shake(&self) -> f32 {
        let kmh = self.speed * self.tuning.speed_scale;
        if kmh < self.tuning.shake_start {
            0.0
        } else {
            ((kmh - self.tuning.shake_start) / self.tuning.shake_range).min(1.0)
        }
    }

    /// The body stays on screen for a moment after a fatal impact.
    pub fn vehicle_visible(&self) -> bool {
        match self.state {
            DriveState::Driving => true,
            DriveState::Destroying { elapsed } => elapsed < VANISH_AFTER,
            DriveState::Wrecked => false,
        }
    }

    pub fn set_max_lateral(&mut self, max_lateral: f32) {
        self.max_lateral = max_lateral.abs();
        self.lateral_offset = self
            .lateral_offset
            .clamp(-self.max_lateral, self.max_lateral);
    }

    /// Apply the stored control intent for one frame.
    ///
    /// Steering is scaled by `dt * 60`; acceleration and braking step the
    /// speed once per frame. Does nothing unless driving.
    pub fn apply_controls(&mut self, dt: f32) {
        if !self.is_driving() {
            return;
        }
        let lateral_step = self.tuning.lateral_speed * dt * 60.0;
        if self.controls.left {
            self.lateral_offset -= lateral_step;
        }
        if self.controls.right {
            self.lateral_offset += lateral_step;
        }
        self.lateral_offset = self
            .lateral_offset
            .clamp(-self.max_lateral, self.max_lateral);

        if self.controls.forward {
            self.speed = (self.speed + self.tuning.speed_step).min(self.tuning.max_speed);
        }
        if self.controls.back {
            self.speed = (self.speed - self.tuning.speed_step).max(self.tuning.min_speed);
        }
    }

    /// Accumulate travelled distance for one frame.
    pub fn integrate_distance(&mut self, dt: f32) {
        self.distance += self.speed * self.tuning.speed_scale * dt;
        if self.distance > self.tuning.distance_limit {
            self.distance = 0.0;
        }
    }

    /// Update speed and damage state for one impact.
    pub fn respond_to_impact(&mut self, impact: Impact) -> CollisionResponse {
        if !self.is_driving() {
            return CollisionResponse::Ignored;
        }
        match impact {
            Impact::Side => {
                self.speed *= self.tuning.side_damping;
                CollisionResponse::Slowed
            }
            Impact::HeadOn if self.display_speed() >= self.tuning.severity_threshold => {
                self.state = DriveState::Destroying { elapsed: 0.0 };
                CollisionResponse::Destroying
            }
            Impact::HeadOn => {
                self.speed = 0.0;
                CollisionResponse::Stopped
            }
        }
    }

    /// Advance the destruction clock; moves to `Wrecked` once it runs out.
    pub fn advance_destruction(&mut self, dt: f32) -> DestructionProgress {
        let DriveState::Destroying { elapsed } = self.state else {
            return DestructionProgress::NotDestroying;
        };
        let elapsed = elapsed + dt;
        if elapsed >= self.tuning.destruction_duration {
            self.state = DriveState::Wrecked;
            DestructionProgress::Finished
        } else {
            self.state = DriveState::Destroying { elapsed };
            DestructionProgress::InProgress
        }
    }

    pub fn telemetry(&self, delta: f32) -> PhysicsUpdated {
        PhysicsUpdated {
            speed: self.speed,
            max_speed: self.tuning.max_speed,
            distance: self.distance,
            delta,
            destroying: self.is_destroying(),
            camera_shake: self.camera_shake(),
        }
    }

    /// Back to the start-of-run baseline. Held controls are kept.
    pub fn reset(&mut self) {
        self.speed = self.tuning.initial_speed;
        self.lateral_offset = 0.0;
        self.distance = 0.0;
        self.state = DriveState::Driving;
        self.particles.clear();
    }
}
