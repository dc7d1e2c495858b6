//! Vehicle components.
//!
//! [`ControlledVehicle`] marks the player-steered body; its kinematic state
//! lives in the [`VehiclePhysics`](crate::resources::vehiclephysics::VehiclePhysics)
//! resource. [`AutonomousVehicle`] carries the per-car state of traffic.

use bevy_ecs::prelude::Component;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ControlledVehicle;

/// Traffic car state.
///
/// `speed` is in simulation units per frame step; it is positive for
/// forward-moving traffic and negative for oncoming traffic.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct AutonomousVehicle {
    pub speed: f32,
    pub is_forward: bool,
    pub is_truck: bool,
    /// Set once the car was stopped by a collision; it then scrolls with the road.
    pub collision_stopped: bool,
    /// Lateral velocity left over from a side push.
    pub push_velocity: f32,
    pub push_decay: f32,
}

impl AutonomousVehicle {
    pub fn new(speed: f32, is_forward: bool, is_truck: bool) -> Self {
        Self {
            speed,
            is_forward,
            is_truck,
            collision_stopped: false,
            push_velocity: 0.0,
            push_decay: 0.95,
        }
    }

    pub fn stop(&mut self) {
        self.speed = 0.0;
        self.collision_stopped = true;
    }

    /// Apply and decay the lateral push; returns the x displacement for this step.
    pub fn take_push(&mut self, steps: f32) -> f32 {
        if self.push_velocity == 0.0 {
            return 0.0;
        }
        let dx = self.push_velocity * steps;
        self.push_velocity *= self.push_decay.powf(steps);
        if self.push_velocity.abs() < 0.01 {
            self.push_velocity = 0.0;
        }
        dx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop() {
        let mut car = AutonomousVehicle::new(0.2, true, false);
        car.stop();
        assert_eq!(car.speed, 0.0);
        assert!(car.collision_stopped);
    }

    #[test]
    fn test_push_decays_to_zero() {
        let mut car = AutonomousVehicle::new(0.2, true, false);
        car.push_velocity = 0.3;
        let first = car.take_push(1.0);
        assert!((first - 0.3).abs() < 1e-6);
        assert!((car.push_velocity - 0.285).abs() < 1e-6);
        let mut frames = 0;
        while car.push_velocity != 0.0 {
            car.take_push(1.0);
            frames += 1;
            assert!(frames < 200);
        }
        assert_eq!(car.take_push(1.0), 0.0);
    }
}
