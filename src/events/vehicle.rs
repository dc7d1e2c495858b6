//! Events published and consumed by the vehicle controllers.

use bevy_ecs::entity::Entity;
use glam::Vec3;
use serde::Serialize;

use crate::events::collision::CollisionKind;
use crate::events::eventbus::BusEvent;

/// A controlled vehicle body exists and should be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlledVehicleSpawned {
    pub entity: Entity,
}

/// The road's half width changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadBoundsChanged {
    pub max_lateral: f32,
}

/// Per-frame telemetry of the controlled vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicsUpdated {
    pub speed: f32,
    pub max_speed: f32,
    pub distance: f32,
    pub delta: f32,
    pub destroying: bool,
    /// 0.0 to 1.0.
    pub camera_shake: f32,
}

/// An autonomous vehicle touched the controlled vehicle or another car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficCollision {
    pub vehicle: Entity,
    pub other: Entity,
    pub kind: CollisionKind,
    pub position: Vec3,
}

/// An autonomous vehicle touched a hazard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficHazardCollision {
    pub vehicle: Entity,
    pub hazard: Entity,
    pub kind: CollisionKind,
    pub position: Vec3,
}

impl BusEvent for ControlledVehicleSpawned {}
impl BusEvent for RoadBoundsChanged {}
impl BusEvent for PhysicsUpdated {}
impl BusEvent for TrafficCollision {}
impl BusEvent for TrafficHazardCollision {}
