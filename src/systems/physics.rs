//! Controlled vehicle frame handler and collision responses.
//!
//! [`on_frame`] is the heart of a simulation step. In order it
//!
//! 1. advances a running destruction sequence (and stops there once it ends),
//! 2. integrates distance and applies the control intent while driving,
//! 3. advances the controller's particles,
//! 4. runs [`check_collisions`], letting every listener react synchronously,
//! 5. publishes [`PhysicsUpdated`](crate::events::vehicle::PhysicsUpdated).
//!
//! Steps 1 and 2 need a controlled vehicle; the rest always run, so traffic
//! and hazards keep colliding and moving before a vehicle is spawned.
//! Every listener here is a no-op when the [`VehiclePhysics`] resource is absent.
//!
//! The collision, hazard and lifecycle listeners in this module update the
//! [`VehiclePhysics`] resource and the vehicle's visuals.
//!
//! # Related
//!
//! - [`crate::resources::vehiclephysics::VehiclePhysics`] – state machine
//! - [`crate::systems::collision::check_collisions`] – detection passes

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, info};

use crate::components::category::EntityCategory;
use crate::components::mapposition::MapPosition;
use crate::components::tint::{Color, Tint, TintFlash};
use crate::error::{ListenerResult, SimError};
use crate::events::collision::{CollisionEvent, CollisionKind, HazardDestroyed, HazardHit};
use crate::events::eventbus::EventBus;
use crate::events::frame::FrameTick;
use crate::events::gamestate::{GameOver, GlobalRestart};
use crate::events::input::ControlIntentUpdated;
use crate::events::vehicle::{ControlledVehicleSpawned, RoadBoundsChanged};
use crate::resources::particlefield::BurstSpec;
use crate::resources::vehiclephysics::{
    CollisionResponse, DestructionProgress, Impact, VehiclePhysics,
};
use crate::systems::collision::{check_collisions, register_entity, unregister_entity};
use crate::systems::countdown::flash_tint;

/// Body color of the controlled vehicle.
pub const VEHICLE_COLOR: Color = Color::RED;

const SIDE_FLASH_SECONDS: f32 = 0.5;
const STOP_FLASH_SECONDS: f32 = 1.0;
const RING_BURSTS: usize = 8;
const RING_RADIUS: f32 = 2.0;
const RING_HEIGHT: f32 = 0.5;

fn controlled_vehicle(world: &World) -> Option<Entity> {
    world.get_resource::<VehiclePhysics>()?.vehicle
}

fn vehicle_position(world: &World) -> Option<Vec3> {
    let vehicle = controlled_vehicle(world)?;
    world.get::<MapPosition>(vehicle).map(|p| p.pos)
}

/// Frame tick listener driving the controlled vehicle.
pub fn on_frame(world: &mut World, tick: &FrameTick) -> ListenerResult {
    let dt = tick.delta;
    let Some(physics) = world.get_resource::<VehiclePhysics>() else {
        return Ok(());
    };
    let has_vehicle = physics.vehicle.is_some();

    if has_vehicle {
        match world.resource_mut::<VehiclePhysics>().advance_destruction(dt) {
            DestructionProgress::Finished => {
                finish_destruction(world);
                return Ok(());
            }
            DestructionProgress::InProgress => destruction_sparks(world),
            DestructionProgress::NotDestroying => {}
        }
    }

    let lateral = {
        let mut physics = world.resource_mut::<VehiclePhysics>();
        if has_vehicle && physics.is_driving() {
            physics.integrate_distance(dt);
            physics.apply_controls(dt);
            Some(physics.lateral_offset)
        } else {
            None
        }
    };
    if let Some(x) = lateral {
        sync_vehicle_position(world, x);
    }

    world.resource_mut::<VehiclePhysics>().particles.update(dt);

    check_collisions(world);

    let Some(telemetry) = world.get_resource::<VehiclePhysics>().map(|p| p.telemetry(dt)) else {
        return Ok(());
    };
    EventBus::emit(world, &telemetry);
    Ok(())
}

fn sync_vehicle_position(world: &mut World, x: f32) {
    let Some(vehicle) = controlled_vehicle(world) else {
        return;
    };
    if let Some(mut position) = world.get_mut::<MapPosition>(vehicle) {
        position.pos.x = x;
    }
}

/// Extra bursts while the destruction sequence runs.
fn destruction_sparks(world: &mut World) {
    let Some(origin) = vehicle_position(world) else {
        return;
    };
    let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() else {
        return;
    };
    let physics = &mut *physics;
    if physics.rng.f32() >= physics.tuning.explosion_chance {
        return;
    }
    let offset = Vec3::new(
        (physics.rng.f32() - 0.5) * 4.0,
        physics.rng.f32() * 2.0,
        (physics.rng.f32() - 0.5) * 4.0,
    );
    physics.particles.burst(
        &mut physics.rng,
        origin + offset,
        &BurstSpec::explosion(Color::RED),
    );
}

/// Fatal impact visuals: a burst on the vehicle, a ring around it and a red glow.
fn start_destruction(world: &mut World) {
    let vehicle = controlled_vehicle(world);
    let origin = vehicle_position(world).unwrap_or(Vec3::ZERO);
    if let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() {
        let physics = &mut *physics;
        let spec = BurstSpec::explosion(Color::RED);
        physics.particles.burst(&mut physics.rng, origin, &spec);
        for i in 0..RING_BURSTS {
            let angle = i as f32 / RING_BURSTS as f32 * TAU;
            let offset = Vec3::new(
                angle.cos() * RING_RADIUS,
                RING_HEIGHT,
                angle.sin() * RING_RADIUS,
            );
            physics.particles.burst(&mut physics.rng, origin + offset, &spec);
        }
    }
    if let Some(vehicle) = vehicle
        && let Some(mut tint) = world.get_mut::<Tint>(vehicle)
    {
        tint.glow(Color::RED, 1.0);
    }
    info!("controlled vehicle destroyed");
}

fn finish_destruction(world: &mut World) {
    if let Some(vehicle) = controlled_vehicle(world) {
        unregister_entity(world, vehicle, EntityCategory::ControlledVehicle);
    }
    info!("destruction sequence finished, game over");
    EventBus::emit(world, &GameOver);
}

/// Route one impact through the state machine and apply its visuals.
pub fn apply_impact(world: &mut World, impact: Impact) -> CollisionResponse {
    let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() else {
        return CollisionResponse::Ignored;
    };
    let response = physics.respond_to_impact(impact);
    let vehicle = physics.vehicle;
    match (response, vehicle) {
        (CollisionResponse::Slowed, Some(v)) => {
            flash_tint(world, v, Color::ORANGE, SIDE_FLASH_SECONDS)
        }
        (CollisionResponse::Stopped, Some(v)) => {
            flash_tint(world, v, Color::ORANGE, STOP_FLASH_SECONDS)
        }
        (CollisionResponse::Destroying, _) => start_destruction(world),
        _ => {}
    }
    debug!("impact {:?} -> {:?}", impact, response);
    response
}

/// Collision listener registered with source = controlled vehicle.
///
/// Hazard contacts are ignored here; they arrive as [`HazardHit`] and
/// [`HazardDestroyed`] from the obstacle field.
pub fn on_collision(world: &mut World, event: &CollisionEvent) -> ListenerResult {
    if event.target_category != EntityCategory::AutonomousVehicle {
        return Ok(());
    }
    let impact = match event.kind {
        CollisionKind::Side => Impact::Side,
        CollisionKind::Front | CollisionKind::Back => Impact::HeadOn,
    };
    apply_impact(world, impact);
    Ok(())
}

/// A solid hazard was hit; only contacts with our vehicle matter.
pub fn on_hazard_hit(world: &mut World, event: &HazardHit) -> ListenerResult {
    if controlled_vehicle(world) != Some(event.collided_with) {
        return Ok(());
    }
    apply_impact(world, Impact::HeadOn);
    Ok(())
}

/// A collectible hazard vanished; celebrate with a yellow burst.
pub fn on_hazard_destroyed(world: &mut World, event: &HazardDestroyed) -> ListenerResult {
    let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() else {
        return Ok(());
    };
    let physics = &mut *physics;
    physics.particles.burst(
        &mut physics.rng,
        event.position,
        &BurstSpec::explosion(Color::YELLOW),
    );
    Ok(())
}

pub fn on_controls(world: &mut World, event: &ControlIntentUpdated) -> ListenerResult {
    if let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() {
        physics.controls = event.0;
    }
    Ok(())
}

pub fn on_road_bounds(world: &mut World, event: &RoadBoundsChanged) -> ListenerResult {
    if let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() {
        physics.set_max_lateral(event.max_lateral);
    }
    Ok(())
}

/// Adopt a freshly spawned vehicle and make it collidable.
pub fn on_vehicle_spawned(world: &mut World, event: &ControlledVehicleSpawned) -> ListenerResult {
    let x = world
        .get::<MapPosition>(event.entity)
        .map(|p| p.pos.x)
        .ok_or_else(|| SimError::missing::<MapPosition>(event.entity))?;
    {
        let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() else {
            return Ok(());
        };
        physics.vehicle = Some(event.entity);
        let limit = physics.max_lateral;
        physics.lateral_offset = x.clamp(-limit, limit);
    }
    register_entity(world, event.entity, EntityCategory::ControlledVehicle);
    Ok(())
}

/// Restart listener: back to the baseline, vehicle repainted.
pub fn on_restart(world: &mut World, _: &GlobalRestart) -> ListenerResult {
    let Some(mut physics) = world.get_resource_mut::<VehiclePhysics>() else {
        return Ok(());
    };
    physics.reset();
    let Some(vehicle) = physics.vehicle else {
        return Ok(());
    };
    if let Ok(mut entity_mut) = world.get_entity_mut(vehicle) {
        entity_mut.remove::<TintFlash>();
        if let Some(mut tint) = entity_mut.get_mut::<Tint>() {
            tint.color = VEHICLE_COLOR;
            tint.clear_glow();
        }
    }
    info!("vehicle physics reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::input::ControlIntent;

    #[test]
    fn test_listeners_without_physics_are_noops() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();

        assert!(on_frame(&mut world, &FrameTick { delta: 0.1 }).is_ok());
        assert!(on_controls(&mut world, &ControlIntentUpdated(ControlIntent::throttle())).is_ok());
        assert!(on_road_bounds(&mut world, &RoadBoundsChanged { max_lateral: 5.0 }).is_ok());
        assert!(on_restart(&mut world, &GlobalRestart).is_ok());
        let destroyed = HazardDestroyed {
            hazard: entity,
            position: Vec3::ZERO,
            category: EntityCategory::HazardTypeA,
            collided_with: entity,
        };
        assert!(on_hazard_destroyed(&mut world, &destroyed).is_ok());
        let hit = HazardHit {
            hazard: entity,
            position: Vec3::ZERO,
            category: EntityCategory::HazardTypeB,
            collided_with: entity,
        };
        assert!(on_hazard_hit(&mut world, &hit).is_ok());
        assert_eq!(
            apply_impact(&mut world, Impact::HeadOn),
            CollisionResponse::Ignored
        );
        assert!(!world.contains_resource::<VehiclePhysics>());
    }
}
