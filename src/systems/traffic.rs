//! Autonomous traffic: spawning, movement and collision responses.
//!
//! Forward traffic drives in the right half of the road in the same
//! direction as the controlled vehicle; oncoming traffic uses the left half.
//! Positions are relative to the controlled vehicle, so a car moves toward
//! the camera by the vehicle's speed and away from it by its own.
//!
//! Collisions arrive through two filtered listeners, one for events where
//! the car is the source and one where it is the target, so each car reacts
//! from its own point of view:
//!
//! | other body | reaction |
//! |---|---|
//! | controlled vehicle, side | pushed sideways, away from it |
//! | controlled vehicle, front/back | stops, turns orange |
//! | autonomous vehicle | stops, turns orange |
//! | solid hazard | stops, glows red, bursts, removed after 0.5 s |
//! | collectible hazard | flashes yellow for 0.3 s |

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, info};

use crate::components::boxcollider::BoxCollider;
use crate::components::category::EntityCategory;
use crate::components::mapposition::MapPosition;
use crate::components::tint::{Color, Tint};
use crate::components::ttl::Ttl;
use crate::components::vehicle::AutonomousVehicle;
use crate::error::ListenerResult;
use crate::events::collision::{CollisionEvent, CollisionKind};
use crate::events::eventbus::EventBus;
use crate::events::gamestate::GlobalReset;
use crate::events::vehicle::{
    PhysicsUpdated, RoadBoundsChanged, TrafficCollision, TrafficHazardCollision,
};
use crate::resources::particlefield::BurstSpec;
use crate::resources::traffic::Traffic;
use crate::systems::collision::{register_entity, unregister_entity};
use crate::systems::countdown::flash_tint;

const PALETTE: [u32; 5] = [0xff00ff, 0x00ffff, 0xffff00, 0x00ff00, 0xff8800];
/// Divides km/h into simulation speed.
const KMH_PER_UNIT: f32 = 500.0;
const PUSH_SPEED: f32 = 0.3;
const WRECK_SECONDS: f32 = 0.5;
const YELLOW_FLASH_SECONDS: f32 = 0.3;
const DESPAWN_NEAR_Z: f32 = 10.0;
const DESPAWN_FAR_Z: f32 = -200.0;

fn collider(is_truck: bool) -> BoxCollider {
    if is_truck {
        BoxCollider::new(1.4, 1.4, 3.2).with_offset(Vec3::new(0.0, 0.7, 0.0))
    } else {
        BoxCollider::new(1.4, 0.8, 1.8).with_offset(Vec3::new(0.0, 0.4, 0.0))
    }
}

/// Spawn an autonomous vehicle and register it for collisions.
pub fn spawn_autonomous_vehicle(
    world: &mut World,
    car: AutonomousVehicle,
    position: Vec3,
    color: Color,
) -> Entity {
    let entity = world
        .spawn((
            MapPosition::from(position),
            collider(car.is_truck),
            Tint::new(color),
            car,
        ))
        .id();
    register_entity(world, entity, EntityCategory::AutonomousVehicle);
    if let Some(mut traffic) = world.get_resource_mut::<Traffic>() {
        traffic.cars.push(entity);
    }
    debug!(
        "spawned {} {:?} at {:?}",
        if car.is_forward { "forward" } else { "oncoming" },
        entity,
        position
    );
    entity
}

/// Unregister and despawn a car. Unknown entities are ignored.
pub fn remove_autonomous_vehicle(world: &mut World, entity: Entity) {
    unregister_entity(world, entity, EntityCategory::AutonomousVehicle);
    if world.get_entity(entity).is_ok() {
        world.despawn(entity);
    }
    if let Some(mut traffic) = world.get_resource_mut::<Traffic>() {
        traffic.cars.retain(|&e| e != entity);
    }
}

/// Spawn one car with random direction, lane, model and speed.
pub fn spawn_random_vehicle(world: &mut World) -> Entity {
    let (car, position, color) = {
        let mut traffic = world.resource_mut::<Traffic>();
        let traffic = &mut *traffic;
        let config = traffic.config;
        let half = traffic.max_lateral / 2.0;
        let rng = &mut traffic.rng;

        let is_forward = rng.f32() > config.backward_probability;
        let x = if is_forward {
            half + rng.f32() * half
        } else {
            -half - rng.f32() * (half - 0.5).max(0.0)
        };
        let color = Color::from_hex(PALETTE[rng.usize(0..PALETTE.len())]);
        let is_truck = rng.f32() < config.truck_probability;
        let z = if is_forward {
            -config.spawn_distance
        } else {
            -config.spawn_distance * 1.5
        };

        let min = config.min_speed;
        let kmh = match (is_forward, is_truck) {
            (true, true) => min + rng.f32() * 35.0,
            (true, false) => min + 5.0 + rng.f32() * 45.0,
            (false, true) => min + 20.0 + rng.f32() * 45.0,
            (false, false) => min + 30.0 + rng.f32() * 55.0,
        }
        .min(config.max_speed);
        let speed = (if is_forward { kmh } else { -kmh }) / KMH_PER_UNIT;

        (
            AutonomousVehicle::new(speed, is_forward, is_truck),
            Vec3::new(x, 0.0, z),
            color,
        )
    };
    spawn_autonomous_vehicle(world, car, position, color)
}

/// Run the regular and follow-up spawn clocks for one frame.
fn run_spawn_clocks(world: &mut World, dt: f32) {
    let mut spawns = 0;
    {
        let mut traffic = world.resource_mut::<Traffic>();
        let traffic = &mut *traffic;
        if let Some(remaining) = traffic.follow_up.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                traffic.follow_up = None;
                spawns += 1;
            }
        }
        traffic.next_spawn -= dt;
        if traffic.next_spawn <= 0.0 {
            traffic.next_spawn = traffic.config.spawn_interval;
            spawns += 1;
            if traffic.follow_up.is_none() && traffic.rng.f32() < traffic.config.follow_up_chance {
                traffic.follow_up = Some(traffic.config.follow_up_delay);
            }
        }
    }
    for _ in 0..spawns {
        spawn_random_vehicle(world);
    }
}

/// Telemetry listener: spawn, move and cull traffic.
pub fn on_physics_updated(world: &mut World, event: &PhysicsUpdated) -> ListenerResult {
    let Some(traffic) = world.get_resource::<Traffic>() else {
        return Ok(());
    };
    let enabled = traffic.config.enabled;
    let limit = traffic.max_lateral;
    let dt = event.delta;
    let steps = dt * 60.0;

    if enabled {
        run_spawn_clocks(world, dt);
    }

    let cars = world.resource::<Traffic>().cars.clone();
    let mut gone = Vec::new();
    for entity in cars {
        let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
            gone.push(entity);
            continue;
        };
        let Some(mut car) = entity_mut.get_mut::<AutonomousVehicle>() else {
            gone.push(entity);
            continue;
        };
        let road = event.speed * 2.0;
        let own = car.speed.abs() * 2.0;
        let per_step = if car.collision_stopped {
            road
        } else if car.is_forward {
            road - own
        } else {
            road + own
        };
        let dz = per_step * steps;
        let dx = car.take_push(steps);
        let Some(mut position) = entity_mut.get_mut::<MapPosition>() else {
            gone.push(entity);
            continue;
        };
        position.pos.z += dz;
        if dx != 0.0 {
            position.pos.x = (position.pos.x + dx).clamp(-limit, limit);
        }
        if position.pos.z > DESPAWN_NEAR_Z || position.pos.z < DESPAWN_FAR_Z {
            gone.push(entity);
        }
    }
    for entity in gone {
        remove_autonomous_vehicle(world, entity);
    }

    world.resource_mut::<Traffic>().particles.update(dt);
    Ok(())
}

fn stop_car(world: &mut World, entity: Entity) {
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        return;
    };
    if let Some(mut car) = entity_mut.get_mut::<AutonomousVehicle>() {
        car.stop();
    }
    if let Some(mut tint) = entity_mut.get_mut::<Tint>() {
        tint.color = Color::ORANGE;
    }
}

fn wreck_car(world: &mut World, entity: Entity) {
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        return;
    };
    if let Some(mut car) = entity_mut.get_mut::<AutonomousVehicle>() {
        car.stop();
    }
    if let Some(mut tint) = entity_mut.get_mut::<Tint>() {
        tint.glow(Color::RED, 1.0);
    }
    let origin = entity_mut.get::<MapPosition>().map(|p| p.pos);
    entity_mut.insert(Ttl::new(WRECK_SECONDS));
    if let Some(origin) = origin {
        let mut traffic = world.resource_mut::<Traffic>();
        let traffic = &mut *traffic;
        traffic
            .particles
            .burst(&mut traffic.rng, origin, &BurstSpec::wreck());
    }
}

fn push_car(world: &mut World, entity: Entity, from: Entity) {
    let pusher_x = world.get::<MapPosition>(from).map(|p| p.pos.x);
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        return;
    };
    let own_x = entity_mut.get::<MapPosition>().map(|p| p.pos.x);
    let (Some(pusher_x), Some(own_x)) = (pusher_x, own_x) else {
        return;
    };
    let direction = if pusher_x > own_x { -1.0 } else { 1.0 };
    if let Some(mut car) = entity_mut.get_mut::<AutonomousVehicle>() {
        car.push_velocity = direction * PUSH_SPEED;
        car.push_decay = 0.95;
    }
}

/// React to one contact from `car`'s point of view.
fn respond(
    world: &mut World,
    car: Entity,
    other: Entity,
    other_category: EntityCategory,
    kind: CollisionKind,
    position: Vec3,
) {
    let Ok(entity_ref) = world.get_entity(car) else {
        return;
    };
    // wrecks waiting for removal do not react again
    if entity_ref.contains::<Ttl>() || !entity_ref.contains::<AutonomousVehicle>() {
        return;
    }

    match other_category {
        EntityCategory::ControlledVehicle => {
            if kind == CollisionKind::Side {
                push_car(world, car, other);
            } else {
                stop_car(world, car);
            }
            EventBus::emit(
                world,
                &TrafficCollision {
                    vehicle: car,
                    other,
                    kind,
                    position,
                },
            );
        }
        EntityCategory::AutonomousVehicle => {
            stop_car(world, car);
            EventBus::emit(
                world,
                &TrafficCollision {
                    vehicle: car,
                    other,
                    kind,
                    position,
                },
            );
        }
        EntityCategory::HazardTypeB | EntityCategory::HazardTypeA => {
            if other_category == EntityCategory::HazardTypeB {
                wreck_car(world, car);
            } else {
                flash_tint(world, car, Color::YELLOW, YELLOW_FLASH_SECONDS);
            }
            EventBus::emit(
                world,
                &TrafficHazardCollision {
                    vehicle: car,
                    hazard: other,
                    kind,
                    position,
                },
            );
        }
    }
}

/// Collision listener for source = autonomous vehicle.
pub fn on_collision_as_source(world: &mut World, event: &CollisionEvent) -> ListenerResult {
    respond(
        world,
        event.source,
        event.target,
        event.target_category,
        event.kind,
        event.position,
    );
    Ok(())
}

/// Collision listener for target = autonomous vehicle.
pub fn on_collision_as_target(world: &mut World, event: &CollisionEvent) -> ListenerResult {
    respond(
        world,
        event.target,
        event.source,
        event.source_category,
        event.kind,
        event.position,
    );
    Ok(())
}

pub fn on_road_bounds(world: &mut World, event: &RoadBoundsChanged) -> ListenerResult {
    if let Some(mut traffic) = world.get_resource_mut::<Traffic>() {
        traffic.max_lateral = event.max_lateral.abs();
    }
    Ok(())
}

/// Reset listener: all traffic goes.
pub fn on_reset(world: &mut World, _: &GlobalReset) -> ListenerResult {
    let Some(traffic) = world.get_resource::<Traffic>() else {
        return Ok(());
    };
    let cars = traffic.cars.clone();
    let count = cars.len();
    for car in cars {
        remove_autonomous_vehicle(world, car);
    }
    world.resource_mut::<Traffic>().reset();
    info!("traffic cleared ({} cars)", count);
    Ok(())
}
