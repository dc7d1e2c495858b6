//! Hazard field: spawning, scrolling and contact routing.
//!
//! Hazards lie still on the road while the world scrolls past the controlled
//! vehicle, so every frame they move toward it at twice its speed. Contacts
//! are received from the collision system through two filtered listeners:
//!
//! - collectible hazards ([`EntityCategory::HazardTypeA`]) publish
//!   [`HazardDestroyed`] and are removed at once;
//! - solid hazards ([`EntityCategory::HazardTypeB`]) publish [`HazardHit`] and stay.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, info, warn};

use crate::components::boxcollider::BoxCollider;
use crate::components::category::EntityCategory;
use crate::components::hazard::Hazard;
use crate::components::mapposition::MapPosition;
use crate::components::tint::{Color, Tint};
use crate::error::ListenerResult;
use crate::events::collision::{CollisionEvent, HazardDestroyed, HazardHit};
use crate::events::eventbus::EventBus;
use crate::events::gamestate::GlobalReset;
use crate::events::vehicle::{PhysicsUpdated, RoadBoundsChanged};
use crate::resources::obstacles::ObstacleField;
use crate::systems::collision::{register_entity, unregister_entity};

/// Hazard box: width, height, depth.
const HAZARD_SIZE: Vec3 = Vec3::new(2.0, 1.0, 1.5);
const HAZARD_HEIGHT: f32 = 0.5;
/// Half extent of the clearance probe used when placing a hazard.
const PLACEMENT_BUFFER: f32 = 2.5;
const PLACEMENT_ATTEMPTS: usize = 10;
/// First z a hazard can spawn at; the band extends `spawn_distance` further.
const SPAWN_NEAR_Z: f32 = -50.0;
/// Hazards behind the camera are dropped.
const DESPAWN_Z: f32 = 10.0;

fn hazard_color(kind: EntityCategory) -> Color {
    match kind {
        EntityCategory::HazardTypeA => Color::YELLOW,
        _ => Color::BLUE,
    }
}

/// Spawn a hazard of `hazard.kind` at `position` and register it for collisions.
pub fn spawn_hazard(world: &mut World, hazard: Hazard, position: Vec3) -> Entity {
    let entity = world
        .spawn((
            MapPosition::from(position),
            BoxCollider::new(HAZARD_SIZE.x, HAZARD_SIZE.y, HAZARD_SIZE.z),
            Tint::new(hazard_color(hazard.kind)),
            hazard,
        ))
        .id();
    register_entity(world, entity, hazard.kind);
    if let Some(mut field) = world.get_resource_mut::<ObstacleField>() {
        field.hazards.push(entity);
    }
    entity
}

/// Unregister and despawn a hazard. Unknown entities are ignored.
pub fn remove_hazard(world: &mut World, entity: Entity) {
    let Some(kind) = world.get::<Hazard>(entity).map(|h| h.kind) else {
        return;
    };
    unregister_entity(world, entity, kind);
    world.despawn(entity);
    if let Some(mut field) = world.get_resource_mut::<ObstacleField>() {
        field.hazards.retain(|&e| e != entity);
    }
}

fn position_is_clear(world: &World, x: f32, z: f32) -> bool {
    let probe = BoxCollider::new(PLACEMENT_BUFFER * 2.0, 1.0, PLACEMENT_BUFFER * 2.0);
    let probe_pos = Vec3::new(x, HAZARD_HEIGHT, z);
    let hazards = world.resource::<ObstacleField>().hazards.clone();
    !hazards.iter().any(|&hazard| {
        let Ok(entity_ref) = world.get_entity(hazard) else {
            return false;
        };
        match (entity_ref.get::<MapPosition>(), entity_ref.get::<BoxCollider>()) {
            (Some(pos), Some(collider)) => probe.overlaps(probe_pos, collider, pos.pos),
            _ => false,
        }
    })
}

/// Place one random hazard on a free spot ahead of the vehicle.
///
/// Returns `None` when no free spot was found.
pub fn spawn_random_hazard(world: &mut World) -> Option<Entity> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let (x, z, hazard) = {
            let mut field = world.resource_mut::<ObstacleField>();
            let max = field.max_lateral;
            let depth = field.config.spawn_distance;
            let chance = field.config.collectible_chance;
            let x = field.rng.f32() * max * 2.0 - max;
            let z = -field.rng.f32() * depth + SPAWN_NEAR_Z;
            let hazard = if field.rng.f32() < chance {
                Hazard::collectible()
            } else {
                Hazard::solid()
            };
            (x, z, hazard)
        };
        if position_is_clear(world, x, z) {
            return Some(spawn_hazard(world, hazard, Vec3::new(x, HAZARD_HEIGHT, z)));
        }
    }
    warn!("could not find a free position for a hazard");
    None
}

/// Regular spawn while below `max_count`, then top up to `min_count`.
fn run_spawn_clock(world: &mut World, dt: f32) {
    let due = {
        let mut field = world.resource_mut::<ObstacleField>();
        field.since_spawn += dt;
        let due =
            field.since_spawn >= field.config.spawn_interval && field.len() < field.config.max_count;
        if due {
            field.since_spawn = 0.0;
        }
        due
    };
    if due {
        spawn_random_hazard(world);
    }
    loop {
        let field = world.resource::<ObstacleField>();
        if field.len() >= field.config.min_count {
            break;
        }
        if spawn_random_hazard(world).is_none() {
            break;
        }
    }
}

/// Telemetry listener: spawn (when enabled), scroll and cull hazards.
pub fn on_physics_updated(world: &mut World, event: &PhysicsUpdated) -> ListenerResult {
    let Some(field) = world.get_resource::<ObstacleField>() else {
        return Ok(());
    };
    if field.config.enabled {
        run_spawn_clock(world, event.delta);
    }

    let advance = event.speed * 2.0 * event.delta * 60.0;
    let hazards = world.resource::<ObstacleField>().hazards.clone();
    let mut passed = Vec::new();
    for hazard in hazards {
        match world.get_mut::<MapPosition>(hazard) {
            Some(mut position) => {
                position.pos.z += advance;
                if position.pos.z > DESPAWN_Z {
                    passed.push(hazard);
                }
            }
            None => passed.push(hazard),
        }
    }
    for hazard in passed {
        remove_hazard(world, hazard);
        world
            .resource_mut::<ObstacleField>()
            .hazards
            .retain(|&e| e != hazard);
    }
    Ok(())
}

fn hits_from_vehicle(event: &CollisionEvent) -> bool {
    matches!(
        event.source_category,
        EntityCategory::ControlledVehicle | EntityCategory::AutonomousVehicle
    )
}

/// Collision listener for target = collectible hazard.
pub fn on_collectible_contact(world: &mut World, event: &CollisionEvent) -> ListenerResult {
    if !hits_from_vehicle(event) {
        return Ok(());
    }
    let destroyed = HazardDestroyed {
        hazard: event.target,
        position: event.position,
        category: event.target_category,
        collided_with: event.source,
    };
    debug!("hazard {:?} destroyed by {:?}", event.target, event.source);
    EventBus::emit(world, &destroyed);
    remove_hazard(world, event.target);
    Ok(())
}

/// Collision listener for target = solid hazard.
pub fn on_solid_contact(world: &mut World, event: &CollisionEvent) -> ListenerResult {
    if !hits_from_vehicle(event) {
        return Ok(());
    }
    let hit = HazardHit {
        hazard: event.target,
        position: event.position,
        category: event.target_category,
        collided_with: event.source,
    };
    EventBus::emit(world, &hit);
    Ok(())
}

pub fn on_road_bounds(world: &mut World, event: &RoadBoundsChanged) -> ListenerResult {
    if let Some(mut field) = world.get_resource_mut::<ObstacleField>() {
        field.max_lateral = event.max_lateral.abs();
    }
    Ok(())
}

/// Reset listener: every hazard goes.
pub fn on_reset(world: &mut World, _: &GlobalReset) -> ListenerResult {
    let Some(field) = world.get_resource::<ObstacleField>() else {
        return Ok(());
    };
    let hazards = field.hazards.clone();
    let count = hazards.len();
    for hazard in hazards {
        remove_hazard(world, hazard);
    }
    let mut field = world.resource_mut::<ObstacleField>();
    field.hazards.clear();
    field.since_spawn = 0.0;
    info!("obstacle field cleared ({} hazards)", count);
    Ok(())
}
