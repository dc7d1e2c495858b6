//! Collision detection passes.
//!
//! [`check_collisions`] runs once per frame from the physics frame handler.
//! It tests every permitted pair of registered bodies with an inclusive AABB
//! overlap test and, for each hit, builds a [`CollisionEvent`], publishes it
//! on the [`EventBus`] and then hands it to every matching collision listener.
//!
//! # Passes
//!
//! 1. The controlled vehicle against each category of its matrix row, in
//!    registration order. The impact position is the target's position.
//! 2. Every unordered pair of autonomous vehicles (`i < j`, midpoint
//!    position), then each autonomous vehicle against the hazards of its
//!    matrix row. The controlled vehicle entry of that row is skipped; pass 1
//!    already covered it.
//!
//! Hazards never start a test. Listeners may unregister bodies while a pass
//! is running; pairs involving a body that is no longer registered are
//! skipped. Bodies lacking a position or a collider never overlap.
//!
//! # Related
//!
//! - [`crate::resources::collisionsystem::CollisionSystem`] – registries and listeners
//! - [`crate::events::collision::CollisionKind::classify`] – side/front/back

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::debug;

use crate::components::boxcollider::BoxCollider;
use crate::components::category::{CategoryTag, EntityCategory};
use crate::components::mapposition::MapPosition;
use crate::events::collision::{CollisionEvent, CollisionKind};
use crate::events::eventbus::{EventBus, run_isolated};
use crate::resources::collisionsystem::CollisionSystem;

/// Register `entity` under `category` and tag it with its category.
pub fn register_entity(world: &mut World, entity: Entity, category: EntityCategory) {
    let Some(mut system) = world.get_resource_mut::<CollisionSystem>() else {
        return;
    };
    system.register(entity, category);
    if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
        entity_mut.insert(CategoryTag(category));
    }
    debug!("registered {:?} as {}", entity, category.name());
}

/// Remove `entity` from the registry of `category`. Absent entities are ignored.
pub fn unregister_entity(world: &mut World, entity: Entity, category: EntityCategory) -> bool {
    world
        .get_resource_mut::<CollisionSystem>()
        .is_some_and(|mut system| system.unregister(entity, category))
}

fn body(world: &World, entity: Entity) -> Option<(Vec3, BoxCollider)> {
    let entity_ref = world.get_entity(entity).ok()?;
    let position = entity_ref.get::<MapPosition>()?;
    let collider = entity_ref.get::<BoxCollider>()?;
    Some((position.pos, *collider))
}

fn registered(world: &World, entity: Entity, category: EntityCategory) -> bool {
    world
        .get_resource::<CollisionSystem>()
        .is_some_and(|system| system.is_registered(entity, category))
}

fn snapshot(world: &World, category: EntityCategory) -> Vec<Entity> {
    world
        .get_resource::<CollisionSystem>()
        .map(|system| system.entities(category).to_vec())
        .unwrap_or_default()
}

/// Overlap test between two registered bodies.
///
/// Returns both positions on overlap.
fn overlapping(world: &World, a: Entity, b: Entity) -> Option<(Vec3, Vec3)> {
    let Some((pos_a, collider_a)) = body(world, a) else {
        debug!("{:?} has no position or collider, skipped", a);
        return None;
    };
    let Some((pos_b, collider_b)) = body(world, b) else {
        debug!("{:?} has no position or collider, skipped", b);
        return None;
    };
    collider_a
        .overlaps(pos_a, &collider_b, pos_b)
        .then_some((pos_a, pos_b))
}

/// Deliver one collision to the bus and then to the matching collision listeners.
pub fn notify(world: &mut World, event: &CollisionEvent) {
    EventBus::emit(world, event);
    let listeners = match world.get_resource::<CollisionSystem>() {
        Some(system) => system.matching_listeners(event),
        None => return,
    };
    for callback in listeners {
        run_isolated("collision listener", || callback(world, event));
    }
}

/// Run both detection passes. Returns the number of collisions delivered.
pub fn check_collisions(world: &mut World) -> usize {
    if !world.contains_resource::<CollisionSystem>() {
        return 0;
    }
    check_controlled_vehicle(world) + check_autonomous_vehicles(world)
}

fn check_controlled_vehicle(world: &mut World) -> usize {
    let source_category = EntityCategory::ControlledVehicle;
    let Some(vehicle) = world.resource::<CollisionSystem>().controlled() else {
        return 0;
    };
    let mut emitted = 0;
    for &target_category in source_category.collides_with() {
        for target in snapshot(world, target_category) {
            if !registered(world, vehicle, source_category) {
                return emitted;
            }
            if !registered(world, target, target_category) {
                continue;
            }
            let Some((source_pos, target_pos)) = overlapping(world, vehicle, target) else {
                continue;
            };
            let event = CollisionEvent {
                source: vehicle,
                source_category,
                target,
                target_category,
                kind: CollisionKind::classify(source_pos, target_pos),
                position: target_pos,
            };
            notify(world, &event);
            emitted += 1;
        }
    }
    emitted
}

fn check_autonomous_vehicles(world: &mut World) -> usize {
    let category = EntityCategory::AutonomousVehicle;
    let cars = snapshot(world, category);
    let hazard_rows: Vec<(EntityCategory, Vec<Entity>)> = category
        .collides_with()
        .iter()
        .filter(|c| c.is_hazard())
        .map(|&c| (c, snapshot(world, c)))
        .collect();

    let mut emitted = 0;
    for (i, &car) in cars.iter().enumerate() {
        for &other in &cars[i + 1..] {
            if !registered(world, car, category) {
                break;
            }
            if !registered(world, other, category) {
                continue;
            }
            let Some((pos_a, pos_b)) = overlapping(world, car, other) else {
                continue;
            };
            let event = CollisionEvent {
                source: car,
                source_category: category,
                target: other,
                target_category: category,
                kind: CollisionKind::classify(pos_a, pos_b),
                position: (pos_a + pos_b) * 0.5,
            };
            notify(world, &event);
            emitted += 1;
        }

        for (hazard_category, hazards) in &hazard_rows {
            for &hazard in hazards {
                if !registered(world, car, category) {
                    break;
                }
                if !registered(world, hazard, *hazard_category) {
                    continue;
                }
                let Some((car_pos, hazard_pos)) = overlapping(world, car, hazard) else {
                    continue;
                };
                let event = CollisionEvent {
                    source: car,
                    source_category: category,
                    target: hazard,
                    target_category: *hazard_category,
                    kind: CollisionKind::classify(car_pos, hazard_pos),
                    position: hazard_pos,
                };
                notify(world, &event);
                emitted += 1;
            }
        }
    }
    emitted
}
