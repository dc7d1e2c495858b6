//! Per-entity countdowns.
//!
//! Deferred effects are stored as components and advanced on every frame
//! tick, so a reset that removes the component cancels the effect.
//!
//! - [`TintFlash`] puts back the saved color when it runs out.
//! - [`Ttl`] unregisters the entity from the collision system and despawns it.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::category::CategoryTag;
use crate::components::tint::{Color, Tint, TintFlash};
use crate::components::ttl::Ttl;
use crate::error::ListenerResult;
use crate::events::frame::FrameTick;
use crate::systems::collision::unregister_entity;

/// Paint `entity` with `color` for `seconds`, then restore its previous color.
///
/// Flashing an entity that is already flashing restarts the countdown and
/// keeps the color saved by the first flash.
pub fn flash_tint(world: &mut World, entity: Entity, color: Color, seconds: f32) {
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        return;
    };
    let restore = match (entity_mut.get::<TintFlash>(), entity_mut.get::<Tint>()) {
        (Some(flash), _) => flash.restore,
        (None, Some(tint)) => tint.color,
        (None, None) => return,
    };
    if let Some(mut tint) = entity_mut.get_mut::<Tint>() {
        tint.color = color;
    }
    entity_mut.insert(TintFlash {
        restore,
        remaining: seconds,
    });
}

/// Count down every [`TintFlash`] and restore finished ones.
pub fn update_tint_flashes(world: &mut World, dt: f32) {
    let mut finished = Vec::new();
    let mut query = world.query::<(Entity, &mut TintFlash, &mut Tint)>();
    for (entity, mut flash, mut tint) in query.iter_mut(world) {
        flash.remaining -= dt;
        if flash.remaining <= 0.0 {
            tint.color = flash.restore;
            finished.push(entity);
        }
    }
    for entity in finished {
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.remove::<TintFlash>();
        }
    }
}

/// Count down every [`Ttl`]; expired entities leave the collision system and are despawned.
pub fn update_ttls(world: &mut World, dt: f32) {
    let mut expired = Vec::new();
    let mut query = world.query::<(Entity, &mut Ttl, Option<&CategoryTag>)>();
    for (entity, mut ttl, tag) in query.iter_mut(world) {
        if ttl.tick(dt) {
            expired.push((entity, tag.map(|t| t.0)));
        }
    }
    for (entity, category) in expired {
        if let Some(category) = category {
            unregister_entity(world, entity, category);
        }
        world.despawn(entity);
        debug!("ttl expired for {:?}", entity);
    }
}

/// Frame tick listener advancing all countdowns.
pub fn on_frame(world: &mut World, tick: &FrameTick) -> ListenerResult {
    update_tint_flashes(world, tick.delta);
    update_ttls(world, tick.delta);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::category::EntityCategory;
    use crate::resources::collisionsystem::CollisionSystem;
    use crate::systems::collision::register_entity;

    #[test]
    fn test_flash_restores_color() {
        let mut world = World::new();
        let e = world.spawn(Tint::new(Color::RED)).id();
        flash_tint(&mut world, e, Color::ORANGE, 0.5);
        assert_eq!(world.get::<Tint>(e).unwrap().color, Color::ORANGE);
        update_tint_flashes(&mut world, 0.25);
        assert_eq!(world.get::<Tint>(e).unwrap().color, Color::ORANGE);
        update_tint_flashes(&mut world, 0.25);
        assert_eq!(world.get::<Tint>(e).unwrap().color, Color::RED);
        assert!(world.get::<TintFlash>(e).is_none());
    }

    #[test]
    fn test_reflash_keeps_original_color() {
        let mut world = World::new();
        let e = world.spawn(Tint::new(Color::RED)).id();
        flash_tint(&mut world, e, Color::ORANGE, 0.5);
        flash_tint(&mut world, e, Color::YELLOW, 1.0);
        update_tint_flashes(&mut world, 0.5);
        assert_eq!(world.get::<Tint>(e).unwrap().color, Color::YELLOW);
        update_tint_flashes(&mut world, 0.5);
        assert_eq!(world.get::<Tint>(e).unwrap().color, Color::RED);
    }

    #[test]
    fn test_flash_without_tint_is_noop() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        flash_tint(&mut world, e, Color::ORANGE, 0.5);
        assert!(world.get::<TintFlash>(e).is_none());
    }

    #[test]
    fn test_ttl_unregisters_and_despawns() {
        let mut world = World::new();
        world.insert_resource(CollisionSystem::new());
        let e = world.spawn(Ttl::new(0.5)).id();
        register_entity(&mut world, e, EntityCategory::AutonomousVehicle);
        update_ttls(&mut world, 0.25);
        assert!(world.get_entity(e).is_ok());
        update_ttls(&mut world, 0.25);
        assert!(world.get_entity(e).is_err());
        assert!(
            world
                .resource::<CollisionSystem>()
                .entities(EntityCategory::AutonomousVehicle)
                .is_empty()
        );
    }
}
