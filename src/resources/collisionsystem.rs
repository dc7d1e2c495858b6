//! Collision registries and filtered collision listeners.
//!
//! [`CollisionSystem`] holds the ids of every collidable body, grouped by
//! [`EntityCategory`], plus the listeners that want to hear about specific
//! pairs. It stores `Entity` ids only; the collaborator that spawned a body
//! owns its lifetime and unregisters it before despawning.
//!
//! The detection passes themselves live in
//! [`crate::systems::collision::check_collisions`].

use std::sync::Arc;

use bevy_ecs::prelude::*;
use smallvec::SmallVec;

use crate::components::category::EntityCategory;
use crate::error::ListenerResult;
use crate::events::collision::CollisionEvent;
use crate::events::eventbus::ListenerId;

pub type CollisionCallback =
    Arc<dyn Fn(&mut World, &CollisionEvent) -> ListenerResult + Send + Sync>;

/// Restricts a collision listener to events with the given categories.
///
/// `None` fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFilter {
    pub source: Option<EntityCategory>,
    pub target: Option<EntityCategory>,
}

impl CollisionFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn source(category: EntityCategory) -> Self {
        Self {
            source: Some(category),
            target: None,
        }
    }

    pub fn target(category: EntityCategory) -> Self {
        Self {
            source: None,
            target: Some(category),
        }
    }

    pub fn matches(&self, event: &CollisionEvent) -> bool {
        self.source.is_none_or(|c| c == event.source_category)
            && self.target.is_none_or(|c| c == event.target_category)
    }
}

struct CollisionListener {
    id: ListenerId,
    filter: CollisionFilter,
    callback: CollisionCallback,
}

#[derive(Resource, Default)]
pub struct CollisionSystem {
    controlled: Option<Entity>,
    autonomous: Vec<Entity>,
    hazards_a: Vec<Entity>,
    hazards_b: Vec<Entity>,
    listeners: Vec<CollisionListener>,
    next_id: u64,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry_mut(&mut self, category: EntityCategory) -> Option<&mut Vec<Entity>> {
        match category {
            EntityCategory::ControlledVehicle => None,
            EntityCategory::AutonomousVehicle => Some(&mut self.autonomous),
            EntityCategory::HazardTypeA => Some(&mut self.hazards_a),
            EntityCategory::HazardTypeB => Some(&mut self.hazards_b),
        }
    }

    /// Add `entity` to the registry of `category`.
    ///
    /// The controlled vehicle slot holds a single entity and is replaced.
    /// Registering the same id twice in a collection registers it twice.
    pub fn register(&mut self, entity: Entity, category: EntityCategory) {
        match self.registry_mut(category) {
            Some(list) => list.push(entity),
            None => self.controlled = Some(entity),
        }
    }

    /// Remove the first registration of `entity` under `category`.
    ///
    /// Returns `false` when nothing was registered.
    pub fn unregister(&mut self, entity: Entity, category: EntityCategory) -> bool {
        match self.registry_mut(category) {
            Some(list) => match list.iter().position(|&e| e == entity) {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            },
            None => {
                if self.controlled == Some(entity) {
                    self.controlled = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn is_registered(&self, entity: Entity, category: EntityCategory) -> bool {
        self.entities(category).contains(&entity)
    }

    /// Registered ids of `category`, in registration order.
    pub fn entities(&self, category: EntityCategory) -> &[Entity] {
        match category {
            EntityCategory::ControlledVehicle => self.controlled.as_slice(),
            EntityCategory::AutonomousVehicle => &self.autonomous,
            EntityCategory::HazardTypeA => &self.hazards_a,
            EntityCategory::HazardTypeB => &self.hazards_b,
        }
    }

    pub fn controlled(&self) -> Option<Entity> {
        self.controlled
    }

    /// Drop every registration. Listeners are kept.
    pub fn clear(&mut self) {
        self.controlled = None;
        self.autonomous.clear();
        self.hazards_a.clear();
        self.hazards_b.clear();
    }

    /// Register a collision listener restricted by `filter`.
    pub fn add_event_listener<F>(&mut self, filter: CollisionFilter, callback: F) -> ListenerId
    where
        F: Fn(&mut World, &CollisionEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(CollisionListener {
            id,
            filter,
            callback: Arc::new(callback),
        });
        id
    }

    /// Remove a collision listener. Unknown ids are ignored.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Callbacks whose filter accepts `event`, in registration order.
    pub fn matching_listeners(&self, event: &CollisionEvent) -> SmallVec<[CollisionCallback; 4]> {
        self.listeners
            .iter()
            .filter(|l| l.filter.matches(event))
            .map(|l| l.callback.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::collision::CollisionKind;
    use glam::Vec3;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn event(
        source: Entity,
        source_category: EntityCategory,
        target: Entity,
        target_category: EntityCategory,
    ) -> CollisionEvent {
        CollisionEvent {
            source,
            source_category,
            target,
            target_category,
            kind: CollisionKind::Front,
            position: Vec3::ZERO,
        }
    }

    #[test]
    fn test_controlled_slot_is_replaced() {
        let e = entities(2);
        let mut cs = CollisionSystem::new();
        cs.register(e[0], EntityCategory::ControlledVehicle);
        cs.register(e[1], EntityCategory::ControlledVehicle);
        assert_eq!(cs.controlled(), Some(e[1]));
        assert!(!cs.unregister(e[0], EntityCategory::ControlledVehicle));
        assert!(cs.unregister(e[1], EntityCategory::ControlledVehicle));
        assert_eq!(cs.controlled(), None);
    }

    #[test]
    fn test_register_keeps_order_and_unregister_first_match() {
        let e = entities(3);
        let mut cs = CollisionSystem::new();
        cs.register(e[0], EntityCategory::AutonomousVehicle);
        cs.register(e[1], EntityCategory::AutonomousVehicle);
        cs.register(e[0], EntityCategory::AutonomousVehicle);
        assert_eq!(cs.entities(EntityCategory::AutonomousVehicle), &[e[0], e[1], e[0]]);
        assert!(cs.unregister(e[0], EntityCategory::AutonomousVehicle));
        assert_eq!(cs.entities(EntityCategory::AutonomousVehicle), &[e[1], e[0]]);
        assert!(!cs.unregister(e[2], EntityCategory::AutonomousVehicle));
        assert!(!cs.unregister(e[1], EntityCategory::HazardTypeA));
    }

    #[test]
    fn test_clear_keeps_listeners() {
        let e = entities(2);
        let mut cs = CollisionSystem::new();
        cs.register(e[0], EntityCategory::ControlledVehicle);
        cs.register(e[1], EntityCategory::HazardTypeB);
        cs.add_event_listener(CollisionFilter::any(), |_, _| Ok(()));
        cs.clear();
        assert_eq!(cs.controlled(), None);
        assert!(cs.entities(EntityCategory::HazardTypeB).is_empty());
        assert_eq!(cs.listener_count(), 1);
    }

    #[test]
    fn test_filter_matching() {
        let e = entities(2);
        let ev = event(
            e[0],
            EntityCategory::AutonomousVehicle,
            e[1],
            EntityCategory::HazardTypeA,
        );
        assert!(CollisionFilter::any().matches(&ev));
        assert!(CollisionFilter::source(EntityCategory::AutonomousVehicle).matches(&ev));
        assert!(CollisionFilter::target(EntityCategory::HazardTypeA).matches(&ev));
        assert!(!CollisionFilter::target(EntityCategory::HazardTypeB).matches(&ev));
        let both = CollisionFilter {
            source: Some(EntityCategory::ControlledVehicle),
            target: Some(EntityCategory::HazardTypeA),
        };
        assert!(!both.matches(&ev));
    }

    #[test]
    fn test_matching_listeners_and_removal() {
        let e = entities(2);
        let mut cs = CollisionSystem::new();
        let a = cs.add_event_listener(CollisionFilter::target(EntityCategory::HazardTypeA), |_, _| {
            Ok(())
        });
        cs.add_event_listener(CollisionFilter::target(EntityCategory::HazardTypeB), |_, _| Ok(()));
        let ev = event(
            e[0],
            EntityCategory::ControlledVehicle,
            e[1],
            EntityCategory::HazardTypeA,
        );
        assert_eq!(cs.matching_listeners(&ev).len(), 1);
        assert!(cs.remove_event_listener(a));
        assert!(!cs.remove_event_listener(a));
        assert!(cs.matching_listeners(&ev).is_empty());
    }
}
