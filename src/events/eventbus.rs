//! Typed publish/subscribe bus.
//!
//! The [`EventBus`] is a resource of the simulation world. Topics are keyed by
//! the Rust type of the event, so the payload contract is the type itself.
//! Listeners receive `&mut World` and may emit further events, subscribe or
//! unsubscribe while being dispatched.
//!
//! # Dispatch
//!
//! [`EventBus::emit`] copies the listener list for the topic before invoking
//! anything. Listeners added during an emit are first called on the next emit
//! of that topic; listeners removed during an emit are still called by the
//! emit that was already running. A listener returning an error is logged
//! with `warn!`, a panicking listener is caught and logged with `error!`, and
//! in both cases the remaining listeners still run.
//!
//! # Example
//!
//! ```
//! use bevy_ecs::prelude::*;
//! use lanerace::events::eventbus::{BusEvent, EventBus};
//!
//! struct Ping(u32);
//! impl BusEvent for Ping {}
//!
//! #[derive(Resource, Default)]
//! struct Seen(u32);
//!
//! let mut world = World::new();
//! world.init_resource::<Seen>();
//! world.insert_resource(EventBus::default());
//! world.resource_mut::<EventBus>().subscribe(|world: &mut World, ping: &Ping| {
//!     world.resource_mut::<Seen>().0 += ping.0;
//!     Ok(())
//! });
//! EventBus::emit(&mut world, &Ping(3));
//! assert_eq!(world.resource::<Seen>().0, 3);
//! ```

use std::any::{Any, TypeId, type_name};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use bevy_ecs::prelude::*;
use log::{error, warn};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::ListenerResult;

/// Marker for types that can travel on the bus.
pub trait BusEvent: Send + Sync + 'static {}

/// Handle returned by a subscription; used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

pub type BusCallback<E> = Arc<dyn Fn(&mut World, &E) -> ListenerResult + Send + Sync>;

struct Listener<E> {
    id: ListenerId,
    callback: BusCallback<E>,
}

struct Topic<E> {
    listeners: Vec<Listener<E>>,
}

/// Listener registry for every event type.
#[derive(Resource, Default)]
pub struct EventBus {
    topics: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn topic<E: BusEvent>(&self) -> Option<&Topic<E>> {
        self.topics
            .get(&TypeId::of::<E>())
            .and_then(|t| t.downcast_ref::<Topic<E>>())
    }

    fn topic_mut<E: BusEvent>(&mut self) -> Option<&mut Topic<E>> {
        self.topics
            .get_mut(&TypeId::of::<E>())
            .and_then(|t| t.downcast_mut::<Topic<E>>())
    }

    /// Register `callback` for events of type `E`.
    ///
    /// Subscribing the same closure twice registers two independent listeners.
    pub fn subscribe<E, F>(&mut self, callback: F) -> ListenerId
    where
        E: BusEvent,
        F: Fn(&mut World, &E) -> ListenerResult + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        let topic = self
            .topics
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                Box::new(Topic::<E> {
                    listeners: Vec::new(),
                })
            });
        if let Some(topic) = topic.downcast_mut::<Topic<E>>() {
            topic.listeners.push(Listener {
                id,
                callback: Arc::new(callback),
            });
        }
        id
    }

    /// Remove a listener. Unknown ids are ignored and return `false`.
    pub fn unsubscribe<E: BusEvent>(&mut self, id: ListenerId) -> bool {
        let Some(topic) = self.topic_mut::<E>() else {
            return false;
        };
        let before = topic.listeners.len();
        topic.listeners.retain(|l| l.id != id);
        topic.listeners.len() != before
    }

    pub fn listener_count<E: BusEvent>(&self) -> usize {
        self.topic::<E>().map_or(0, |t| t.listeners.len())
    }

    /// Remove every listener of `E`.
    pub fn clear<E: BusEvent>(&mut self) {
        self.topics.remove(&TypeId::of::<E>());
    }

    fn snapshot<E: BusEvent>(&self) -> SmallVec<[BusCallback<E>; 8]> {
        self.topic::<E>()
            .map(|t| t.listeners.iter().map(|l| l.callback.clone()).collect())
            .unwrap_or_default()
    }

    /// Deliver `event` to every listener of `E` subscribed at call time.
    ///
    /// Does nothing when the world has no bus or the topic has no listeners.
    pub fn emit<E: BusEvent>(world: &mut World, event: &E) {
        let listeners = match world.get_resource::<EventBus>() {
            Some(bus) => bus.snapshot::<E>(),
            None => return,
        };
        for callback in listeners {
            run_isolated(type_name::<E>(), || callback(world, event));
        }
    }
}

/// Run one listener, logging (and swallowing) errors and panics.
pub(crate) fn run_isolated<F>(topic: &str, listener: F)
where
    F: FnOnce() -> ListenerResult,
{
    match catch_unwind(AssertUnwindSafe(listener)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!("listener for {} failed: {}", topic, err),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("listener for {} panicked: {}", topic, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl BusEvent for Ping {}

    struct Pong;
    impl BusEvent for Pong {}

    #[test]
    fn test_subscribe_and_count_per_topic() {
        let mut bus = EventBus::new();
        bus.subscribe(|_: &mut World, _: &Ping| Ok(()));
        bus.subscribe(|_: &mut World, _: &Ping| Ok(()));
        bus.subscribe(|_: &mut World, _: &Pong| Ok(()));
        assert_eq!(bus.listener_count::<Ping>(), 2);
        assert_eq!(bus.listener_count::<Pong>(), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(|_: &mut World, _: &Ping| Ok(()));
        assert!(!bus.unsubscribe::<Pong>(id));
        assert!(!bus.unsubscribe::<Ping>(ListenerId(999)));
        assert!(bus.unsubscribe::<Ping>(id));
        assert!(!bus.unsubscribe::<Ping>(id));
        assert_eq!(bus.listener_count::<Ping>(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(|_: &mut World, _: &Ping| Ok(()));
        let b = bus.subscribe(|_: &mut World, _: &Pong| Ok(()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_emit_without_bus_is_noop() {
        let mut world = World::new();
        EventBus::emit(&mut world, &Ping);
    }

    #[test]
    fn test_clear_topic() {
        let mut bus = EventBus::new();
        bus.subscribe(|_: &mut World, _: &Ping| Ok(()));
        bus.clear::<Ping>();
        assert_eq!(bus.listener_count::<Ping>(), 0);
    }
}
