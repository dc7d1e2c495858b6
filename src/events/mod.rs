//! Event types and the bus that carries them.
//!
//! Collaborators never call each other directly: they publish events on the
//! [`eventbus::EventBus`] resource and subscribe to the ones they care about.
//!
//! Submodules:
//! - [`collision`] – collision notifications and their Side/Front/Back classification
//! - [`eventbus`] – typed publish/subscribe bus stored as a world resource
//! - [`frame`] – per-frame tick
//! - [`gamestate`] – restart, reset, game over and score notifications
//! - [`input`] – control intent of the driver
//! - [`vehicle`] – vehicle lifecycle, road bounds, telemetry and traffic collisions
//!
//! See each submodule for concrete event data and semantics.
pub mod collision;
pub mod eventbus;
pub mod frame;
pub mod gamestate;
pub mod input;
pub mod vehicle;
