//! Simulation systems.
//!
//! Functions that run against the [`bevy_ecs::world::World`]: per-frame
//! passes and the listeners subscribed on the event bus or the collision
//! system.
//!
//! Submodules overview
//! - [`collision`] – registration helpers and the per-frame overlap pass
//! - [`countdown`] – tint flash reversion and time-to-live despawns
//! - [`gamestate`] – scoreboard listeners and global reset fan-out
//! - [`obstacles`] – hazard spawning, scrolling and contact routing
//! - [`physics`] – controlled vehicle integration, impacts and destruction
//! - [`time`] – update simulation time and delta
//! - [`traffic`] – autonomous vehicle spawning, movement and collision reactions
pub mod collision;
pub mod countdown;
pub mod gamestate;
pub mod obstacles;
pub mod physics;
pub mod time;
pub mod traffic;
