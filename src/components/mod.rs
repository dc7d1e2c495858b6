//! ECS components for entities.
//!
//! Components carry the data the collision system and the vehicle
//! controllers read and write every frame.
//!
//! Submodules overview:
//! - [`boxcollider`] – axis-aligned box extent centered on the position
//! - [`category`] – collision categories and the permission matrix
//! - [`hazard`] – kind of a static road hazard
//! - [`mapposition`] – world-space position of an entity
//! - [`tint`] – render color, glow and timed color flashes
//! - [`ttl`] – time-to-live countdown before despawn
//! - [`vehicle`] – controlled vehicle marker and autonomous vehicle state

pub mod boxcollider;
pub mod category;
pub mod hazard;
pub mod mapposition;
pub mod tint;
pub mod ttl;
pub mod vehicle;
