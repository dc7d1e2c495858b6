//! Lanerace simulation core.
//!
//! This crate exposes the ECS components, resources, systems and events of a
//! lane-based driving simulation: a typed event bus, an axis-aligned collision
//! system with a category permission matrix, a vehicle physics controller and
//! the hazard, traffic and scoreboard collaborators wired around them.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
