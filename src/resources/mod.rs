//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by listeners during execution: registries, controller state,
//! configuration and timing.
//!
//! Overview
//! - `collisionsystem` – category registries and filtered collision listeners
//! - `gameconfig` – tuning values loaded from an INI file
//! - `gamestate` – score, distance and race state
//! - `obstacles` – hazard field bookkeeping and spawn timer
//! - `particlefield` – short-lived visual particles
//! - `traffic` – autonomous vehicles and their spawn clocks
//! - `vehiclephysics` – controlled vehicle speed, offset and destruction state
//! - `worldtime` – simulation time and delta
pub mod collisionsystem;
pub mod gameconfig;
pub mod gamestate;
pub mod obstacles;
pub mod particlefield;
pub mod traffic;
pub mod vehiclephysics;
pub mod worldtime;
