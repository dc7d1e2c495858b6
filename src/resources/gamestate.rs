//! Run-level game state.
//!
//! The [`Scoreboard`] tracks the authoritative state of the current run: the
//! score earned from collectible hazards, the distance reported by the
//! vehicle controller and whether the run has ended. See
//! [`crate::systems::gamestate`] for the listeners that keep it current.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

/// Discrete high-level states a run can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RaceState {
    #[default]
    Racing,
    GameOver,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scoreboard {
    pub score: u32,
    pub distance: f32,
    state: RaceState,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the current state.
    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == RaceState::GameOver
    }

    pub fn finish(&mut self) {
        self.state = RaceState::GameOver;
    }

    /// Back to a fresh run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
