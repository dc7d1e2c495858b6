//! Run lifecycle events.
//!
//! A restart request ([`GlobalRestart`]) is turned by the scoreboard into a
//! [`GlobalReset`], which every collaborator uses to drop its per-run state.
//! The vehicle controller emits [`GameOver`] exactly once per destruction;
//! the scoreboard answers with a [`GameOverSummary`].

use serde::Serialize;

use crate::events::eventbus::BusEvent;

/// Request to start a new run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalRestart;

/// Every collaborator drops its per-run state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalReset;

/// The controlled vehicle finished its destruction sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameOver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreUpdated {
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceUpdated {
    pub distance: f32,
}

/// Final numbers of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameOverSummary {
    pub score: u32,
    pub distance: f32,
}

impl BusEvent for GlobalRestart {}
impl BusEvent for GlobalReset {}
impl BusEvent for GameOver {}
impl BusEvent for ScoreUpdated {}
impl BusEvent for DistanceUpdated {}
impl BusEvent for GameOverSummary {}
