//! Control intent events.
//!
//! Raw keyboard and touch capture live outside the simulation; whatever
//! drives it reduces input to a [`ControlIntent`] and emits
//! [`ControlIntentUpdated`] whenever the intent changes.

use serde::{Deserialize, Serialize};

use crate::events::eventbus::BusEvent;

/// Four directional booleans held by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlIntent {
    /// Accelerate.
    pub forward: bool,
    /// Brake.
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl ControlIntent {
    pub fn throttle() -> Self {
        Self {
            forward: true,
            ..Self::default()
        }
    }
}

/// Replaces the controlled vehicle's stored intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlIntentUpdated(pub ControlIntent);

impl BusEvent for ControlIntentUpdated {}
