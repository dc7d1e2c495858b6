use crate::events::eventbus::BusEvent;

/// One simulation step. `delta` is in seconds and never exceeds 0.1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub delta: f32,
}

impl BusEvent for FrameTick {}
