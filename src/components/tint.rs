//! Body color and emissive glow.
//!
//! The [`Tint`] component is the color a renderer should paint a body with.
//! [`TintFlash`] temporarily overrides it; the countdown system restores the
//! saved color once the flash runs out.
//!
//! # Related
//!
//! - [`crate::systems::countdown::update_tint_flashes`] – advances flashes

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::from_hex(0xff0000);
    pub const ORANGE: Color = Color::from_hex(0xff9900);
    pub const YELLOW: Color = Color::from_hex(0xffff00);
    pub const BLUE: Color = Color::from_hex(0x0000ff);
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xffffff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Color tint component for rendering.
#[derive(Component, Clone, Debug, Copy, PartialEq)]
pub struct Tint {
    pub color: Color,
    /// Glow color, if any.
    pub emissive: Option<Color>,
    pub emissive_intensity: f32,
}

impl Tint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            emissive: None,
            emissive_intensity: 0.0,
        }
    }

    pub fn glow(&mut self, color: Color, intensity: f32) {
        self.emissive = Some(color);
        self.emissive_intensity = intensity;
    }

    pub fn clear_glow(&mut self) {
        self.emissive = None;
        self.emissive_intensity = 0.0;
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

/// Temporary color override with the color to put back afterwards.
#[derive(Component, Clone, Debug, Copy, PartialEq)]
pub struct TintFlash {
    pub restore: Color,
    /// Seconds left before `restore` is applied.
    pub remaining: f32,
}
