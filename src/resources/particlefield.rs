//! Short-lived visual particles owned by the controller that spawned them.
//!
//! Particles never collide and never enter the ECS world; each owner keeps a
//! [`ParticleField`] and advances it once per frame. Motion is expressed per
//! 1/60 s step and scaled by `dt * 60`.

use fastrand::Rng;
use glam::Vec3;
use serde::Serialize;

use crate::components::tint::Color;

/// Downward velocity change per step.
const GRAVITY_PER_STEP: f32 = 0.02;

/// How a particle's lifetime runs out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decay {
    /// Lifetime decreases by elapsed seconds.
    RealTime,
    /// Lifetime decreases by a fixed amount per step.
    PerStep(f32),
}

/// Parameters of one burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstSpec {
    pub count: usize,
    pub color: Color,
    /// Horizontal velocity range, centered on zero.
    pub spread: f32,
    /// Upper bound of the initial upward velocity.
    pub lift: f32,
    pub lifetime: f32,
    /// Lifetime at which opacity is 1.0.
    pub fade: f32,
    pub decay: Decay,
}

impl BurstSpec {
    /// 30 particles living two seconds; opacity equals remaining lifetime.
    pub fn explosion(color: Color) -> Self {
        Self {
            count: 30,
            color,
            spread: 1.0,
            lift: 1.0,
            lifetime: 2.0,
            fade: 1.0,
            decay: Decay::RealTime,
        }
    }

    /// Smaller burst used for wrecked traffic.
    pub fn wreck() -> Self {
        Self {
            count: 20,
            color: Color::RED,
            spread: 0.8,
            lift: 0.8,
            lifetime: 1.5,
            fade: 1.5,
            decay: Decay::PerStep(0.05),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub lifetime: f32,
    pub opacity: f32,
    pub color: Color,
    #[serde(skip)]
    fade: f32,
    #[serde(skip)]
    decay: Decay,
}

#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

fn random_f32_range(rng: &mut Rng, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range < f32::EPSILON {
        return min;
    }
    min + rng.f32() * range
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `spec.count` particles at `origin` with random velocities.
    pub fn burst(&mut self, rng: &mut Rng, origin: Vec3, spec: &BurstSpec) {
        let half = spec.spread * 0.5;
        self.particles.reserve(spec.count);
        for _ in 0..spec.count {
            let velocity = Vec3::new(
                random_f32_range(rng, -half, half),
                random_f32_range(rng, 0.0, spec.lift),
                random_f32_range(rng, -half, half),
            );
            self.particles.push(Particle {
                position: origin,
                velocity,
                lifetime: spec.lifetime,
                opacity: (spec.lifetime / spec.fade).min(1.0),
                color: spec.color,
                fade: spec.fade,
                decay: spec.decay,
            });
        }
    }

    /// Advance every particle by `dt` seconds and drop the expired ones.
    pub fn update(&mut self, dt: f32) {
        let steps = dt * 60.0;
        self.particles.retain_mut(|p| {
            p.position += p.velocity * steps;
            p.velocity.y -= GRAVITY_PER_STEP * steps;
            p.lifetime -= match p.decay {
                Decay::RealTime => dt,
                Decay::PerStep(amount) => amount * steps,
            };
            p.opacity = (p.lifetime / p.fade).clamp(0.0, 1.0);
            p.lifetime > 0.0
        });
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
