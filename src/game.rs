//! Simulation assembly.
//!
//! [`Simulation`] owns the ECS [`World`], inserts every resource, wires the
//! listeners onto the [`EventBus`] and the [`CollisionSystem`] in a fixed
//! order and exposes the per-frame entry point. A renderer reads the world
//! through [`Simulation::snapshot`].
//!
//! # Listener order
//!
//! - collision listeners: vehicle physics (source = controlled vehicle),
//!   obstacle field (target = hazard A, target = hazard B), traffic
//!   (source = autonomous, target = autonomous);
//! - frame tick: vehicle physics, then countdowns;
//! - physics telemetry: obstacle field, traffic, scoreboard;
//! - restart: scoreboard (publishes the global reset), vehicle physics,
//!   vehicle respawn;
//! - global reset: collision registries, traffic, obstacle field.

use bevy_ecs::prelude::*;
use fastrand::Rng;
use glam::Vec3;
use log::info;
use serde::Serialize;

use crate::components::boxcollider::BoxCollider;
use crate::components::category::{CategoryTag, EntityCategory};
use crate::components::mapposition::MapPosition;
use crate::components::tint::{Color, Tint};
use crate::components::vehicle::ControlledVehicle;
use crate::error::ListenerResult;
use crate::events::eventbus::EventBus;
use crate::events::frame::FrameTick;
use crate::events::gamestate::GlobalRestart;
use crate::events::input::{ControlIntent, ControlIntentUpdated};
use crate::events::vehicle::{ControlledVehicleSpawned, RoadBoundsChanged};
use crate::resources::collisionsystem::{CollisionFilter, CollisionSystem};
use crate::resources::gameconfig::SimConfig;
use crate::resources::gamestate::{RaceState, Scoreboard};
use crate::resources::obstacles::ObstacleField;
use crate::resources::particlefield::Particle;
use crate::resources::traffic::Traffic;
use crate::resources::vehiclephysics::VehiclePhysics;
use crate::resources::worldtime::WorldTime;
use crate::systems::time::update_world_time;
use crate::systems::{countdown, gamestate, obstacles, physics, traffic};

/// Longest frame the simulation will integrate in one step.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Controlled vehicle box: width, height, depth.
const VEHICLE_SIZE: Vec3 = Vec3::new(1.4, 0.8, 2.0);

/// One collidable body as a renderer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct BodySnapshot {
    pub id: u64,
    pub category: EntityCategory,
    pub position: Vec3,
    pub size: Vec3,
    pub color: Color,
    pub emissive: Option<Color>,
    pub visible: bool,
}

/// Read-only view of a frame.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub elapsed: f32,
    pub state: RaceState,
    pub score: u32,
    pub distance: f32,
    pub speed_kmh: f32,
    pub camera_shake: f32,
    pub vehicle: Option<BodySnapshot>,
    pub traffic: Vec<BodySnapshot>,
    pub hazards: Vec<BodySnapshot>,
    pub particles: Vec<Particle>,
}

pub struct Simulation {
    world: World,
    config: SimConfig,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self::with_rng(config, Rng::new())
    }

    /// Deterministic simulation: the same seed and inputs give the same run.
    pub fn with_seed(config: SimConfig, seed: u64) -> Self {
        Self::with_rng(config, Rng::with_seed(seed))
    }

    fn with_rng(config: SimConfig, mut rng: Rng) -> Self {
        let max_lateral = config.road.max_lateral();
        let mut world = World::new();
        world.insert_resource(EventBus::new());
        world.insert_resource(CollisionSystem::new());
        world.insert_resource(WorldTime::default());
        world.insert_resource(VehiclePhysics::with_rng(
            config.physics,
            max_lateral,
            rng.fork(),
        ));
        world.insert_resource(ObstacleField::new(
            config.obstacles,
            max_lateral,
            rng.fork(),
        ));
        world.insert_resource(Traffic::new(config.traffic, max_lateral, rng.fork()));
        world.insert_resource(Scoreboard::new());
        world.insert_resource(config.clone());

        wire_listeners(&mut world);
        EventBus::emit(&mut world, &RoadBoundsChanged { max_lateral });

        Self { world, config }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Spawn the controlled vehicle at the origin and hand it to the controller.
    pub fn spawn_controlled_vehicle(&mut self) -> Entity {
        let entity = self
            .world
            .spawn((
                MapPosition::new(0.0, 0.0, 0.0),
                BoxCollider::new(VEHICLE_SIZE.x, VEHICLE_SIZE.y, VEHICLE_SIZE.z)
                    .with_offset(Vec3::new(0.0, VEHICLE_SIZE.y / 2.0, 0.0)),
                Tint::new(physics::VEHICLE_COLOR),
                ControlledVehicle,
            ))
            .id();
        EventBus::emit(&mut self.world, &ControlledVehicleSpawned { entity });
        info!("controlled vehicle spawned as {:?}", entity);
        entity
    }

    pub fn set_controls(&mut self, intent: ControlIntent) {
        EventBus::emit(&mut self.world, &ControlIntentUpdated(intent));
    }

    /// Advance one frame of `dt` seconds. The scaled delta handed to
    /// listeners is capped to [`MAX_FRAME_DELTA`].
    ///
    /// Returns `false` without doing anything once the game is over.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_game_over() {
            return false;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let delta = update_world_time(&mut self.world, dt, MAX_FRAME_DELTA);
        EventBus::emit(&mut self.world, &FrameTick { delta });
        true
    }

    pub fn restart(&mut self) {
        EventBus::emit(&mut self.world, &GlobalRestart);
    }

    pub fn is_game_over(&self) -> bool {
        self.world.resource::<Scoreboard>().is_game_over()
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<Scoreboard>().score
    }

    pub fn physics(&self) -> &VehiclePhysics {
        self.world.resource::<VehiclePhysics>()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let world = &self.world;
        let time = world.resource::<WorldTime>();
        let board = world.resource::<Scoreboard>();
        let physics = world.resource::<VehiclePhysics>();
        let traffic = world.resource::<Traffic>();
        let field = world.resource::<ObstacleField>();

        let vehicle = physics
            .vehicle
            .and_then(|e| body(world, e, EntityCategory::ControlledVehicle))
            .map(|mut b| {
                b.visible = physics.vehicle_visible();
                b
            });
        let cars = traffic
            .cars
            .iter()
            .filter_map(|&e| body(world, e, EntityCategory::AutonomousVehicle))
            .collect();
        let hazards = field
            .hazards
            .iter()
            .filter_map(|&e| {
                let category = world.get::<CategoryTag>(e)?.0;
                body(world, e, category)
            })
            .collect();
        let particles = physics
            .particles
            .iter()
            .chain(traffic.particles.iter())
            .copied()
            .collect();

        RenderSnapshot {
            frame: time.frame_count,
            elapsed: time.elapsed,
            state: board.state(),
            score: board.score,
            distance: board.distance,
            speed_kmh: physics.display_speed(),
            camera_shake: physics.camera_shake(),
            vehicle,
            traffic: cars,
            hazards,
            particles,
        }
    }
}

fn body(world: &World, entity: Entity, category: EntityCategory) -> Option<BodySnapshot> {
    let entity_ref = world.get_entity(entity).ok()?;
    let position = entity_ref.get::<MapPosition>()?;
    let collider = entity_ref.get::<BoxCollider>()?;
    let tint = entity_ref.get::<Tint>().copied().unwrap_or_default();
    Some(BodySnapshot {
        id: entity.to_bits(),
        category,
        position: position.pos,
        size: collider.size,
        color: tint.color,
        emissive: tint.emissive,
        visible: true,
    })
}

/// Restart listener: put the vehicle back on the origin and announce it again.
fn respawn_vehicle(world: &mut World, _: &GlobalRestart) -> ListenerResult {
    let Some(entity) = world.resource::<VehiclePhysics>().vehicle else {
        return Ok(());
    };
    if let Some(mut position) = world.get_mut::<MapPosition>(entity) {
        position.pos = Vec3::ZERO;
    }
    EventBus::emit(world, &ControlledVehicleSpawned { entity });
    Ok(())
}

fn wire_listeners(world: &mut World) {
    {
        let mut collisions = world.resource_mut::<CollisionSystem>();
        collisions.add_event_listener(
            CollisionFilter::source(EntityCategory::ControlledVehicle),
            physics::on_collision,
        );
        collisions.add_event_listener(
            CollisionFilter::target(EntityCategory::HazardTypeA),
            obstacles::on_collectible_contact,
        );
        collisions.add_event_listener(
            CollisionFilter::target(EntityCategory::HazardTypeB),
            obstacles::on_solid_contact,
        );
        collisions.add_event_listener(
            CollisionFilter::source(EntityCategory::AutonomousVehicle),
            traffic::on_collision_as_source,
        );
        collisions.add_event_listener(
            CollisionFilter::target(EntityCategory::AutonomousVehicle),
            traffic::on_collision_as_target,
        );
    }

    let mut bus = world.resource_mut::<EventBus>();

    // frame
    bus.subscribe(physics::on_frame);
    bus.subscribe(countdown::on_frame);

    // controller inputs
    bus.subscribe(physics::on_controls);
    bus.subscribe(physics::on_road_bounds);
    bus.subscribe(obstacles::on_road_bounds);
    bus.subscribe(traffic::on_road_bounds);
    bus.subscribe(physics::on_vehicle_spawned);

    // hazards
    bus.subscribe(physics::on_hazard_hit);
    bus.subscribe(physics::on_hazard_destroyed);
    bus.subscribe(gamestate::on_hazard_destroyed);

    // telemetry
    bus.subscribe(obstacles::on_physics_updated);
    bus.subscribe(traffic::on_physics_updated);
    bus.subscribe(gamestate::on_physics_updated);

    // lifecycle
    bus.subscribe(gamestate::on_game_over);
    bus.subscribe(gamestate::on_restart);
    bus.subscribe(physics::on_restart);
    bus.subscribe(respawn_vehicle);
    bus.subscribe(gamestate::clear_collision_registries);
    bus.subscribe(traffic::on_reset);
    bus.subscribe(obstacles::on_reset);
}
