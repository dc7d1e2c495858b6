//! Traffic integration tests.
//!
//! Reactions of autonomous vehicles to the controlled vehicle, to each other
//! and to hazards, plus spawn clocks, lanes and culling, driven frame by frame
//! through [`Simulation`].
//!
//! ```sh
//! cargo test --test traffic_integration
//! ```

use bevy_ecs::prelude::*;
use glam::Vec3;

use lanerace::components::category::EntityCategory;
use lanerace::components::hazard::Hazard;
use lanerace::components::mapposition::MapPosition;
use lanerace::components::tint::{Color, Tint};
use lanerace::components::ttl::Ttl;
use lanerace::components::vehicle::AutonomousVehicle;
use lanerace::events::collision::{CollisionKind, HazardHit};
use lanerace::events::eventbus::EventBus;
use lanerace::events::vehicle::{TrafficCollision, TrafficHazardCollision};
use lanerace::game::Simulation;
use lanerace::resources::collisionsystem::CollisionSystem;
use lanerace::resources::gameconfig::SimConfig;
use lanerace::resources::traffic::Traffic;
use lanerace::systems::obstacles::spawn_hazard;
use lanerace::systems::traffic::spawn_autonomous_vehicle;

// =============================================================================
// Helpers
// =============================================================================

const EPSILON: f32 = 1e-4;
/// 7.5 steps of 1/60 s per frame.
const DT: f32 = 0.125;
const STEPS: f32 = DT * 60.0;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Resource, Default)]
struct Heard {
    contacts: Vec<TrafficCollision>,
    hazard_contacts: Vec<TrafficHazardCollision>,
    hits: Vec<HazardHit>,
}

fn quiet_config() -> SimConfig {
    let mut config = SimConfig::new();
    config.obstacles.enabled = false;
    config.traffic.enabled = false;
    config
}

fn make_sim(config: SimConfig) -> (Simulation, Entity) {
    let mut sim = Simulation::with_seed(config, 21);
    let vehicle = sim.spawn_controlled_vehicle();
    let world = sim.world_mut();
    world.init_resource::<Heard>();
    let mut bus = world.resource_mut::<EventBus>();
    bus.subscribe(|w: &mut World, e: &TrafficCollision| {
        w.resource_mut::<Heard>().contacts.push(*e);
        Ok(())
    });
    bus.subscribe(|w: &mut World, e: &TrafficHazardCollision| {
        w.resource_mut::<Heard>().hazard_contacts.push(*e);
        Ok(())
    });
    bus.subscribe(|w: &mut World, e: &HazardHit| {
        w.resource_mut::<Heard>().hits.push(*e);
        Ok(())
    });
    (sim, vehicle)
}

/// A forward car matching the controlled vehicle's starting speed, so it
/// keeps its distance until something happens.
fn place_car(sim: &mut Simulation, x: f32, z: f32) -> Entity {
    spawn_autonomous_vehicle(
        sim.world_mut(),
        AutonomousVehicle::new(0.05, true, false),
        Vec3::new(x, 0.0, z),
        Color::WHITE,
    )
}

fn car(sim: &Simulation, entity: Entity) -> AutonomousVehicle {
    *sim.world().get::<AutonomousVehicle>(entity).unwrap()
}

fn position(sim: &Simulation, entity: Entity) -> Vec3 {
    sim.world().get::<MapPosition>(entity).unwrap().pos
}

fn color(sim: &Simulation, entity: Entity) -> Color {
    sim.world().get::<Tint>(entity).unwrap().color
}

fn heard(sim: &Simulation) -> &Heard {
    sim.world().resource::<Heard>()
}

fn is_gone(sim: &Simulation, entity: Entity) -> bool {
    sim.world().get_entity(entity).is_err()
        && !sim.world().resource::<Traffic>().cars.contains(&entity)
        && !sim
            .world()
            .resource::<CollisionSystem>()
            .is_registered(entity, EntityCategory::AutonomousVehicle)
}

// =============================================================================
// Contacts with the controlled vehicle
// =============================================================================

#[test]
fn side_contact_pushes_the_car_away() {
    let (mut sim, vehicle) = make_sim(quiet_config());
    let right = place_car(&mut sim, 1.2, -0.2);

    sim.tick(DT);

    let pushed = car(&sim, right);
    assert!(approx_eq(pushed.push_velocity, 0.3 * 0.95f32.powf(STEPS)));
    assert!(!pushed.collision_stopped);
    assert!(approx_eq(position(&sim, right).x, 1.2 + 0.3 * STEPS));

    let contacts = &heard(&sim).contacts;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].vehicle, right);
    assert_eq!(contacts[0].other, vehicle);
    assert_eq!(contacts[0].kind, CollisionKind::Side);
}

#[test]
fn side_contact_on_the_left_pushes_left() {
    let (mut sim, _) = make_sim(quiet_config());
    let left = place_car(&mut sim, -1.2, -0.2);

    sim.tick(DT);

    assert!(car(&sim, left).push_velocity < 0.0);
    assert!(approx_eq(position(&sim, left).x, -1.2 - 0.3 * STEPS));
}

#[test]
fn push_decays_to_rest() {
    let (mut sim, _) = make_sim(quiet_config());
    let pushed = place_car(&mut sim, 1.2, -0.2);

    for _ in 0..20 {
        sim.tick(DT);
    }

    assert_eq!(car(&sim, pushed).push_velocity, 0.0);
    let x = position(&sim, pushed).x;
    assert!(x > 1.2 + 0.3 * STEPS);
    assert!(x < 10.0);
}

#[test]
fn push_is_clamped_to_the_road() {
    let (mut sim, _) = make_sim(quiet_config());
    let right = place_car(&mut sim, 9.0, -40.0);
    let left = place_car(&mut sim, -9.0, -40.0);
    sim.world_mut()
        .get_mut::<AutonomousVehicle>(right)
        .unwrap()
        .push_velocity = 0.3;
    sim.world_mut()
        .get_mut::<AutonomousVehicle>(left)
        .unwrap()
        .push_velocity = -0.3;

    sim.tick(DT);

    assert_eq!(position(&sim, right).x, 10.0);
    assert_eq!(position(&sim, left).x, -10.0);
}

#[test]
fn head_on_contact_stops_the_car() {
    let (mut sim, vehicle) = make_sim(quiet_config());
    let ahead = place_car(&mut sim, 0.0, -1.0);

    sim.tick(DT);

    let stopped = car(&sim, ahead);
    assert_eq!(stopped.speed, 0.0);
    assert!(stopped.collision_stopped);
    assert_eq!(color(&sim, ahead), Color::ORANGE);
    // the controlled vehicle stopped too, so nothing scrolls
    assert!(approx_eq(position(&sim, ahead).z, -1.0));

    let contacts = &heard(&sim).contacts;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].other, vehicle);
    assert_eq!(contacts[0].kind, CollisionKind::Back);
}

// =============================================================================
// Contacts between cars
// =============================================================================

#[test]
fn both_cars_stop_on_contact() {
    let (mut sim, _) = make_sim(quiet_config());
    let first = place_car(&mut sim, 5.0, -30.0);
    let second = place_car(&mut sim, 5.5, -30.0);

    sim.tick(DT);

    for entity in [first, second] {
        let stopped = car(&sim, entity);
        assert_eq!(stopped.speed, 0.0);
        assert!(stopped.collision_stopped);
        assert_eq!(color(&sim, entity), Color::ORANGE);
        // stopped cars scroll with the road at twice the vehicle speed
        assert!(approx_eq(position(&sim, entity).z, -30.0 + 0.1 * STEPS));
    }

    let contacts = &heard(&sim).contacts;
    assert_eq!(contacts.len(), 2);
    assert_eq!((contacts[0].vehicle, contacts[0].other), (first, second));
    assert_eq!((contacts[1].vehicle, contacts[1].other), (second, first));
}

// =============================================================================
// Hazards
// =============================================================================

#[test]
fn solid_hazard_wrecks_the_car_once() {
    let (mut sim, _) = make_sim(quiet_config());
    let wreck = place_car(&mut sim, 5.0, -30.0);
    let hazard = spawn_hazard(sim.world_mut(), Hazard::solid(), Vec3::new(5.0, 0.5, -30.0));

    sim.tick(DT);

    assert!(car(&sim, wreck).collision_stopped);
    assert!(sim.world().get::<Ttl>(wreck).is_some());
    assert_eq!(
        sim.world().get::<Tint>(wreck).unwrap().emissive,
        Some(Color::RED)
    );
    assert_eq!(sim.world().resource::<Traffic>().particles.len(), 20);
    assert_eq!(heard(&sim).hits.len(), 1);
    assert_eq!(heard(&sim).hits[0].collided_with, wreck);
    let contacts = &heard(&sim).hazard_contacts;
    assert_eq!(contacts.len(), 1);
    assert_eq!((contacts[0].vehicle, contacts[0].hazard), (wreck, hazard));

    // still touching the hazard, but a doomed car does not react again
    sim.tick(DT);
    sim.tick(DT);
    assert!(sim.world().get_entity(wreck).is_ok());
    assert_eq!(heard(&sim).hazard_contacts.len(), 1);

    // 0.5 s after the impact
    sim.tick(DT);
    assert!(sim.world().get_entity(wreck).is_err());
    sim.tick(DT);
    assert!(is_gone(&sim, wreck));
    assert!(sim.world().get_entity(hazard).is_ok());
}

#[test]
fn collectible_hazard_flashes_the_car_yellow() {
    let (mut sim, _) = make_sim(quiet_config());
    let passing = place_car(&mut sim, 5.0, -30.0);
    let hazard = spawn_hazard(
        sim.world_mut(),
        Hazard::collectible(),
        Vec3::new(5.0, 0.5, -30.0),
    );

    sim.tick(DT);

    assert_eq!(color(&sim, passing), Color::YELLOW);
    assert!(!car(&sim, passing).collision_stopped);
    assert!(sim.world().get_entity(hazard).is_err());
    let contacts = &heard(&sim).hazard_contacts;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].hazard, hazard);

    sim.tick(DT);
    assert_eq!(color(&sim, passing), Color::YELLOW);
    sim.tick(DT);
    assert_eq!(color(&sim, passing), Color::WHITE);
}

// =============================================================================
// Spawning and culling
// =============================================================================

fn spawning_config(follow_up_chance: f32) -> SimConfig {
    let mut config = quiet_config();
    config.traffic.enabled = true;
    config.traffic.follow_up_chance = follow_up_chance;
    config
}

#[test]
fn a_car_spawns_at_once_then_every_interval() {
    let (mut sim, _) = make_sim(spawning_config(0.0));

    sim.tick(DT);
    assert_eq!(sim.world().resource::<Traffic>().len(), 1);

    // 2 s interval
    for _ in 0..15 {
        sim.tick(DT);
    }
    assert_eq!(sim.world().resource::<Traffic>().len(), 1);
    sim.tick(DT);
    assert_eq!(sim.world().resource::<Traffic>().len(), 2);
}

#[test]
fn follow_up_car_arrives_half_a_second_later() {
    let (mut sim, _) = make_sim(spawning_config(1.0));

    for _ in 0..4 {
        sim.tick(DT);
    }
    assert_eq!(sim.world().resource::<Traffic>().len(), 1);
    sim.tick(DT);
    assert_eq!(sim.world().resource::<Traffic>().len(), 2);
}

#[test]
fn spawned_cars_use_their_half_of_the_road() {
    let (mut sim, _) = make_sim(spawning_config(1.0));

    for _ in 0..60 {
        sim.tick(DT);
    }

    let cars = sim.world().resource::<Traffic>().cars.clone();
    assert!(!cars.is_empty());
    for entity in cars {
        let state = car(&sim, entity);
        let pos = position(&sim, entity);
        if state.is_forward {
            assert!(pos.x >= 5.0 && pos.x <= 10.0);
            assert!(state.collision_stopped || state.speed > 0.0);
        } else {
            assert!(pos.x <= -5.0 && pos.x >= -10.0);
            assert!(state.collision_stopped || state.speed < 0.0);
        }
    }
}

#[test]
fn no_spawns_while_disabled() {
    let (mut sim, _) = make_sim(quiet_config());

    for _ in 0..40 {
        sim.tick(DT);
    }

    assert!(sim.world().resource::<Traffic>().is_empty());
}

#[test]
fn cars_leaving_the_road_are_removed() {
    let (mut sim, _) = make_sim(quiet_config());
    let behind = spawn_autonomous_vehicle(
        sim.world_mut(),
        AutonomousVehicle::new(0.0, true, false),
        Vec3::new(5.0, 0.0, 9.5),
        Color::WHITE,
    );
    let far = spawn_autonomous_vehicle(
        sim.world_mut(),
        AutonomousVehicle::new(0.5, true, false),
        Vec3::new(5.0, 0.0, -199.5),
        Color::WHITE,
    );
    let kept = place_car(&mut sim, -5.0, -30.0);

    sim.tick(DT);

    assert!(is_gone(&sim, behind));
    assert!(is_gone(&sim, far));
    assert!(sim.world().get_entity(kept).is_ok());
    assert_eq!(sim.world().resource::<Traffic>().cars, vec![kept]);
}
