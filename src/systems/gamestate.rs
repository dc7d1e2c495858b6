//! Scoreboard listeners and the restart fan-out.
//!
//! A restart request is applied in two steps: the scoreboard resets itself
//! and then publishes [`GlobalReset`], which every other collaborator
//! (collision registries, traffic, obstacle field) listens to.

use bevy_ecs::prelude::*;
use log::info;

use crate::error::ListenerResult;
use crate::events::collision::HazardDestroyed;
use crate::events::eventbus::EventBus;
use crate::events::gamestate::{
    DistanceUpdated, GameOver, GameOverSummary, GlobalReset, GlobalRestart, ScoreUpdated,
};
use crate::events::vehicle::PhysicsUpdated;
use crate::resources::collisionsystem::CollisionSystem;
use crate::resources::gamestate::Scoreboard;

pub fn on_hazard_destroyed(world: &mut World, _: &HazardDestroyed) -> ListenerResult {
    let score = {
        let mut board = world.resource_mut::<Scoreboard>();
        board.score += 1;
        board.score
    };
    EventBus::emit(world, &ScoreUpdated { score });
    Ok(())
}

pub fn on_physics_updated(world: &mut World, event: &PhysicsUpdated) -> ListenerResult {
    world.resource_mut::<Scoreboard>().distance = event.distance;
    EventBus::emit(
        world,
        &DistanceUpdated {
            distance: event.distance,
        },
    );
    Ok(())
}

pub fn on_game_over(world: &mut World, _: &GameOver) -> ListenerResult {
    let summary = {
        let mut board = world.resource_mut::<Scoreboard>();
        board.finish();
        GameOverSummary {
            score: board.score,
            distance: board.distance,
        }
    };
    info!(
        "game over: score={}, distance={:.0}",
        summary.score, summary.distance
    );
    EventBus::emit(world, &summary);
    Ok(())
}

/// Restart listener: zero the board and tell everybody to reset.
pub fn on_restart(world: &mut World, _: &GlobalRestart) -> ListenerResult {
    world.resource_mut::<Scoreboard>().reset();
    info!("restarting run");
    EventBus::emit(world, &GlobalReset);
    Ok(())
}

/// Reset listener for the collision registries.
pub fn clear_collision_registries(world: &mut World, _: &GlobalReset) -> ListenerResult {
    if let Some(mut system) = world.get_resource_mut::<CollisionSystem>() {
        system.clear();
    }
    Ok(())
}
