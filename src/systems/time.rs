//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, applying `time_scale` to the provided delta and
//! capping the result.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance the `WorldTime` resource by one frame.
///
/// `dt` is expected to be the unscaled frame delta in seconds. Returns the
/// scaled delta, at most `max_delta`, that the frame should run with. Without
/// a clock `dt` itself is capped and passed through.
pub fn update_world_time(world: &mut World, dt: f32, max_delta: f32) -> f32 {
    match world.get_resource_mut::<WorldTime>() {
        Some(mut wt) => wt.advance(dt, max_delta),
        None => dt.clamp(0.0, max_delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_world_time_scales_delta() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            time_scale: 0.5,
            ..WorldTime::default()
        });
        let scaled = update_world_time(&mut world, 0.1, 0.1);
        update_world_time(&mut world, 0.1, 0.1);
        let wt = world.resource::<WorldTime>();
        assert_eq!(scaled, 0.05);
        assert_eq!(wt.delta, 0.05);
        assert!((wt.elapsed - 0.1).abs() < 1e-6);
        assert_eq!(wt.frame_count, 2);
    }

    #[test]
    fn test_missing_clock_passes_delta_through() {
        let mut world = World::new();
        assert_eq!(update_world_time(&mut world, 0.25, 1.0), 0.25);
        assert_eq!(update_world_time(&mut world, 0.25, 0.1), 0.1);
    }

    #[test]
    fn test_time_scale_cannot_push_delta_past_cap() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            time_scale: 3.0,
            ..WorldTime::default()
        });
        assert_eq!(update_world_time(&mut world, 0.1, 0.1), 0.1);
        assert_eq!(world.resource::<WorldTime>().delta, 0.1);
    }
}
