//! Animation systems
//!
//! One tick per frame. Every registered spin and orbit is set from the tick
//! count, so each angle depends only on its own rate.

use bevy::prelude::*;

use crate::bevy::registry::SceneRegistry;
use crate::bevy::resources::AnimationClock;

/// Advance the clock and rotate every registered body and pivot about y
pub fn advance_rotations(
    registry: Option<Res<SceneRegistry>>,
    mut clock: ResMut<AnimationClock>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(registry) = registry else { return };

    clock.ticks += 1;
    for track in registry.rotation_tracks() {
        if let Ok(mut transform) = transforms.get_mut(track.entity) {
            transform.rotation = Quat::from_rotation_y(track.angle_at(clock.ticks));
        }
    }
}
