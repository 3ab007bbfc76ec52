//! Camera control system
//!
//! This module implements orbit camera controls that respond to mouse input
//! from the frontend, allowing users to rotate, zoom and pan the camera.
//! Input is eased in over several frames (see [`OrbitCameraState::step`]).

use bevy::prelude::*;

use crate::bevy::components::CameraController;
use crate::bevy::resources::{MouseInputRes, OrbitCameraState};
use crate::config::camera::DAMPING_FACTOR;

/// Update camera transform based on mouse input
pub fn update_camera_from_input(
    mouse_input_res: Option<Res<MouseInputRes>>,
    mut orbit_state: ResMut<OrbitCameraState>,
    mut camera_query: Query<&mut Transform, With<CameraController>>,
) {
    // Read and clear accumulated input
    if let Some(mouse_res) = mouse_input_res {
        match mouse_res.0.take() {
            Ok(input) => orbit_state.push_input(&input),
            Err(err) => warn_once!("[Bevy] Mouse input unavailable: {err}"),
        }
    }

    if !orbit_state.step(DAMPING_FACTOR) {
        return;
    }

    let camera_transform = orbit_state.transform();
    for mut transform in camera_query.iter_mut() {
        *transform = camera_transform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::shared_state::{MouseInput, SharedMouseInput};
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn drag_moves_the_camera_and_consumes_input() {
        let mut world = World::new();
        let shared = SharedMouseInput::default();
        world.insert_resource(MouseInputRes(shared.clone()));

        let state = OrbitCameraState::default();
        let start = state.transform();
        world.insert_resource(state);
        let camera = world.spawn((start, CameraController)).id();

        shared
            .accumulate(MouseInput {
                delta_x: 40.0,
                left_button: true,
                ..Default::default()
            })
            .unwrap();
        world.run_system_once(update_camera_from_input).unwrap();

        let moved = world.get::<Transform>(camera).unwrap();
        assert_ne!(moved.translation, start.translation);
        assert_eq!(shared.take().unwrap().delta_x, 0.0);

        // Damping keeps the camera moving without new input
        let first = moved.translation;
        world.run_system_once(update_camera_from_input).unwrap();
        assert_ne!(world.get::<Transform>(camera).unwrap().translation, first);
    }

    #[test]
    fn idle_camera_stays_put() {
        let mut world = World::new();
        world.insert_resource(OrbitCameraState::default());
        let start = Transform::from_xyz(1.0, 2.0, 3.0);
        let camera = world.spawn((start, CameraController)).id();

        world.run_system_once(update_camera_from_input).unwrap();
        assert_eq!(*world.get::<Transform>(camera).unwrap(), start);
    }
}
