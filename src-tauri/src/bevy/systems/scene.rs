//! Scene setup system
//!
//! This module handles the initial setup of the 3D scene: the offscreen
//! camera, the solar system built from the body catalog, and the lights.

use bevy::{
    camera::RenderTarget, core_pipeline::tonemapping::Tonemapping, prelude::*,
    render::renderer::RenderDevice,
};

use crate::bevy::components::{CameraController, OffscreenCamera};
use crate::bevy::factory::{assemble_solar_system, SceneBuilder};
use crate::bevy::resources::{OrbitCameraState, RenderTargetHandle, RenderViewport};
use crate::bevy::systems::viewport::create_render_target;
use crate::bevy::textures::TextureLoads;
use crate::config::{camera::*, lighting::*};

/// Build the camera and the solar system
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    asset_server: Res<AssetServer>,
    render_device: Res<RenderDevice>,
    viewport: Res<RenderViewport>,
    orbit_state: Res<OrbitCameraState>,
) -> Result {
    info!("[Scene] Setting up solar system...");

    let render_target =
        create_render_target(&mut commands, &mut images, &render_device, viewport.0);
    commands.insert_resource(RenderTargetHandle(render_target.clone()));

    let [r, g, b] = CLEAR_RGB;
    let [ar, ag, ab] = AMBIENT_RGB;

    // Spawn camera with orbit controller; the ambient fill travels with it
    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(render_target.into()),
            clear_color: ClearColorConfig::Custom(Color::srgb(r, g, b)),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            aspect_ratio: viewport.0.aspect_ratio(),
            near: NEAR,
            far: FAR,
            ..default()
        }),
        AmbientLight {
            color: Color::srgb_u8(ar, ag, ab),
            brightness: AMBIENT_BRIGHTNESS,
            ..default()
        },
        Tonemapping::None,
        orbit_state.transform(),
        OffscreenCamera,
        CameraController,
    ));

    let mut builder = SceneBuilder::new(&mut commands, &mut meshes, &mut materials, &*asset_server);
    let registry = assemble_solar_system(&mut builder)?;
    let requests = builder.finish();

    info!(
        "[Scene] Built sun, {} bodies and {} lights; waiting for {} textures",
        registry.bodies.len() + usize::from(registry.earth.is_some()),
        registry.lights.len(),
        requests.len()
    );

    commands.insert_resource(TextureLoads::new(requests));
    commands.insert_resource(registry);
    Ok(())
}
