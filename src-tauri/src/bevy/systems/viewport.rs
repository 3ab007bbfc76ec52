//! Viewport resize system
//!
//! The frontend requests a size through shared state. When it differs from
//! the active viewport, the render target and its image copier are rebuilt
//! at the new size and the camera projection follows the new aspect ratio.

use bevy::{
    camera::RenderTarget,
    prelude::*,
    render::{
        render_resource::{TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};

use crate::bevy::components::OffscreenCamera;
use crate::bevy::plugins::image_copy::ImageCopier;
use crate::bevy::resources::{RenderTargetHandle, RenderViewport, ViewportRes};
use crate::viewport::Viewport;

/// Create a render target image and the copier reading it back
pub fn create_render_target(
    commands: &mut Commands,
    images: &mut Assets<Image>,
    render_device: &RenderDevice,
    viewport: Viewport,
) -> Handle<Image> {
    let mut render_target_image = Image::new_target_texture(
        viewport.width,
        viewport.height,
        TextureFormat::bevy_default(),
    );
    render_target_image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let handle = images.add(render_target_image);

    // Spawn image copier for GPU-to-CPU transfer
    commands.spawn(ImageCopier::new(
        handle.clone(),
        viewport.width,
        viewport.height,
        render_device,
    ));

    handle
}

/// Point a perspective projection at a new aspect ratio
pub fn set_aspect_ratio(projection: &mut Projection, aspect_ratio: f32) {
    if let Projection::Perspective(perspective) = projection {
        perspective.aspect_ratio = aspect_ratio;
    }
}

/// Rebuild the render target when the frontend asks for a new size
pub fn apply_viewport_resize(
    mut commands: Commands,
    requested: Option<Res<ViewportRes>>,
    mut active: ResMut<RenderViewport>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    mut render_target: ResMut<RenderTargetHandle>,
    copiers: Query<Entity, With<ImageCopier>>,
    mut cameras: Query<(&mut Camera, &mut Projection), With<OffscreenCamera>>,
) {
    let Some(requested) = requested else {
        return;
    };
    let viewport = match requested.0.current() {
        Ok(viewport) => viewport,
        Err(err) => {
            warn_once!("[Viewport] {err}");
            return;
        }
    };

    if !active.0.resize(viewport) {
        return;
    }

    for copier in &copiers {
        commands.entity(copier).despawn();
    }

    let new_target = create_render_target(&mut commands, &mut images, &render_device, viewport);
    let old_target = std::mem::replace(&mut render_target.0, new_target.clone());

    for (mut camera, mut projection) in &mut cameras {
        camera.target = RenderTarget::Image(new_target.clone().into());
        set_aspect_ratio(&mut projection, viewport.aspect_ratio());
    }

    images.remove(&old_target);

    info!(
        "[Viewport] Render target resized to {}x{} (aspect {:.3})",
        viewport.width,
        viewport.height,
        viewport.aspect_ratio()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perspective_follows_aspect_ratio() {
        let mut projection = Projection::Perspective(PerspectiveProjection::default());
        let mut viewport = Viewport::from_request(800, 600).unwrap();
        set_aspect_ratio(&mut projection, viewport.aspect_ratio());

        viewport.resize(Viewport::from_request(1600, 900).unwrap());
        set_aspect_ratio(&mut projection, viewport.aspect_ratio());

        let Projection::Perspective(perspective) = projection else {
            panic!("projection changed kind");
        };
        assert!((perspective.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }
}
