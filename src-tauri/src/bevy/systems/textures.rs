//! Texture load tracking system
//!
//! Polls the asset server for every texture the scene requested. Loaded bump
//! maps become normal maps and specular maps are attached; failed color
//! textures fall back to a tint. A failure is never fatal.

use bevy::{asset::LoadState, prelude::*};

use crate::bevy::bump_map::normal_map_from_height;
use crate::bevy::resources::PerfStatsRes;
use crate::bevy::textures::{
    apply_failure_fallback, TextureLoadResult, TextureLoads, TextureRequest, TextureRole,
};
use crate::config::scene::BUMP_SCALE;

/// Resolve finished texture loads
pub fn resolve_texture_loads(
    loads: Option<ResMut<TextureLoads>>,
    asset_server: Res<AssetServer>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    perf_stats: Option<Res<PerfStatsRes>>,
) {
    let Some(mut loads) = loads else { return };
    if loads.is_settled() {
        return;
    }

    let resolved = loads.poll(|handle| match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => Some(TextureLoadResult::Loaded(handle.clone())),
        Some(LoadState::Failed(err)) => Some(TextureLoadResult::Failed(err.to_string())),
        _ => None,
    });
    for (request, result) in &resolved {
        apply_load_result(request, result, &mut images, &mut materials);
    }

    // Published every frame until settled so pending loads are visible
    if let Some(perf) = &perf_stats {
        let pending = loads.pending().len() as u32;
        perf.0.update(|stats| {
            stats.textures_loaded = loads.loaded;
            stats.textures_failed = loads.failed;
            stats.textures_pending = pending;
        });
    }

    if !resolved.is_empty() && loads.is_settled() {
        info!(
            "[Textures] All textures resolved: {} loaded, {} failed",
            loads.loaded, loads.failed
        );
    }
}

/// Apply the outcome of one texture load to its material
pub fn apply_load_result(
    request: &TextureRequest,
    result: &TextureLoadResult,
    images: &mut Assets<Image>,
    materials: &mut Assets<StandardMaterial>,
) {
    match result {
        TextureLoadResult::Failed(reason) => {
            warn!(
                "[Textures] {} ({:?}) failed to load, using fallback: {}",
                request.path, request.role, reason
            );
            if let Some(mut material) = materials.get_mut(&request.material) {
                apply_failure_fallback(&mut material, request);
            }
        }
        TextureLoadResult::Loaded(handle) if request.role == TextureRole::Bump => {
            let Some(bump) = images.get(handle) else {
                warn!("[Textures] {} loaded but is no longer available", request.path);
                return;
            };
            match normal_map_from_height(bump, BUMP_SCALE) {
                Ok(normal_map) => {
                    let normal_map = images.add(normal_map);
                    if let Some(mut material) = materials.get_mut(&request.material) {
                        material.normal_map_texture = Some(normal_map);
                    }
                    debug!("[Textures] {} converted to a normal map", request.path);
                }
                Err(err) => warn!("[Textures] {}: {err}, bump omitted", request.path),
            }
        }
        TextureLoadResult::Loaded(handle) if request.role == TextureRole::Specular => {
            if let Some(mut material) = materials.get_mut(&request.material) {
                material.specular_tint_texture = Some(handle.clone());
            }
            debug!("[Textures] {} attached as specular map", request.path);
        }
        TextureLoadResult::Loaded(_) => {
            debug!("[Textures] {} loaded", request.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::shared_state::SharedPerfStats;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
    use std::time::Duration;

    fn grey_image() -> Image {
        Image::new_fill(
            Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[100, 100, 100, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        )
    }

    fn setup(role: TextureRole) -> (TextureRequest, Assets<Image>, Assets<StandardMaterial>) {
        let mut images = Assets::<Image>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let handle = images.add(grey_image());
        let material = materials.add(StandardMaterial {
            base_color_texture: role.is_color().then(|| handle.clone()),
            ..default()
        });
        let request = TextureRequest {
            path: "textures/test.jpg".into(),
            handle,
            role,
            material,
            fallback: Color::srgb(0.2, 0.4, 0.8),
        };
        (request, images, materials)
    }

    #[test]
    fn loaded_bump_map_becomes_normal_map() {
        let (request, mut images, mut materials) = setup(TextureRole::Bump);
        let result = TextureLoadResult::Loaded(request.handle.clone());
        apply_load_result(&request, &result, &mut images, &mut materials);

        let material = materials.get(&request.material).unwrap();
        let normal_map = material.normal_map_texture.clone().unwrap();
        let normal_image = images.get(&normal_map).unwrap();
        assert_eq!(
            normal_image.texture_descriptor.format,
            TextureFormat::Rgba8Unorm
        );
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn failed_surface_texture_uses_fallback() {
        let (request, mut images, mut materials) = setup(TextureRole::Surface);
        let result = TextureLoadResult::Failed("file not found".into());
        apply_load_result(&request, &result, &mut images, &mut materials);

        let material = materials.get(&request.material).unwrap();
        assert!(material.base_color_texture.is_none());
        assert_eq!(material.base_color, Color::srgb(0.2, 0.4, 0.8));
    }

    #[test]
    fn failed_bump_map_is_omitted() {
        let (request, mut images, mut materials) = setup(TextureRole::Bump);
        let result = TextureLoadResult::Failed("file not found".into());
        apply_load_result(&request, &result, &mut images, &mut materials);

        let material = materials.get(&request.material).unwrap();
        assert!(material.normal_map_texture.is_none());
        assert_eq!(material.base_color, Color::WHITE);
    }

    #[test]
    fn loaded_specular_map_is_attached() {
        let (request, mut images, mut materials) = setup(TextureRole::Specular);
        let result = TextureLoadResult::Loaded(request.handle.clone());
        apply_load_result(&request, &result, &mut images, &mut materials);

        let material = materials.get(&request.material).unwrap();
        assert_eq!(material.specular_tint_texture, Some(request.handle.clone()));
        assert!(material.base_color_texture.is_none());
    }

    #[test]
    fn failed_specular_map_is_omitted() {
        let (request, mut images, mut materials) = setup(TextureRole::Specular);
        let result = TextureLoadResult::Failed("file not found".into());
        apply_load_result(&request, &result, &mut images, &mut materials);

        let material = materials.get(&request.material).unwrap();
        assert!(material.specular_tint_texture.is_none());
        assert_eq!(material.base_color, Color::WHITE);
    }

    #[test]
    fn missing_texture_is_counted_and_tinted() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), ImagePlugin::default()));
        app.init_asset::<StandardMaterial>();
        app.add_systems(Update, resolve_texture_loads);
        app.finish();
        app.cleanup();

        let stats = SharedPerfStats::default();
        app.insert_resource(PerfStatsRes(stats.clone()));

        let path = "textures/not_there.jpg";
        let handle: Handle<Image> = app.world().resource::<AssetServer>().load(path);
        let material = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color_texture: Some(handle.clone()),
                ..default()
            });
        app.insert_resource(TextureLoads::new(vec![TextureRequest {
            path: path.into(),
            handle,
            role: TextureRole::Surface,
            material: material.clone(),
            fallback: Color::srgb(0.2, 0.4, 0.8),
        }]));

        // Counters are published from the first frame on
        app.update();
        let first = stats.snapshot().unwrap();
        assert_eq!(first.textures_pending + first.textures_failed, 1);

        for _ in 0..1000 {
            if app.world().resource::<TextureLoads>().is_settled() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
            app.update();
        }

        let published = stats.snapshot().unwrap();
        assert_eq!(published.textures_loaded, 0);
        assert_eq!(published.textures_failed, 1);
        assert_eq!(published.textures_pending, 0);

        let materials = app.world().resource::<Assets<StandardMaterial>>();
        let material = materials.get(&material).unwrap();
        assert!(material.base_color_texture.is_none());
        assert_eq!(material.base_color, Color::srgb(0.2, 0.4, 0.8));
    }
}
