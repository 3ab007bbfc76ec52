//! Height map to normal map conversion
//!
//! Planet bump maps are greyscale height maps. `StandardMaterial` only takes
//! tangent-space normal maps, so each loaded bump map is converted once.
//! Output follows the OpenGL convention (green points up the image).

use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;
use image::{GrayImage, Rgba, RgbaImage};
use thiserror::Error;

/// Height difference, in 8-bit levels per texel, that tilts the normal by
/// one unit at strength 1.0
const LEVELS_PER_UNIT_SLOPE: f32 = 8.0;

#[derive(Debug, Error)]
pub enum BumpMapError {
    #[error("bump map could not be decoded: {0}")]
    Decode(String),
    #[error("bump map is empty")]
    Empty,
}

/// Derive a normal map from a height map
///
/// Longitude (u) wraps around the sphere, latitude (v) is clamped at the
/// poles.
pub fn height_to_normal(height: &GrayImage, strength: f32) -> RgbaImage {
    let (width, rows) = height.dimensions();
    let scale = strength / LEVELS_PER_UNIT_SLOPE;
    let sample = |x: u32, y: u32| height.get_pixel(x, y).0[0] as f32;

    RgbaImage::from_fn(width, rows, |x, y| {
        let left = sample((x + width - 1) % width, y);
        let right = sample((x + 1) % width, y);
        let up = sample(x, y.saturating_sub(1));
        let down = sample(x, (y + 1).min(rows - 1));

        let dx = (right - left) * 0.5;
        let dy = (down - up) * 0.5;
        let normal = Vec3::new(-dx * scale, dy * scale, 1.0).normalize();

        let encode = |c: f32| ((c * 0.5 + 0.5) * 255.0).round() as u8;
        Rgba([encode(normal.x), encode(normal.y), encode(normal.z), 255])
    })
}

/// Build a linear normal map image from a loaded bump map
pub fn normal_map_from_height(bump: &Image, strength: f32) -> Result<Image, BumpMapError> {
    let height = bump
        .clone()
        .try_into_dynamic()
        .map_err(|err| BumpMapError::Decode(err.to_string()))?
        .to_luma8();
    if height.width() == 0 || height.height() == 0 {
        return Err(BumpMapError::Empty);
    }

    let normals = height_to_normal(&height, strength);

    // Same size, sampler and usages as the source; only the texels and the
    // (non-sRGB) format change
    let mut normal_map = bump.clone();
    normal_map.texture_descriptor.format = TextureFormat::Rgba8Unorm;
    normal_map.data = Some(normals.into_raw());
    Ok(normal_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn flat_height_map_points_straight_out() {
        let flat = GrayImage::from_pixel(4, 4, Luma([90]));
        let normals = height_to_normal(&flat, 0.5);
        for pixel in normals.pixels() {
            assert_eq!(pixel.0, [128, 128, 255, 255]);
        }
    }

    #[test]
    fn slopes_tilt_the_normal() {
        // Height rises to the right and down the image
        let ramp = GrayImage::from_fn(8, 8, |x, y| Luma([(x * 16 + y * 8) as u8]));
        let normals = height_to_normal(&ramp, 0.5);

        let interior = normals.get_pixel(3, 3).0;
        assert!(interior[0] < 128, "faces away from rising x: {interior:?}");
        assert!(interior[1] > 128, "faces up the image: {interior:?}");
        assert!(interior[2] < 255);
    }

    #[test]
    fn longitude_wraps_around() {
        // A single bright column at the right edge influences the left edge
        let seam = GrayImage::from_fn(6, 3, |x, _| Luma([if x == 5 { 200 } else { 0 }]));
        let normals = height_to_normal(&seam, 1.0);
        assert!(normals.get_pixel(0, 1).0[0] > 128);
        assert_eq!(normals.get_pixel(2, 1).0[0], 128);
    }
}
