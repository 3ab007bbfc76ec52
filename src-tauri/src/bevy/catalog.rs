//! Body catalog
//!
//! The hand-authored solar system as a data table. Every body is built by
//! the same factory path and animated by the same rotation system; only the
//! numbers below differ. Rates are radians per frame and have no physical
//! basis, they just look plausible (outer bodies orbit slower).

use bevy::prelude::Color;

/// Flat ring around a body, lying in its orbital plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSpec {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub texture: &'static str,
}

/// Everything needed to build and animate an ordinary body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDescriptor {
    pub name: &'static str,
    pub radius: f32,
    pub color_texture: &'static str,
    pub bump_texture: Option<&'static str>,
    /// Distance along x from the pivot at the origin
    pub orbit_offset: f32,
    pub ring: Option<RingSpec>,
    pub spin_rate: f32,
    pub orbit_rate: f32,
    /// Tint used when the color texture fails to load
    pub fallback_rgb: [f32; 3],
}

impl BodyDescriptor {
    pub fn fallback_color(&self) -> Color {
        let [r, g, b] = self.fallback_rgb;
        Color::srgb(r, g, b)
    }
}

/// Earth with its cloud shell and moon
///
/// The planet and cloud radii are fixed by the factory (the cloud shell is
/// always one unit larger than the planet); only offsets and rates vary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarthSystemSpec {
    pub planet_offset: f32,
    pub cloud_offset: f32,
    /// Offset of the moon from the planet it is attached to
    pub moon_offset: f32,
    pub planet_spin_rate: f32,
    pub cloud_spin_rate: f32,
    pub moon_spin_rate: f32,
    pub orbit_rate: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CatalogEntry {
    Body(BodyDescriptor),
    Earth(EarthSystemSpec),
}

impl CatalogEntry {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEntry::Body(body) => body.name,
            CatalogEntry::Earth(_) => EARTH_NAME,
        }
    }
}

pub const EARTH_NAME: &str = "Earth";
pub const EARTH_RADIUS: f32 = 15.0;
pub const MOON_RADIUS: f32 = 6.0;

pub const EARTH_COLOR_TEXTURE: &str = "textures/earth/earthmap1k.jpg";
pub const EARTH_BUMP_TEXTURE: &str = "textures/earth/earthbump1k.jpg";
pub const EARTH_CLOUD_TEXTURE: &str = "textures/earth/earthcloudmap.jpg";
pub const EARTH_SPECULAR_TEXTURE: &str = "textures/earth/earthspec1k.jpg";
pub const MOON_COLOR_TEXTURE: &str = "textures/moon/moonmap1k.jpg";
pub const MOON_BUMP_TEXTURE: &str = "textures/moon/moonbump1k.jpg";

pub const EARTH_FALLBACK_RGB: [f32; 3] = [0.2, 0.4, 0.8];
pub const MOON_FALLBACK_RGB: [f32; 3] = [0.6, 0.6, 0.6];
pub const SUN_FALLBACK_RGB: [f32; 3] = [1.0, 0.75, 0.3];

/// The solar system, innermost first
pub const SOLAR_SYSTEM: [CatalogEntry; 9] = [
    CatalogEntry::Body(BodyDescriptor {
        name: "Mercury",
        radius: 8.0,
        color_texture: "textures/mercury/mercurymap.jpg",
        bump_texture: Some("textures/mercury/mercurybump.jpg"),
        orbit_offset: 68.0,
        ring: None,
        spin_rate: 0.004,
        orbit_rate: 0.04,
        fallback_rgb: [0.55, 0.52, 0.5],
    }),
    CatalogEntry::Body(BodyDescriptor {
        name: "Venus",
        radius: 13.0,
        color_texture: "textures/venus/venusmap.jpg",
        bump_texture: Some("textures/venus/venusbump.jpg"),
        orbit_offset: 104.0,
        ring: None,
        spin_rate: 0.002,
        orbit_rate: 0.025,
        fallback_rgb: [0.85, 0.7, 0.45],
    }),
    CatalogEntry::Earth(EarthSystemSpec {
        planet_offset: 205.0,
        cloud_offset: 205.0,
        moon_offset: 32.0,
        planet_spin_rate: 0.012,
        cloud_spin_rate: 0.016,
        moon_spin_rate: 0.01,
        orbit_rate: 0.009,
    }),
    CatalogEntry::Body(BodyDescriptor {
        name: "Mars",
        radius: 10.0,
        color_texture: "textures/mars/mars_1k_color.jpg",
        bump_texture: Some("textures/mars/marsbump1k.jpg"),
        orbit_offset: 260.0,
        ring: None,
        spin_rate: 0.018,
        orbit_rate: 0.008,
        fallback_rgb: [0.75, 0.35, 0.2],
    }),
    CatalogEntry::Body(BodyDescriptor {
        name: "Jupiter",
        radius: 30.0,
        color_texture: "textures/jupiter/jupitermap.jpg",
        bump_texture: Some("textures/jupiter/jupiter2_1k.jpg"),
        orbit_offset: 333.0,
        ring: None,
        spin_rate: 0.04,
        orbit_rate: 0.002,
        fallback_rgb: [0.8, 0.65, 0.5],
    }),
    CatalogEntry::Body(BodyDescriptor {
        name: "Saturn",
        radius: 25.0,
        color_texture: "textures/saturn/saturnmap.jpg",
        bump_texture: None,
        orbit_offset: 423.0,
        ring: Some(RingSpec {
            inner_radius: 29.0,
            outer_radius: 41.0,
            texture: "textures/saturn/saturnring.png",
        }),
        spin_rate: 0.038,
        orbit_rate: 0.0009,
        fallback_rgb: [0.85, 0.78, 0.6],
    }),
    CatalogEntry::Body(BodyDescriptor {
        name: "Uranus",
        radius: 17.0,
        color_texture: "textures/uranus/uranusmap.jpg",
        bump_texture: None,
        orbit_offset: 495.0,
        ring: Some(RingSpec {
            inner_radius: 19.5,
            outer_radius: 26.2,
            texture: "textures/uranus/uranusring.png",
        }),
        spin_rate: 0.032,
        orbit_rate: 0.0001,
        fallback_rgb: [0.6, 0.85, 0.9],
    }),
    CatalogEntry::Body(BodyDescriptor {
        name: "Neptune",
        radius: 17.0,
        color_texture: "textures/neptune/neptunemap.jpg",
        bump_texture: None,
        orbit_offset: 572.0,
        ring: None,
        spin_rate: 0.03,
        orbit_rate: 0.0004,
        fallback_rgb: [0.3, 0.45, 0.9],
    }),
    CatalogEntry::Body(BodyDescriptor {
        name: "Pluto",
        radius: 7.0,
        color_texture: "textures/pluto/plutomap1k.jpg",
        bump_texture: Some("textures/pluto/plutobump1k.jpg"),
        orbit_offset: 622.0,
        ring: None,
        spin_rate: 0.008,
        orbit_rate: 0.00007,
        fallback_rgb: [0.7, 0.6, 0.5],
    }),
];
