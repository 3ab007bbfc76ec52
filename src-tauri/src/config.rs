//! Configuration constants and settings for the solar system viewer
//!
//! This module contains all configurable parameters such as the initial render
//! resolution, frame rates, camera behaviour, scene dimensions and lighting.
//! Per-body values (radii, offsets, rotation rates) live in the body catalog.

/// Initial width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 800;

/// Initial height of the offscreen render target in pixels
pub const RENDER_HEIGHT: u32 = 600;

/// Largest render target width accepted from the frontend
pub const MAX_RENDER_WIDTH: u32 = 3840;

/// Largest render target height accepted from the frontend
pub const MAX_RENDER_HEIGHT: u32 = 2160;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before starting output
/// This allows the scene and its textures to load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Camera control settings
pub mod camera {
    /// Vertical field of view in degrees
    pub const FOV_DEGREES: f32 = 80.0;

    /// Near clipping plane
    pub const NEAR: f32 = 0.1;

    /// Far clipping plane, beyond the background sphere
    pub const FAR: f32 = 6000.0;

    /// Initial camera position, looking at the origin
    pub const INITIAL_POSITION: [f32; 3] = [0.0, 60.0, 650.0];

    /// Rotation speed multiplier for mouse drag
    pub const ROTATION_SPEED: f32 = 0.005;

    /// Zoom speed multiplier for scroll wheel
    pub const ZOOM_SPEED: f32 = 0.5;

    /// Pan speed, scaled by the current distance
    pub const PAN_SPEED: f32 = 0.0015;

    /// Fraction of the pending input applied each frame (1.0 disables damping)
    pub const DAMPING_FACTOR: f32 = 0.05;

    /// Pending input below this magnitude is dropped
    pub const SETTLE_EPSILON: f32 = 1e-5;

    /// Minimum camera distance from center point
    pub const MIN_DISTANCE: f32 = 60.0;

    /// Maximum camera distance from center point (inside the background sphere)
    pub const MAX_DISTANCE: f32 = 1900.0;

    /// Maximum pitch angle (radians) to prevent camera flipping
    pub const MAX_PITCH: f32 = 1.5;

    /// Minimum pitch angle (radians) to prevent camera flipping
    pub const MIN_PITCH: f32 = -1.5;
}

/// Scene geometry and materials
pub mod scene {
    /// Width and height segments of planet spheres
    pub const PLANET_SEGMENTS: u32 = 30;

    /// Width and height segments of the earth and cloud spheres
    pub const EARTH_SEGMENTS: u32 = 35;

    /// Sector and stack counts of the moon sphere
    pub const MOON_SEGMENTS: (u32, u32) = (35, 10);

    /// Resolution of ring annuli
    pub const RING_SEGMENTS: u32 = 32;

    pub const SUN_RADIUS: f32 = 46.0;
    pub const SUN_SEGMENTS: u32 = 30;
    pub const SUN_SPIN_RATE: f32 = 0.004;
    pub const SUN_TEXTURE: &str = "textures/sun/sun.jpg";

    pub const BACKGROUND_RADIUS: f32 = 2000.0;
    pub const BACKGROUND_SEGMENTS: u32 = 100;
    pub const BACKGROUND_TEXTURE: &str = "textures/milkyway.jpg";

    /// Strength of the normal maps derived from bump maps
    pub const BUMP_SCALE: f32 = 0.5;

    /// The cloud shell is always this much larger than its planet
    pub const CLOUD_SHELL_GAP: f32 = 1.0;

    /// Opacity of the cloud shell
    pub const CLOUD_OPACITY: f32 = 0.4;

    /// Roughness of planet surfaces
    pub const PLANET_ROUGHNESS: f32 = 0.9;

    /// Roughness of the earth surface (slightly glossy oceans)
    pub const EARTH_ROUGHNESS: f32 = 0.7;
}

/// Light settings
pub mod lighting {
    /// Soft ambient fill, 0x333333
    pub const AMBIENT_RGB: [u8; 3] = [0x33, 0x33, 0x33];
    pub const AMBIENT_BRIGHTNESS: f32 = 400.0;

    /// Main light at the sun, reaching the whole system
    pub const SUN_LIGHT_INTENSITY: f32 = 1.0e10;
    pub const SUN_LIGHT_RANGE: f32 = 2500.0;

    /// Short range light brightening the inner planets
    pub const INNER_LIGHT_INTENSITY: f32 = 2.0e9;
    pub const INNER_LIGHT_RANGE: f32 = 300.0;

    /// Background clear color behind the starfield
    pub const CLEAR_RGB: [f32; 3] = [0.0, 0.0, 0.0];
}

/// Performance monitoring settings
pub mod performance {
    /// Interval for printing performance stats (seconds)
    pub const STATS_PRINT_INTERVAL: f64 = 2.0;

    /// Number of frame timing samples to keep for averaging
    pub const FRAME_TIMING_SAMPLES: usize = 60;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}
