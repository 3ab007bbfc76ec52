//! Bevy resource definitions
//!
//! This module contains all global resources used by Bevy systems.
//! Resources are singleton data that can be accessed by any system.

use bevy::prelude::*;
use std::time::Duration;

use crate::config::camera::*;
use crate::tauri_bridge::shared_state::{
    MouseInput, SharedFrameBuffer, SharedMouseInput, SharedPerfStats, SharedViewport,
};
use crate::viewport::Viewport;

// =============================================================================
// Camera Control
// =============================================================================

/// Input not yet applied to the camera
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitDelta {
    pub yaw: f32,
    pub pitch: f32,
    /// Positive values move the camera closer
    pub zoom: f32,
    /// World space movement of the orbit center
    pub pan: Vec3,
}

impl OrbitDelta {
    fn scaled(self, factor: f32) -> Self {
        Self {
            yaw: self.yaw * factor,
            pitch: self.pitch * factor,
            zoom: self.zoom * factor,
            pan: self.pan * factor,
        }
    }

    fn is_negligible(&self) -> bool {
        self.yaw.abs() < SETTLE_EPSILON
            && self.pitch.abs() < SETTLE_EPSILON
            && self.zoom.abs() < SETTLE_EPSILON
            && self.pan.length_squared() < SETTLE_EPSILON * SETTLE_EPSILON
    }
}

/// Orbit camera state for spherical coordinate camera control
#[derive(Resource, Debug)]
pub struct OrbitCameraState {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians), clamped to avoid gimbal lock
    pub pitch: f32,
    /// Distance from the camera to the center point
    pub distance: f32,
    /// The point the camera orbits around
    pub center: Vec3,
    /// Input still to be applied, drained gradually for damping
    pub pending: OrbitDelta,
}

impl Default for OrbitCameraState {
    fn default() -> Self {
        Self::looking_from(Vec3::from_array(INITIAL_POSITION), Vec3::ZERO)
    }
}

impl OrbitCameraState {
    /// State whose camera sits at `position` looking at `center`
    pub fn looking_from(position: Vec3, center: Vec3) -> Self {
        let offset = position - center;
        let distance = offset.length();
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).asin(),
            distance,
            center,
            pending: OrbitDelta::default(),
        }
    }

    /// Queue one batch of mouse input
    /// - Left button drag: rotate camera (yaw/pitch)
    /// - Right button drag: pan the orbit center
    /// - Scroll wheel: zoom (adjust distance)
    pub fn push_input(&mut self, input: &MouseInput) {
        let dragged = input.delta_x != 0.0 || input.delta_y != 0.0;

        if input.left_button && dragged {
            self.pending.yaw -= input.delta_x * ROTATION_SPEED;
            self.pending.pitch -= input.delta_y * ROTATION_SPEED;
        } else if input.right_button && dragged {
            let right = Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin());
            let speed = PAN_SPEED * self.distance;
            self.pending.pan += (-right * input.delta_x + Vec3::Y * input.delta_y) * speed;
        }

        if input.scroll_delta != 0.0 {
            self.pending.zoom += input.scroll_delta * ZOOM_SPEED;
        }
    }

    /// Apply `damping` of the pending input, keeping the rest for later
    ///
    /// Returns whether the camera moved.
    pub fn step(&mut self, damping: f32) -> bool {
        if self.pending == OrbitDelta::default() {
            return false;
        }

        let applied = self.pending.scaled(damping.clamp(0.0, 1.0));
        self.pending = self.pending.scaled(1.0 - damping.clamp(0.0, 1.0));
        if self.pending.is_negligible() {
            self.pending = OrbitDelta::default();
        }

        self.yaw += applied.yaw;
        // Clamp pitch to prevent camera flipping
        self.pitch = (self.pitch + applied.pitch).clamp(MIN_PITCH, MAX_PITCH);
        self.distance = (self.distance - applied.zoom).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.center += applied.pan;
        true
    }

    /// Camera position using spherical coordinates
    /// yaw: rotation around Y axis
    /// pitch: rotation around X axis (elevation)
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.center + Vec3::new(x, y, z)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.center, Vec3::Y)
    }
}

/// Resource to hold shared mouse input in Bevy
#[derive(Resource)]
pub struct MouseInputRes(pub SharedMouseInput);

// =============================================================================
// Rendering
// =============================================================================

/// Handle to the offscreen render target texture
#[derive(Resource)]
pub struct RenderTargetHandle(pub Handle<Image>);

/// Viewport size requested by the frontend
#[derive(Resource)]
pub struct ViewportRes(pub SharedViewport);

/// Viewport the render target currently has
#[derive(Resource, Default)]
pub struct RenderViewport(pub Viewport);

/// Shared frame buffer resource for Bevy
#[derive(Resource, Clone)]
pub struct FrameBufferRes(pub SharedFrameBuffer);

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames rendered
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before starting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Frame rate limiter to control output FPS
#[derive(Resource)]
pub struct FrameRateLimiter {
    pub last_frame_time: std::time::Instant,
    pub min_frame_interval: Duration,
}

impl FrameRateLimiter {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_frame_time: std::time::Instant::now(),
            min_frame_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }
}

// =============================================================================
// Animation
// =============================================================================

/// Number of animation ticks (frames) since startup
#[derive(Resource, Default, Debug)]
pub struct AnimationClock {
    pub ticks: u64,
}

// =============================================================================
// Performance Monitoring
// =============================================================================

/// Performance timing tracker for frame processing
#[derive(Resource, Default)]
pub struct FrameTimings {
    pub last_print_time: f64,
    pub frame_times: Vec<f64>,
}

/// Shared performance statistics resource
#[derive(Resource)]
pub struct PerfStatsRes(pub SharedPerfStats);

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

use crossbeam_channel::{Receiver, Sender};

/// Render target contents copied back from the GPU
///
/// Rows are `padded_bytes_per_row` long; only the first `width * 4` bytes of
/// each row are pixels.
pub struct FramePacket {
    pub width: u32,
    pub height: u32,
    pub padded_bytes_per_row: usize,
    pub data: Vec<u8>,
}

/// Receives data from render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<FramePacket>);

/// Sends data to main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<FramePacket>);
