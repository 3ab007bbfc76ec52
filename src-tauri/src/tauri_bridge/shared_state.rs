//! Shared state structures for communication between Tauri and Bevy
//!
//! This module defines thread-safe data structures that allow bidirectional
//! communication between the Tauri frontend and the Bevy render backend.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::BridgeError;
use crate::viewport::Viewport;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> Result<MutexGuard<'a, T>, BridgeError> {
    mutex.lock().map_err(|_| BridgeError::LockPoisoned(what))
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// A rendered frame as tightly packed RGBA8 pixels (4 bytes per pixel)
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Check that the pixel data matches the declared dimensions
    pub fn validate(&self) -> Result<(), BridgeError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba.len() != expected {
            return Err(BridgeError::FrameSize {
                len: self.rgba.len(),
                expected,
            });
        }
        Ok(())
    }
}

/// Thread-safe frame buffer shared between Bevy and Tauri
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Frame>>>);

impl SharedFrameBuffer {
    pub fn store(&self, frame: Frame) -> Result<(), BridgeError> {
        *lock(&self.0, "frame buffer")? = Some(frame);
        Ok(())
    }

    /// Latest frame, if one has been rendered
    pub fn latest(&self) -> Result<Option<Frame>, BridgeError> {
        Ok(lock(&self.0, "frame buffer")?.clone())
    }
}

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded RGBA pixel data (avoids slow JSON array serialization)
    pub data: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Mouse Input
// =============================================================================

/// Mouse input state received from frontend
#[derive(Serialize, Deserialize, Clone, Default, Debug)]
pub struct MouseInput {
    /// Accumulated X movement delta
    pub delta_x: f32,
    /// Accumulated Y movement delta
    pub delta_y: f32,
    /// Accumulated scroll wheel delta
    pub scroll_delta: f32,
    /// Left mouse button is pressed (rotate)
    pub left_button: bool,
    /// Right mouse button is pressed (pan)
    pub right_button: bool,
}

/// Thread-safe mouse input shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedMouseInput(Arc<Mutex<PendingMouseInput>>);

#[derive(Default)]
struct PendingMouseInput {
    /// Deltas since the last read, with every button held while they accrued
    input: MouseInput,
    /// Buttons as last reported by the frontend
    left_button: bool,
    right_button: bool,
}

impl SharedMouseInput {
    /// Accumulate deltas until Bevy consumes them
    ///
    /// A button released before Bevy reads still counts as held for the
    /// deltas gathered so far, so the tail of a drag is not lost.
    pub fn accumulate(&self, update: MouseInput) -> Result<(), BridgeError> {
        let mut guard = lock(&self.0, "mouse input")?;
        guard.input.delta_x += update.delta_x;
        guard.input.delta_y += update.delta_y;
        guard.input.scroll_delta += update.scroll_delta;
        guard.input.left_button |= update.left_button;
        guard.input.right_button |= update.right_button;
        guard.left_button = update.left_button;
        guard.right_button = update.right_button;
        Ok(())
    }

    /// Read the accumulated input and clear its deltas
    pub fn take(&self) -> Result<MouseInput, BridgeError> {
        let mut guard = lock(&self.0, "mouse input")?;
        let input = guard.input.clone();
        guard.input = MouseInput {
            left_button: guard.left_button,
            right_button: guard.right_button,
            ..Default::default()
        };
        Ok(input)
    }
}

// =============================================================================
// Viewport
// =============================================================================

/// Viewport size most recently requested by the frontend
#[derive(Clone, Default)]
pub struct SharedViewport(pub Arc<Mutex<Viewport>>);

impl SharedViewport {
    pub fn request(&self, viewport: Viewport) -> Result<(), BridgeError> {
        *lock(&self.0, "viewport")? = viewport;
        Ok(())
    }

    pub fn current(&self) -> Result<Viewport, BridgeError> {
        Ok(*lock(&self.0, "viewport")?)
    }
}

/// Viewport size and derived aspect ratio reported back to the frontend
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ViewportInfo {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
}

impl From<Viewport> for ViewportInfo {
    fn from(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            aspect_ratio: viewport.aspect_ratio(),
        }
    }
}

// =============================================================================
// Performance Statistics
// =============================================================================

/// Performance statistics for debugging and monitoring
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct PerformanceStats {
    // Backend (Bevy/Rust) timings
    pub gpu_transfer_ms: f64,
    pub data_processing_ms: f64,
    pub frame_encoding_ms: f64,
    pub bevy_fps: f64,
    pub frame_count: u32,
    pub data_size_kb: f64,
    // Animation and asset progress
    pub animation_ticks: u64,
    pub textures_loaded: u32,
    pub textures_failed: u32,
    pub textures_pending: u32,
    // Tauri command timings
    pub tauri_get_frame_ms: f64,
    pub tauri_serialize_ms: f64,
}

/// Thread-safe performance statistics
#[derive(Clone, Default)]
pub struct SharedPerfStats(pub Arc<Mutex<PerformanceStats>>);

impl SharedPerfStats {
    /// Apply `update` to the statistics, ignoring a poisoned lock
    pub fn update(&self, update: impl FnOnce(&mut PerformanceStats)) {
        if let Ok(mut stats) = self.0.lock() {
            update(&mut stats);
        }
    }

    pub fn snapshot(&self) -> Result<PerformanceStats, BridgeError> {
        Ok(lock(&self.0, "performance stats")?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_deltas_accumulate_until_taken() {
        let shared = SharedMouseInput::default();
        let drag = MouseInput {
            delta_x: 3.0,
            delta_y: -1.0,
            left_button: true,
            ..Default::default()
        };
        shared.accumulate(drag.clone()).unwrap();
        shared.accumulate(drag).unwrap();

        let input = shared.take().unwrap();
        assert_eq!(input.delta_x, 6.0);
        assert_eq!(input.delta_y, -2.0);
        assert!(input.left_button);

        let cleared = shared.take().unwrap();
        assert_eq!(cleared.delta_x, 0.0);
        assert!(cleared.left_button, "button state persists between reads");
    }

    #[test]
    fn drag_released_before_read_keeps_its_button() {
        let shared = SharedMouseInput::default();
        shared
            .accumulate(MouseInput {
                delta_x: 12.0,
                left_button: true,
                ..Default::default()
            })
            .unwrap();
        shared.accumulate(MouseInput::default()).unwrap();

        let input = shared.take().unwrap();
        assert_eq!(input.delta_x, 12.0);
        assert!(input.left_button);

        let after = shared.take().unwrap();
        assert!(!after.left_button);
        assert_eq!(after.delta_x, 0.0);
    }

    #[test]
    fn frame_size_is_checked() {
        let frame = Frame {
            width: 2,
            height: 2,
            rgba: vec![0; 15],
        };
        assert!(matches!(
            frame.validate(),
            Err(BridgeError::FrameSize { len: 15, expected: 16 })
        ));
    }
}
