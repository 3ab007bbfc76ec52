//! Viewport dimensions shared by the frontend and the render target
//!
//! The webview reports its size, Bevy renders at that size and the camera
//! projection follows the resulting aspect ratio.

use serde::{Deserialize, Serialize};

use crate::config::{MAX_RENDER_HEIGHT, MAX_RENDER_WIDTH, RENDER_HEIGHT, RENDER_WIDTH};
use crate::error::BridgeError;

/// Size of the render target in pixels
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: RENDER_WIDTH,
            height: RENDER_HEIGHT,
        }
    }
}

impl Viewport {
    /// Validate a size reported by the frontend
    ///
    /// Zero sized viewports are rejected; oversized ones are clamped to the
    /// largest supported render target.
    pub fn from_request(width: u32, height: u32) -> Result<Self, BridgeError> {
        if width == 0 || height == 0 {
            return Err(BridgeError::InvalidViewport { width, height });
        }
        Ok(Self {
            width: width.min(MAX_RENDER_WIDTH),
            height: height.min(MAX_RENDER_HEIGHT),
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Adopt `other`, returning whether anything changed
    pub fn resize(&mut self, other: Viewport) -> bool {
        if *self == other {
            return false;
        }
        *self = other;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_resize() {
        let mut viewport = Viewport::from_request(800, 600).unwrap();
        assert!((viewport.aspect_ratio() - 1.333).abs() < 1e-3);

        assert!(viewport.resize(Viewport::from_request(1600, 900).unwrap()));
        assert!((viewport.aspect_ratio() - 1.778).abs() < 1e-3);
    }

    #[test]
    fn repeated_resize_is_a_no_op() {
        let mut viewport = Viewport::default();
        let target = Viewport::from_request(1280, 720).unwrap();

        assert!(viewport.resize(target));
        let aspect = viewport.aspect_ratio();
        assert!(!viewport.resize(target));
        assert_eq!(viewport.aspect_ratio(), aspect);
        assert_eq!(viewport, target);
    }

    #[test]
    fn rejects_empty_and_clamps_oversized() {
        assert!(matches!(
            Viewport::from_request(0, 600),
            Err(BridgeError::InvalidViewport { width: 0, height: 600 })
        ));

        let huge = Viewport::from_request(10_000, 10_000).unwrap();
        assert_eq!(huge.width, MAX_RENDER_WIDTH);
        assert_eq!(huge.height, MAX_RENDER_HEIGHT);
    }
}
