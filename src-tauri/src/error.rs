//! Errors surfaced at the Tauri boundary
//!
//! Command handlers return `Result<_, BridgeError>`; Tauri requires the error
//! to be serializable, so it is sent to the frontend as its display string.

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Nothing has been rendered yet (scene still loading)
    #[error("no frame yet (scene still loading)")]
    FrameNotReady,

    /// A thread panicked while holding shared state
    #[error("shared {0} lock poisoned")]
    LockPoisoned(&'static str),

    /// The frontend reported an unusable viewport size
    #[error("invalid viewport size {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    /// The frame could not be encoded
    #[error("frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Statistics could not be serialized
    #[error("stats serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame buffer does not match its declared dimensions
    #[error("frame buffer holds {len} bytes, expected {expected}")]
    FrameSize { len: usize, expected: usize },
}

impl Serialize for BridgeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
