//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript code.

use base64::{engine::general_purpose::STANDARD, Engine};
use bevy::log::info;
use tauri::State;

use super::shared_state::{
    FrameResponse, MouseInput, PerformanceStats, SharedFrameBuffer, SharedMouseInput,
    SharedPerfStats, SharedViewport, ViewportInfo,
};
use crate::error::BridgeError;
use crate::viewport::Viewport;

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(
    state: State<SharedFrameBuffer>,
    perf_state: State<SharedPerfStats>,
) -> Result<FrameResponse, BridgeError> {
    let cmd_start = std::time::Instant::now();

    let frame = state.latest()?.ok_or(BridgeError::FrameNotReady)?;
    let data_fetch_time = cmd_start.elapsed().as_secs_f64() * 1000.0;

    // Measure Base64 encoding time
    let encode_start = std::time::Instant::now();
    let data = STANDARD.encode(&frame.rgba);
    let encode_time = encode_start.elapsed().as_secs_f64() * 1000.0;

    perf_state.update(|stats| {
        stats.tauri_get_frame_ms = data_fetch_time;
        stats.tauri_serialize_ms = encode_time;
    });

    Ok(FrameResponse {
        data,
        width: frame.width,
        height: frame.height,
    })
}

/// Get the render resolution currently requested
#[tauri::command]
pub fn get_render_size(state: State<SharedViewport>) -> Result<ViewportInfo, BridgeError> {
    Ok(state.current()?.into())
}

/// Get performance statistics
#[tauri::command]
pub fn get_performance_stats(
    state: State<SharedPerfStats>,
) -> Result<PerformanceStats, BridgeError> {
    state.snapshot()
}

/// Receive mouse input from frontend for camera control
/// Input deltas are accumulated until consumed by Bevy
#[tauri::command]
pub fn send_mouse_input(
    state: State<SharedMouseInput>,
    delta_x: f32,
    delta_y: f32,
    scroll_delta: f32,
    left_button: bool,
    right_button: bool,
) -> Result<(), BridgeError> {
    state.accumulate(MouseInput {
        delta_x,
        delta_y,
        scroll_delta,
        left_button,
        right_button,
    })
}

/// Receive the webview size; Bevy rebuilds its render target to match
#[tauri::command]
pub fn resize_viewport(
    state: State<SharedViewport>,
    width: u32,
    height: u32,
) -> Result<ViewportInfo, BridgeError> {
    let viewport = Viewport::from_request(width, height)?;
    if state.current()? != viewport {
        info!("[Tauri] Viewport requested: {}x{}", viewport.width, viewport.height);
        state.request(viewport)?;
    }
    Ok(viewport.into())
}
