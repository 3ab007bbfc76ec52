//! Solar System Viewer: Headless Bevy Rendering in a Tauri Webview
//!
//! An animated solar system (sun, nine bodies with rings, clouds and a moon,
//! and a starfield backdrop) rendered by Bevy and displayed by a Tauri frontend.
//!
//! Architecture:
//! - Bevy runs in a background thread with NO window (true headless mode)
//! - The scene is built once from a body catalog; a per-frame system rotates
//!   every registered body (spin) and pivot (orbit)
//! - GPU texture -> Buffer -> CPU channel -> Tauri frontend via the `frame://`
//!   protocol (JPEG compression) or Base64-encoded RGBA
//! - Mouse input and viewport resizes flow back through Tauri commands
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and settings
//! - `error`: Errors surfaced to the frontend
//! - `viewport`: Render target dimensions and aspect ratio
//! - `tauri_bridge`: Bridge layer between Tauri and Bevy
//!   - `shared_state`: Thread-safe data structures
//!   - `commands`: Tauri command handlers
//!   - `protocol`: Custom protocol handlers
//! - `bevy`: Bevy engine integration
//!   - `catalog`: Body data table
//!   - `factory`: Body, earth system, sun and backdrop construction
//!   - `textures`: Texture requests and load results
//!   - `bump_map`: Height map to normal map conversion
//!   - `components` / `resources`: ECS data
//!   - `plugins`: GPU to CPU image copy
//!   - `systems`: Scene setup, animation, camera, viewport, textures, frames
//!   - `app`: Application setup

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Module declarations
mod bevy;
mod config;
mod error;
mod tauri_bridge;
mod viewport;

use ::bevy::log::{error, info};
use std::{thread, time::Duration};
use tauri_bridge::{SharedFrameBuffer, SharedMouseInput, SharedPerfStats, SharedViewport};

/// Main entry point for the Tauri application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Create shared state
    let buffer = SharedFrameBuffer::default();
    let perf_stats = SharedPerfStats::default();
    let mouse_input = SharedMouseInput::default();
    let viewport = SharedViewport::default();

    // Start Bevy in background thread
    bevy::start_bevy(bevy::BridgeHandles {
        frame_buffer: buffer.clone(),
        perf_stats: perf_stats.clone(),
        mouse_input: mouse_input.clone(),
        viewport: viewport.clone(),
    });

    // Wait for Bevy to initialize
    thread::sleep(Duration::from_millis(1000));
    info!("[Tauri] Starting...");

    // Clone for the custom protocol handler
    let protocol_buffer = buffer.clone();
    let protocol_perf_stats = perf_stats.clone();

    // Build and run Tauri application
    let result = tauri::Builder::default()
        .manage(buffer)
        .manage(perf_stats)
        .manage(mouse_input)
        .manage(viewport)
        // Register custom protocol "frame://" for direct binary transfer
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let buffer = protocol_buffer.clone();
            let perf_stats = protocol_perf_stats.clone();

            // Handle the request in a separate thread to avoid blocking
            thread::spawn(move || {
                // For Tauri v2, URL format is: http://frame.localhost/path
                let response = tauri_bridge::protocol::handle_frame_protocol(
                    request.uri().path(),
                    &buffer,
                    &perf_stats,
                );
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::get_frame,
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_performance_stats,
            tauri_bridge::commands::send_mouse_input,
            tauri_bridge::commands::resize_viewport
        ])
        .run(tauri::generate_context!());

    if let Err(err) = result {
        error!("[Tauri] Application error: {}", err);
    }
}
