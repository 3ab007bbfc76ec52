//! Bevy application setup and execution
//!
//! This module handles the creation and configuration of the Bevy app,
//! including plugin registration and system scheduling.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    prelude::*,
    window::ExitCondition,
};
use std::thread;
use std::time::Duration;

use crate::bevy::plugins::ImageCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::systems::*;
use crate::config::{PRE_ROLL_FRAMES, TARGET_FPS};
use crate::tauri_bridge::shared_state::{
    SharedFrameBuffer, SharedMouseInput, SharedPerfStats, SharedViewport,
};

/// State shared with the Tauri side
pub struct BridgeHandles {
    pub frame_buffer: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub mouse_input: SharedMouseInput,
    pub viewport: SharedViewport,
}

/// Create and configure the Bevy application
pub fn create_app(handles: BridgeHandles) -> App {
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: None,
        exit_condition: ExitCondition::DontExit,
        ..default()
    }));

    // Add schedule runner for controlled frame rate
    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / TARGET_FPS,
    )));

    // Add custom plugins
    app.add_plugins(ImageCopyPlugin);

    // Register systems
    app.add_systems(Startup, setup_scene);
    app.add_systems(
        Update,
        (
            apply_viewport_resize,
            update_camera_from_input,
            advance_rotations,
            resolve_texture_loads,
        ),
    );
    app.add_systems(Last, extract_and_process_frame);

    // Insert resources
    let viewport = handles.viewport.current().unwrap_or_default();
    app.insert_resource(FrameBufferRes(handles.frame_buffer));
    app.insert_resource(PerfStatsRes(handles.perf_stats));
    app.insert_resource(MouseInputRes(handles.mouse_input));
    app.insert_resource(ViewportRes(handles.viewport));
    app.insert_resource(RenderViewport(viewport));
    app.insert_resource(OrbitCameraState::default());
    app.insert_resource(AnimationClock::default());
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(PRE_ROLL_FRAMES));
    app.insert_resource(FrameTimings::default());
    app.insert_resource(FrameRateLimiter::new(TARGET_FPS));

    info!("[Bevy] App configured (headless, {}x{} render target)", viewport.width, viewport.height);
    app
}

/// Start Bevy in a background thread
pub fn start_bevy(handles: BridgeHandles) {
    thread::spawn(move || {
        let mut app = create_app(handles);
        info!("[Bevy] Running render loop...");
        app.run();
    });
}
