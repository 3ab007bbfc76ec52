//! Frame extraction system
//!
//! This module handles extracting rendered frames from the GPU and
//! preparing them for transfer to the Tauri frontend.

use bevy::{prelude::*, time::Time};

use crate::bevy::resources::{
    AnimationClock, FrameBufferRes, FrameCount, FramePacket, FrameRateLimiter, FrameTimings,
    MainWorldReceiver, PerfStatsRes, PreRollFrames,
};
use crate::config::performance::*;
use crate::tauri_bridge::shared_state::Frame;

/// Extract and process frame data from the render pipeline
pub fn extract_and_process_frame(
    receiver: Res<MainWorldReceiver>,
    buffer: Option<Res<FrameBufferRes>>,
    perf_stats: Option<Res<PerfStatsRes>>,
    clock: Res<AnimationClock>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut timings: ResMut<FrameTimings>,
    mut frame_limiter: ResMut<FrameRateLimiter>,
    time: Res<Time>,
) {
    let Some(b) = buffer else { return };

    // Wait for scene to be fully rendered
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 % 10 == 0 && pre_roll.0 > 0 {
            debug!("[Bevy] Pre-roll frames remaining: {}", pre_roll.0);
        }
        return;
    }

    // Frame rate limiting - skip if not enough time has passed
    let now = std::time::Instant::now();
    let elapsed = now.duration_since(frame_limiter.last_frame_time);
    if elapsed < frame_limiter.min_frame_interval {
        // Drain the receiver but don't process - too early for next frame
        while receiver.try_recv().is_ok() {}
        return;
    }
    frame_limiter.last_frame_time = now;

    let frame_start = std::time::Instant::now();

    // Try to receive latest frame data from render world
    let receive_start = std::time::Instant::now();
    let mut latest: Option<FramePacket> = None;
    while let Ok(packet) = receiver.try_recv() {
        latest = Some(packet);
    }
    let receive_time = receive_start.elapsed().as_secs_f64() * 1000.0;

    let Some(packet) = latest else { return };

    // Remove row padding and store raw RGBA data
    let process_start = std::time::Instant::now();
    let Some(rgba) = strip_row_padding(
        &packet.data,
        packet.width,
        packet.height,
        packet.padded_bytes_per_row,
    ) else {
        warn!(
            "[Bevy] Dropping {}x{} frame with {} bytes",
            packet.width,
            packet.height,
            packet.data.len()
        );
        return;
    };
    let process_time = process_start.elapsed().as_secs_f64() * 1000.0;
    let data_size = rgba.len();

    let frame = Frame {
        width: packet.width,
        height: packet.height,
        rgba,
    };
    if let Err(err) = b.0.store(frame) {
        warn_once!("[Bevy] {err}");
        return;
    }
    count.0 += 1;

    let total_time = frame_start.elapsed().as_secs_f64() * 1000.0;
    timings.frame_times.push(total_time);

    // Keep only last N samples for averaging
    if timings.frame_times.len() > FRAME_TIMING_SAMPLES {
        timings.frame_times.remove(0);
    }

    let avg_time = timings.frame_times.iter().sum::<f64>() / timings.frame_times.len() as f64;

    // Update performance stats
    if let Some(perf_res) = &perf_stats {
        perf_res.0.update(|stats| {
            stats.gpu_transfer_ms = receive_time;
            stats.data_processing_ms = process_time;
            stats.frame_encoding_ms = total_time;
            stats.frame_count = count.0;
            stats.data_size_kb = data_size as f64 / 1024.0;
            stats.animation_ticks = clock.ticks;
            stats.bevy_fps = if avg_time > 0.0 { 1000.0 / avg_time } else { 0.0 };
        });
    }

    // Print detailed stats periodically
    let current_time = time.elapsed_secs_f64();
    if current_time - timings.last_print_time >= STATS_PRINT_INTERVAL {
        let max_time = timings.frame_times.iter().cloned().fold(0.0f64, f64::max);
        let min_time = timings.frame_times.iter().cloned().fold(f64::MAX, f64::min);

        info!(
            "[Bevy] Frame {} | Tick {} | {}x{} | Receive: {:.2}ms | Process: {:.2}ms | Total: {:.2}ms | Avg: {:.2}ms (Min: {:.2}ms, Max: {:.2}ms) | Size: {:.1}KB",
            count.0,
            clock.ticks,
            packet.width,
            packet.height,
            receive_time,
            process_time,
            total_time,
            avg_time,
            min_time,
            max_time,
            data_size as f64 / 1024.0
        );
        timings.last_print_time = current_time;
    }
}

/// Remove GPU buffer row padding alignment, returning pure RGBA data
///
/// Returns `None` when `data` is too short for the given dimensions.
pub fn strip_row_padding(
    data: &[u8],
    width: u32,
    height: u32,
    padded_bytes_per_row: usize,
) -> Option<Vec<u8>> {
    let row_bytes = width as usize * 4;
    let rows = height as usize;
    if row_bytes == 0 || rows == 0 || padded_bytes_per_row < row_bytes {
        return None;
    }
    if data.len() < padded_bytes_per_row * (rows - 1) + row_bytes {
        return None;
    }

    if row_bytes == padded_bytes_per_row {
        // No padding, return as-is
        return Some(data[..row_bytes * rows].to_vec());
    }

    // Remove padding from each row
    Some(
        data.chunks(padded_bytes_per_row)
            .take(rows)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_removed_from_every_row() {
        // 2x2 image, rows padded from 8 to 12 bytes
        let data = [
            1, 1, 1, 1, 2, 2, 2, 2, 0, 0, 0, 0, //
            3, 3, 3, 3, 4, 4, 4, 4, 0, 0, 0, 0,
        ];
        let rgba = strip_row_padding(&data, 2, 2, 12).unwrap();
        assert_eq!(rgba, [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4]);
    }

    #[test]
    fn unpadded_rows_pass_through() {
        let data: Vec<u8> = (0..32).collect();
        assert_eq!(strip_row_padding(&data, 4, 2, 16).unwrap(), data);
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(strip_row_padding(&[0; 19], 2, 2, 12).is_none());
        assert!(strip_row_padding(&[], 2, 2, 12).is_none());
        assert!(strip_row_padding(&[0; 16], 4, 1, 8).is_none());
    }
}
