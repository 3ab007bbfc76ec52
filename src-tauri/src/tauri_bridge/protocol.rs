//! Custom protocol handlers for efficient data transfer
//!
//! This module implements the `frame://` custom protocol for direct binary
//! transfer of render frames, bypassing Tauri's IPC JSON serialization.

use bevy::log::{debug, warn};
use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageEncoder, Rgba};
use tauri::http::{Response as HttpResponse, StatusCode};

use super::shared_state::{Frame, SharedFrameBuffer, SharedPerfStats};
use crate::config::compression::JPEG_QUALITY;
use crate::error::BridgeError;

type Response = HttpResponse<Vec<u8>>;

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame
/// - `frame.raw`: Raw RGBA frame
/// - `stats`: Performance statistics as JSON
pub fn handle_frame_protocol(
    uri_path: &str,
    buffer: &SharedFrameBuffer,
    perf_stats: &SharedPerfStats,
) -> Response {
    let resource = uri_path.trim_start_matches('/');

    debug!("[Protocol] Resolved resource: {}", resource);

    let result = match resource {
        "frame" | "frame.jpg" => handle_jpeg_frame(buffer),
        "frame.raw" => handle_raw_frame(buffer),
        "stats" => handle_stats(perf_stats),
        _ => Ok(text(StatusCode::NOT_FOUND, "Not Found")),
    };

    result.unwrap_or_else(|err| error_response(resource, err))
}

fn error_response(resource: &str, err: BridgeError) -> Response {
    match err {
        BridgeError::FrameNotReady => text(StatusCode::SERVICE_UNAVAILABLE, "Frame not ready"),
        err => {
            warn!("[Protocol] Failed to serve {}: {}", resource, err);
            text(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Handle JPEG-compressed frame request
fn handle_jpeg_frame(buffer: &SharedFrameBuffer) -> Result<Response, BridgeError> {
    let frame = buffer.latest()?.ok_or(BridgeError::FrameNotReady)?;
    let jpeg = encode_jpeg(&frame)?;
    Ok(frame_response(&frame, "image/jpeg", jpeg))
}

/// Handle raw RGBA frame request
fn handle_raw_frame(buffer: &SharedFrameBuffer) -> Result<Response, BridgeError> {
    let frame = buffer.latest()?.ok_or(BridgeError::FrameNotReady)?;
    frame.validate()?;
    let body = frame.rgba.clone();
    Ok(frame_response(&frame, "application/octet-stream", body))
}

/// Handle performance stats request
fn handle_stats(perf_stats: &SharedPerfStats) -> Result<Response, BridgeError> {
    json_response(&perf_stats.snapshot()?)
}

fn json_response<T: serde::Serialize>(value: &T) -> Result<Response, BridgeError> {
    let json = serde_json::to_vec(value)?;
    Ok(build(
        HttpResponse::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*"),
        json,
    ))
}

/// Compress RGBA to JPEG (no alpha channel)
fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, BridgeError> {
    frame.validate()?;
    let rgba: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.rgba.clone()).ok_or(
            BridgeError::FrameSize {
                len: frame.rgba.len(),
                expected: frame.width as usize * frame.height as usize * 4,
            },
        )?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY).write_image(
        rgb.as_raw(),
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(jpeg_data)
}

fn frame_response(frame: &Frame, content_type: &str, body: Vec<u8>) -> Response {
    build(
        HttpResponse::builder()
            .status(StatusCode::OK)
            .header("Content-Type", content_type)
            .header("X-Frame-Width", frame.width.to_string())
            .header("X-Frame-Height", frame.height.to_string())
            .header("Access-Control-Allow-Origin", "*")
            .header(
                "Access-Control-Expose-Headers",
                "X-Frame-Width, X-Frame-Height",
            ),
        body,
    )
}

fn text(status: StatusCode, message: &str) -> Response {
    build(
        HttpResponse::builder()
            .status(status)
            .header("Content-Type", "text/plain")
            .header("Access-Control-Allow-Origin", "*"),
        message.as_bytes().to_vec(),
    )
}

fn build(builder: tauri::http::response::Builder, body: Vec<u8>) -> Response {
    builder.body(body).unwrap_or_else(|err| {
        warn!("[Protocol] Invalid response: {}", err);
        let mut response = HttpResponse::new(Vec::new());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with_frame() -> SharedFrameBuffer {
        let buffer = SharedFrameBuffer::default();
        buffer
            .store(Frame {
                width: 4,
                height: 2,
                rgba: vec![200; 4 * 2 * 4],
            })
            .unwrap();
        buffer
    }

    #[test]
    fn unknown_resource_is_not_found() {
        let response = handle_frame_protocol(
            "/nope",
            &SharedFrameBuffer::default(),
            &SharedPerfStats::default(),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn frame_before_first_render_is_unavailable() {
        let response = handle_frame_protocol(
            "/frame",
            &SharedFrameBuffer::default(),
            &SharedPerfStats::default(),
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn serves_jpeg_and_raw_frames() {
        let buffer = buffer_with_frame();
        let stats = SharedPerfStats::default();

        let jpeg = handle_frame_protocol("/frame.jpg", &buffer, &stats);
        assert_eq!(jpeg.status(), StatusCode::OK);
        assert_eq!(jpeg.headers()["Content-Type"], "image/jpeg");
        assert_eq!(jpeg.headers()["X-Frame-Width"], "4");
        assert_eq!(&jpeg.body()[..2], &[0xFF, 0xD8]);

        let raw = handle_frame_protocol("frame.raw", &buffer, &stats);
        assert_eq!(raw.status(), StatusCode::OK);
        assert_eq!(raw.body().len(), 32);
    }

    #[test]
    fn truncated_frame_is_a_server_error() {
        let buffer = SharedFrameBuffer::default();
        buffer
            .store(Frame {
                width: 4,
                height: 4,
                rgba: vec![0; 10],
            })
            .unwrap();
        let response = handle_frame_protocol("/frame", &buffer, &SharedPerfStats::default());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unserializable_stats_are_a_server_error() {
        // JSON object keys must be strings
        let stats = std::collections::BTreeMap::from([((1u8, 2u8), 0.5f64)]);
        let err = json_response(&stats).unwrap_err();
        assert!(matches!(err, BridgeError::Json(_)));

        let response = error_response("stats", err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.body().is_empty());
    }

    #[test]
    fn stats_are_json() {
        let stats = SharedPerfStats::default();
        stats.update(|s| s.textures_failed = 3);
        let response = handle_frame_protocol("/stats", &SharedFrameBuffer::default(), &stats);
        let value: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(value["textures_failed"], 3);
    }
}
