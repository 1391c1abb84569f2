//! Custom `frame://` protocol
//!
//! Serves rendered frames as binary bodies so the page can point an image
//! at them instead of round-tripping pixels through IPC JSON.

use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageEncoder, RgbaImage};
use tauri::http::{header::CONTENT_TYPE, Response as HttpResponse, StatusCode};

use super::error::BridgeError;
use super::shared_state::{SharedFrameBuffer, SharedRenderStats};
use crate::config::{compression::JPEG_QUALITY, RENDER_HEIGHT, RENDER_WIDTH};

type Response = HttpResponse<Vec<u8>>;

/// Route a `frame://` request
///
/// - `frame` / `frame.jpg`: JPEG-compressed frame
/// - `frame.raw`: raw RGBA8 frame
/// - `stats`: render statistics as JSON
pub fn handle_frame_protocol(
    uri_path: &str,
    buffer: &SharedFrameBuffer,
    stats: &SharedRenderStats,
) -> Response {
    let resource = uri_path.trim_start_matches('/');
    tracing::trace!(resource, "frame protocol request");

    let result = match resource {
        "frame" | "frame.jpg" => jpeg_frame(buffer, stats),
        "frame.raw" => raw_frame(buffer),
        "stats" => stats_json(stats),
        _ => Ok(plain(StatusCode::NOT_FOUND, "Not Found")),
    };

    result.unwrap_or_else(|err| {
        let status = match err {
            BridgeError::FrameNotReady => StatusCode::SERVICE_UNAVAILABLE,
            BridgeError::LockPoisoned(_) | BridgeError::Encode(_) => {
                tracing::warn!(error = %err, resource, "frame protocol failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        plain(status, &err.to_string())
    })
}

fn jpeg_frame(buffer: &SharedFrameBuffer, stats: &SharedRenderStats) -> Result<Response, BridgeError> {
    let rgba = buffer.latest()?;
    let encode_start = std::time::Instant::now();
    let jpeg = encode_jpeg(rgba, RENDER_WIDTH, RENDER_HEIGHT)?;
    let encode_ms = encode_start.elapsed().as_secs_f64() * 1000.0;
    stats.update(|s| s.encode_ms = encode_ms)?;
    Ok(frame_response("image/jpeg", jpeg))
}

fn raw_frame(buffer: &SharedFrameBuffer) -> Result<Response, BridgeError> {
    let rgba = buffer.latest()?;
    Ok(frame_response("application/octet-stream", rgba))
}

fn stats_json(stats: &SharedRenderStats) -> Result<Response, BridgeError> {
    let snapshot = stats.snapshot()?;
    let body = serde_json::to_vec(&snapshot).map_err(|e| BridgeError::Encode(e.to_string()))?;
    Ok(HttpResponse::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body)
        .unwrap_or_default())
}

/// RGBA → RGB → JPEG (the alpha channel carries nothing for an opaque render)
pub fn encode_jpeg(rgba: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, BridgeError> {
    let img = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| BridgeError::Encode(format!("buffer does not match {width}x{height}")))?;
    let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| BridgeError::Encode(e.to_string()))?;
    Ok(jpeg)
}

fn frame_response(content_type: &str, body: Vec<u8>) -> Response {
    HttpResponse::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header("X-Frame-Width", RENDER_WIDTH.to_string())
        .header("X-Frame-Height", RENDER_HEIGHT.to_string())
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Expose-Headers",
            "X-Frame-Width, X-Frame-Height",
        )
        .body(body)
        .unwrap_or_default()
}

fn plain(status: StatusCode, message: &str) -> Response {
    HttpResponse::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(message.as_bytes().to_vec())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_frame() -> Vec<u8> {
        vec![128; (RENDER_WIDTH * RENDER_HEIGHT * 4) as usize]
    }

    #[test]
    fn unknown_path_is_not_found() {
        let response = handle_frame_protocol(
            "/nope",
            &SharedFrameBuffer::default(),
            &SharedRenderStats::default(),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn frame_before_first_render_is_unavailable() {
        let buffer = SharedFrameBuffer::default();
        let stats = SharedRenderStats::default();
        for path in ["/frame", "/frame.jpg", "/frame.raw"] {
            let response = handle_frame_protocol(path, &buffer, &stats);
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    #[test]
    fn raw_frame_carries_dimensions() {
        let buffer = SharedFrameBuffer::default();
        buffer.publish(blank_frame()).unwrap();
        let response = handle_frame_protocol("/frame.raw", &buffer, &SharedRenderStats::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["X-Frame-Width"], RENDER_WIDTH.to_string());
        assert_eq!(response.body().len(), blank_frame().len());
    }

    #[test]
    fn jpeg_frame_is_jpeg() {
        let buffer = SharedFrameBuffer::default();
        buffer.publish(blank_frame()).unwrap();
        let response = handle_frame_protocol("frame", &buffer, &SharedRenderStats::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/jpeg");
        assert_eq!(&response.body()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn jpeg_frame_records_encode_time() {
        let buffer = SharedFrameBuffer::default();
        let stats = SharedRenderStats::default();
        buffer.publish(blank_frame()).unwrap();
        assert_eq!(stats.snapshot().unwrap().encode_ms, 0.0);
        let response = handle_frame_protocol("/frame.jpg", &buffer, &stats);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(stats.snapshot().unwrap().encode_ms > 0.0);
    }

    #[test]
    fn mis_sized_frame_is_an_encode_error() {
        assert!(matches!(
            encode_jpeg(vec![0; 12], 4, 4),
            Err(BridgeError::Encode(_))
        ));
    }

    #[test]
    fn stats_are_json() {
        let stats = SharedRenderStats::default();
        stats.update(|s| s.frame_count = 7).unwrap();
        let response = handle_frame_protocol("/stats", &SharedFrameBuffer::default(), &stats);
        assert_eq!(response.status(), StatusCode::OK);
        let parsed: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(parsed["frame_count"], 7);
    }
}
