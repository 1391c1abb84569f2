//! Tauri command handlers
//!
//! Everything the page can invoke: the spin toggle, the inert slider,
//! pointer samples for the tilt effect, and frame/stat polling.

use base64::{engine::general_purpose::STANDARD, Engine};
use tauri::State;

use super::error::BridgeError;
use super::shared_state::{
    FrameResponse, PointerSample, RenderStats, SharedFanControls, SharedFrameBuffer,
    SharedPointer, SharedRenderStats,
};
use crate::config::{RENDER_HEIGHT, RENDER_WIDTH};
use crate::controls::ControlsSnapshot;

/// Start or stop the breeze
#[tauri::command]
pub fn toggle_spin(controls: State<SharedFanControls>) -> Result<ControlsSnapshot, BridgeError> {
    let snapshot = controls.with(|c| c.toggle_spin())?;
    tracing::info!(
        spinning = snapshot.spinning,
        clicks = snapshot.clicks,
        "spin toggled"
    );
    Ok(snapshot)
}

/// Move the fan speed slider (purely decorative)
#[tauri::command]
pub fn set_fan_speed(
    controls: State<SharedFanControls>,
    value: u8,
) -> Result<ControlsSnapshot, BridgeError> {
    controls.with(|c| c.set_fan_speed(value))
}

#[tauri::command]
pub fn get_controls(controls: State<SharedFanControls>) -> Result<ControlsSnapshot, BridgeError> {
    controls.with(|c| c.snapshot())
}

/// Latest pointer position over the viewport, normalized with y up
#[tauri::command]
pub fn send_pointer_input(pointer: State<SharedPointer>, x: f32, y: f32) -> Result<(), BridgeError> {
    let sample = PointerSample::normalized(x, y);
    tracing::trace!(x = sample.x, y = sample.y, "pointer sample");
    pointer.store(sample)
}

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(
    buffer: State<SharedFrameBuffer>,
    stats: State<SharedRenderStats>,
) -> Result<FrameResponse, BridgeError> {
    let rgba = buffer.latest()?;

    let encode_start = std::time::Instant::now();
    let data = STANDARD.encode(&rgba);
    let encode_ms = encode_start.elapsed().as_secs_f64() * 1000.0;
    stats.update(|s| s.encode_ms = encode_ms)?;

    Ok(FrameResponse {
        data,
        width: RENDER_WIDTH,
        height: RENDER_HEIGHT,
    })
}

#[tauri::command]
pub fn get_render_size() -> (u32, u32) {
    (RENDER_WIDTH, RENDER_HEIGHT)
}

#[tauri::command]
pub fn get_render_stats(stats: State<SharedRenderStats>) -> Result<RenderStats, BridgeError> {
    stats.snapshot()
}
