//! 3D Table Fan Playground
//!
//! A decorative desktop toy: a headless Bevy world renders a table fan
//! offscreen, and a Tauri page shows the frames next to a "breeze" toggle
//! and a fan speed slider that does nothing.
//!
//! Architecture:
//! - Bevy runs in a background thread with NO window
//! - The fan tilts toward the pointer and spins while the toggle is on
//! - GPU texture -> Buffer -> CPU channel -> `frame://` protocol -> page
//!
//! # Module Structure
//!
//! - `config`: Constants and the immutable scene description
//! - `controls`: Page state (spin flag, click counter, slider)
//! - `motion`: Per-frame tilt easing and blade spin math
//! - `tauri_bridge`: Commands, `frame://` protocol, shared state
//! - `bevy`: Scene, animator, frame readback

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod bevy;
mod config;
mod controls;
mod motion;
mod tauri_bridge;

use tauri_bridge::{SharedFanControls, SharedFrameBuffer, SharedPointer, SharedRenderStats};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wgpu=warn,naga=warn"));
    // A host that already installed a subscriber keeps it
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Main entry point for the Tauri application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_logging();
    tracing::info!("starting fan playground");

    let frame_buffer = SharedFrameBuffer::default();
    let stats = SharedRenderStats::default();
    let controls = SharedFanControls::default();
    let pointer = SharedPointer::default();

    let bridge = bevy::BevyBridge {
        frame_buffer: frame_buffer.clone(),
        stats: stats.clone(),
        controls: controls.clone(),
        pointer: pointer.clone(),
    };
    if let Err(err) = bevy::start_bevy(bridge) {
        tracing::error!(error = %err, "failed to spawn bevy thread");
        return;
    }

    let protocol_buffer = frame_buffer.clone();
    let protocol_stats = stats.clone();

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(frame_buffer)
        .manage(stats)
        .manage(controls)
        .manage(pointer)
        // Binary frames over `frame://` skip IPC JSON entirely.
        // Windows and Android expose it as http://frame.localhost/<path>
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let buffer = protocol_buffer.clone();
            let stats = protocol_stats.clone();
            std::thread::spawn(move || {
                let path = request.uri().path();
                let response = tauri_bridge::protocol::handle_frame_protocol(path, &buffer, &stats);
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::toggle_spin,
            tauri_bridge::commands::set_fan_speed,
            tauri_bridge::commands::get_controls,
            tauri_bridge::commands::send_pointer_input,
            tauri_bridge::commands::get_frame,
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_render_stats,
        ])
        .run(tauri::generate_context!());

    if let Err(err) = result {
        tracing::error!(error = %err, "tauri exited with an error");
    }
}
