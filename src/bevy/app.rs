//! Bevy application setup and execution
//!
//! Builds the headless app (no window; the scene renders into an offscreen
//! image) and runs it on its own thread.

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
use crate::config::{SceneConfig, PRE_ROLL_FRAMES, TARGET_FPS};
use crate::tauri_bridge::{SharedFanControls, SharedFrameBuffer, SharedPointer, SharedRenderStats};

/// Shared handles the Bevy side keeps into Tauri-managed state
#[derive(Clone, Default)]
pub struct BevyBridge {
    pub frame_buffer: SharedFrameBuffer,
    pub stats: SharedRenderStats,
    pub controls: SharedFanControls,
    pub pointer: SharedPointer,
}

/// Create and configure the Bevy application
pub fn create_app(bridge: BevyBridge, scene: SceneConfig) -> App {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    );

    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / TARGET_FPS,
    )));

    app.add_plugins(ImageCopyPlugin);

    app.add_systems(Startup, setup_scene);
    app.add_systems(Update, animate_fan);
    app.add_systems(Last, extract_and_process_frame);

    app.insert_resource(scene);
    app.insert_resource(FanPoseRes::default());
    app.insert_resource(ControlsRes(bridge.controls));
    app.insert_resource(PointerRes(bridge.pointer));
    app.insert_resource(FrameBufferRes(bridge.frame_buffer));
    app.insert_resource(RenderStatsRes(bridge.stats));
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(PRE_ROLL_FRAMES));
    app.insert_resource(FrameTimings::default());
    app.insert_resource(FramePacer::new(TARGET_FPS));

    tracing::info!("bevy app configured (headless, offscreen target)");
    app
}

/// Start Bevy in a background thread
pub fn start_bevy(bridge: BevyBridge) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new().name("bevy".into()).spawn(move || {
        tracing::info!("bevy thread started");
        let mut app = create_app(bridge, SceneConfig::default());
        app.run();
    })
}
