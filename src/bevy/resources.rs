//! Bevy resource definitions
//!
//! Singletons shared by the systems: handles to the bridge state, the
//! animator's carried pose, and frame pipeline bookkeeping.

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use std::time::{Duration, Instant};

use crate::motion::FanPose;
use crate::tauri_bridge::{SharedFanControls, SharedFrameBuffer, SharedPointer, SharedRenderStats};

// =============================================================================
// Page Input
// =============================================================================

/// Page controls as seen from Bevy (read-only by convention)
#[derive(Resource, Clone)]
pub struct ControlsRes(pub SharedFanControls);

/// Latest pointer sample from the page
#[derive(Resource, Clone)]
pub struct PointerRes(pub SharedPointer);

// =============================================================================
// Animation
// =============================================================================

/// Fan orientation carried from one frame to the next
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct FanPoseRes(pub FanPose);

// =============================================================================
// Rendering
// =============================================================================

#[derive(Resource, Clone)]
pub struct FrameBufferRes(pub SharedFrameBuffer);

#[derive(Resource, Clone)]
pub struct RenderStatsRes(pub SharedRenderStats);

// =============================================================================
// Frame Management
// =============================================================================

/// Frames published to the page so far
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Frames still to discard before publishing
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Drops frames that arrive faster than the target output rate
#[derive(Resource)]
pub struct FramePacer {
    last_publish: Instant,
    min_interval: Duration,
}

impl FramePacer {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_publish: Instant::now(),
            min_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }

    /// True (and the clock restarts) when enough time passed since the last publish
    pub fn ready(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_publish) < self.min_interval {
            return false;
        }
        self.last_publish = now;
        true
    }
}

/// Rolling processing times (ms) for the periodic stats log
#[derive(Resource, Default)]
pub struct FrameTimings {
    pub last_log_time: f64,
    pub samples: Vec<f64>,
}

impl FrameTimings {
    pub fn record(&mut self, ms: f64, keep: usize) {
        self.samples.push(ms);
        if self.samples.len() > keep {
            let excess = self.samples.len() - keep;
            self.samples.drain(..excess);
        }
    }

    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
        }
    }
}

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

/// Receives mapped frame buffers from the render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<Vec<u8>>);

/// Sends mapped frame buffers to the main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<Vec<u8>>);
