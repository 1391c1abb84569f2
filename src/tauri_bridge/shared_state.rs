//! Shared state structures for communication between Tauri and Bevy
//!
//! Each handle is a cloneable `Arc<Mutex<_>>` newtype. Tauri manages one
//! clone per handle; the Bevy thread holds another as a resource.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::BridgeError;
use crate::controls::FanControls;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> Result<MutexGuard<'a, T>, BridgeError> {
    mutex.lock().map_err(|_| BridgeError::LockPoisoned(what))
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// Latest rendered frame as tightly packed RGBA8 pixels
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Vec<u8>>>>);

impl SharedFrameBuffer {
    pub fn publish(&self, rgba: Vec<u8>) -> Result<(), BridgeError> {
        *lock(&self.0, "frame buffer")? = Some(rgba);
        Ok(())
    }

    /// Clone of the latest frame, or `FrameNotReady` before the first one
    pub fn latest(&self) -> Result<Vec<u8>, BridgeError> {
        lock(&self.0, "frame buffer")?
            .clone()
            .ok_or(BridgeError::FrameNotReady)
    }
}

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Page Controls
// =============================================================================

/// Spin flag, click counter and slider, written only by the page
#[derive(Clone, Default)]
pub struct SharedFanControls(pub Arc<Mutex<FanControls>>);

impl SharedFanControls {
    pub fn with<R>(&self, f: impl FnOnce(&mut FanControls) -> R) -> Result<R, BridgeError> {
        let mut guard = lock(&self.0, "fan controls")?;
        Ok(f(&mut guard))
    }
}

// =============================================================================
// Pointer
// =============================================================================

/// Last pointer position over the viewport, normalized to `[-1, 1]` with y up
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    /// Clamp into the viewport square; non-finite components fall back to 0
    pub fn normalized(x: f32, y: f32) -> Self {
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            x: axis(x),
            y: axis(y),
        }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Pointer sample shared with Bevy. Holds the last value until replaced.
#[derive(Clone, Default)]
pub struct SharedPointer(pub Arc<Mutex<PointerSample>>);

impl SharedPointer {
    pub fn store(&self, sample: PointerSample) -> Result<(), BridgeError> {
        *lock(&self.0, "pointer")? = sample;
        Ok(())
    }

    pub fn load(&self) -> Result<PointerSample, BridgeError> {
        Ok(*lock(&self.0, "pointer")?)
    }
}

// =============================================================================
// Render Statistics
// =============================================================================

/// Frame pipeline statistics for the page's debug overlay
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RenderStats {
    pub gpu_transfer_ms: f64,
    pub data_processing_ms: f64,
    pub bevy_fps: f64,
    pub frame_count: u32,
    pub data_size_kb: f64,
    pub encode_ms: f64,
}

#[derive(Clone, Default)]
pub struct SharedRenderStats(pub Arc<Mutex<RenderStats>>);

impl SharedRenderStats {
    pub fn update(&self, f: impl FnOnce(&mut RenderStats)) -> Result<(), BridgeError> {
        f(&mut *lock(&self.0, "render stats")?);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<RenderStats, BridgeError> {
        Ok(lock(&self.0, "render stats")?.clone())
    }
}
