//! Per-frame fan motion
//!
//! Pure math behind the frame animator: pointer-driven tilt easing and the
//! constant-velocity blade spin. Nothing here touches the ECS; the
//! `animate_fan` system feeds a [`FrameInput`] in and writes the resulting
//! [`FanPose`] back onto transforms.

use bevy::math::Vec2;

/// Per-invocation easing factor that reproduces the classic 60 Hz feel
pub const DEFAULT_TILT_FACTOR: f32 = 0.04;

/// Blade angular velocity in radians per second
pub const DEFAULT_SPIN_RATE: f32 = 9.0;

/// How tilt easing is scaled between frames
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TiltSmoothing {
    /// Fixed fraction of the remaining distance per frame.
    /// Perceived speed follows the display refresh rate.
    PerFrame { factor: f32 },
    /// Exponential decay at `rate` per second, independent of frame rate.
    TimeScaled { rate: f32 },
}

impl TiltSmoothing {
    /// Time-scaled smoothing that matches `PerFrame { factor }` at `fps`
    pub fn matching_per_frame(factor: f32, fps: f32) -> Self {
        Self::TimeScaled {
            rate: -(1.0 - factor).ln() * fps,
        }
    }

    /// Fraction of the remaining distance covered this frame, in `[0, 1)`
    pub fn factor(self, delta: f32) -> f32 {
        let raw = match self {
            Self::PerFrame { factor } => factor,
            Self::TimeScaled { rate } => 1.0 - (-rate.max(0.0) * delta).exp(),
        };
        if raw.is_finite() {
            raw.clamp(0.0, 1.0 - f32::EPSILON)
        } else {
            0.0
        }
    }
}

impl Default for TiltSmoothing {
    fn default() -> Self {
        Self::PerFrame {
            factor: DEFAULT_TILT_FACTOR,
        }
    }
}

/// Tuning for the frame animator
#[derive(Clone, Debug, PartialEq)]
pub struct MotionConfig {
    /// Pitch (rotation about X) per unit of vertical pointer offset
    pub pitch_gain: f32,
    /// Yaw (rotation about Y) per unit of horizontal pointer offset
    pub yaw_gain: f32,
    pub smoothing: TiltSmoothing,
    pub spin_rate: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pitch_gain: 0.15,
            yaw_gain: 0.25,
            smoothing: TiltSmoothing::default(),
            spin_rate: DEFAULT_SPIN_RATE,
        }
    }
}

/// Everything the animator samples for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Normalized pointer position, both axes in `[-1, 1]`, y up
    pub pointer: Vec2,
    /// Seconds since the previous frame
    pub delta: f32,
    pub spinning: bool,
}

/// Orientation state carried between frames
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FanPose {
    /// Smoothed (pitch, yaw) of the whole fan
    pub tilt: Vec2,
    /// Blade assembly rotation about its spin axis, unbounded.
    /// Accumulated in f64 so long sessions keep a constant spin rate.
    pub blade_angle: f64,
}

/// Tilt the fan should ease toward for a pointer sample
pub fn tilt_target(pointer: Vec2, config: &MotionConfig) -> Vec2 {
    Vec2::new(pointer.y * config.pitch_gain, pointer.x * config.yaw_gain)
}

impl FanPose {
    /// Advance by one frame
    pub fn advance(&mut self, input: &FrameInput, config: &MotionConfig) {
        let delta = if input.delta.is_finite() {
            input.delta.max(0.0)
        } else {
            0.0
        };

        let target = tilt_target(input.pointer, config);
        let factor = config.smoothing.factor(delta);
        self.tilt.x += (target.x - self.tilt.x) * factor;
        self.tilt.y += (target.y - self.tilt.y) * factor;

        if input.spinning {
            self.blade_angle -= f64::from(delta) * f64::from(config.spin_rate);
        }
    }
}
