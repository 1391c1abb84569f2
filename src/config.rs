//! Configuration constants and settings for the fan playground
//!
//! Render resolution, frame pacing and encoding settings are plain
//! constants. The 3D scene itself (camera, lights, fan geometry, materials
//! and motion tuning) is described by [`SceneConfig`], built once and
//! inserted into the Bevy world as an immutable resource.

use bevy::prelude::*;

use crate::motion::MotionConfig;

/// Width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 960;

/// Height of the offscreen render target in pixels (16:9 viewport)
pub const RENDER_HEIGHT: u32 = 540;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of frames to discard before publishing output
/// This allows the scene to fully load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Bounds of the decorative fan speed slider
pub mod slider {
    pub const FAN_SPEED_MIN: u8 = 0;
    pub const FAN_SPEED_MAX: u8 = 100;
    pub const FAN_SPEED_DEFAULT: u8 = 50;
}

/// Performance monitoring settings
pub mod performance {
    /// Interval for logging render stats (seconds)
    pub const STATS_PRINT_INTERVAL: f64 = 2.0;

    /// Number of frame timing samples to keep for averaging
    pub const FRAME_TIMING_SAMPLES: usize = 60;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}

// =============================================================================
// Scene Description
// =============================================================================

/// Immutable description of everything the scene spawns
#[derive(Resource, Clone, Debug, Default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub fan: FanModel,
    pub motion: MotionConfig,
}

/// Fixed camera placement
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub clear_color: Color,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.2, 1.6, 3.2),
            look_at: Vec3::ZERO,
            fov_degrees: 42.0,
            clear_color: Color::srgb_u8(0xf2, 0xf5, 0xf9),
        }
    }
}

/// Light rig: ambient fill, one shadow-casting key light and a
/// two-colour hemisphere approximation
#[derive(Clone, Debug)]
pub struct LightingConfig {
    pub ambient_brightness: f32,
    pub key_position: Vec3,
    pub key_illuminance: f32,
    pub sky_color: Color,
    pub ground_color: Color,
    /// Brightness added to the ambient term in the sky colour
    pub hemisphere_brightness: f32,
    /// Illuminance of the upward fill light in the ground colour
    pub hemisphere_fill_illuminance: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_brightness: 250.0,
            key_position: Vec3::new(4.0, 6.0, 4.0),
            key_illuminance: 4_400.0,
            sky_color: Color::WHITE,
            ground_color: Color::srgb_u8(0x22, 0x33, 0x44),
            hemisphere_brightness: 250.0,
            hemisphere_fill_illuminance: 600.0,
        }
    }
}

/// Surface finish shared by several fan parts
#[derive(Clone, Copy, Debug)]
pub struct Finish {
    pub color: [u8; 3],
    pub metallic: f32,
    pub roughness: f32,
    pub opacity: f32,
}

impl Finish {
    const fn opaque(color: [u8; 3], metallic: f32, roughness: f32) -> Self {
        Self {
            color,
            metallic,
            roughness,
            opacity: 1.0,
        }
    }

    pub fn to_material(self) -> StandardMaterial {
        let [r, g, b] = self.color;
        let alpha = (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        StandardMaterial {
            base_color: Color::srgba_u8(r, g, b, alpha),
            metallic: self.metallic,
            perceptual_roughness: self.roughness,
            alpha_mode: if self.opacity < 1.0 {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..default()
        }
    }
}

/// Geometry of the table fan, in the fan group's local space
#[derive(Clone, Debug)]
pub struct FanModel {
    pub origin: Vec3,

    pub base_offset: Vec3,
    pub base_radius_top: f32,
    pub base_radius_bottom: f32,
    pub base_height: f32,
    pub base_segments: u32,

    pub pole_offset: Vec3,
    pub pole_radius: f32,
    pub pole_height: f32,

    pub head_offset: Vec3,
    pub head_radius: f32,
    pub head_segments: u32,

    pub ring_offset: Vec3,
    pub ring_radius: f32,
    pub ring_tube_radius: f32,
    pub ring_tube_segments: u32,
    pub ring_segments: u32,

    pub hub_offset: Vec3,
    pub hub_radius: f32,
    pub hub_height: f32,

    pub blades_offset: Vec3,
    pub blade_count: u32,
    pub blade_size: Vec3,
    pub tip_radius: f32,

    /// Radial resolution of the small cylinders (pole, hub, blade tips)
    pub cylinder_segments: u32,

    pub metal: Finish,
    pub dark: Finish,
    pub blade: Finish,
    pub ring: Finish,
    pub ground_color: [u8; 3],
    pub ground_size: f32,
    pub ground_height: f32,
}

impl Default for FanModel {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, -0.3, 0.0),

            base_offset: Vec3::new(0.0, -1.2, 0.0),
            base_radius_top: 0.6,
            base_radius_bottom: 0.8,
            base_height: 0.25,
            base_segments: 24,

            pole_offset: Vec3::new(0.0, -0.5, 0.0),
            pole_radius: 0.08,
            pole_height: 1.3,

            head_offset: Vec3::new(0.0, 0.3, 0.0),
            head_radius: 0.22,
            head_segments: 24,

            ring_offset: Vec3::new(0.0, 0.3, 0.0),
            ring_radius: 0.85,
            ring_tube_radius: 0.03,
            ring_tube_segments: 16,
            ring_segments: 64,

            hub_offset: Vec3::new(0.0, 0.3, 0.05),
            hub_radius: 0.12,
            hub_height: 0.12,

            blades_offset: Vec3::new(0.0, 0.3, 0.06),
            blade_count: 4,
            blade_size: Vec3::new(1.2, 0.18, 0.04),
            tip_radius: 0.09,

            cylinder_segments: 16,

            metal: Finish::opaque([0x8f, 0xa3, 0xb8], 0.8, 0.3),
            dark: Finish::opaque([0x2b, 0x3a, 0x4a], 0.4, 0.6),
            blade: Finish {
                color: [0x9e, 0xc7, 0xff],
                metallic: 0.2,
                roughness: 0.35,
                opacity: 0.9,
            },
            ring: Finish::opaque([0x6b, 0x93, 0xc0], 0.5, 0.4),
            ground_color: [0xf2, 0xf5, 0xf9],
            ground_size: 20.0,
            ground_height: -1.33,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::color::Alpha;

    #[test]
    fn translucent_finish_blends() {
        let material = FanModel::default().blade.to_material();
        assert!(matches!(material.alpha_mode, AlphaMode::Blend));
        assert!((material.base_color.alpha() - 230.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn opaque_finish_stays_opaque() {
        let material = FanModel::default().metal.to_material();
        assert!(matches!(material.alpha_mode, AlphaMode::Opaque));
        assert!((material.metallic - 0.8).abs() < f32::EPSILON);
        assert!((material.perceptual_roughness - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn slider_default_is_inside_bounds() {
        assert!(slider::FAN_SPEED_DEFAULT >= slider::FAN_SPEED_MIN);
        assert!(slider::FAN_SPEED_DEFAULT <= slider::FAN_SPEED_MAX);
    }
}
