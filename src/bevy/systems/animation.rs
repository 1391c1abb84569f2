//! Animation systems
//!
//! The frame animator: samples the page controls and pointer once per
//! frame, advances the carried [`FanPose`], and writes tilt and spin back
//! onto the fan's transforms.

use bevy::{math::EulerRot, prelude::*, time::Time};

use crate::bevy::components::{BladeAssembly, FanBody};
use crate::bevy::resources::{ControlsRes, FanPoseRes, PointerRes};
use crate::config::SceneConfig;
use crate::motion::{FanPose, FrameInput};

/// Last page input read successfully; reused if a shared lock is poisoned
#[derive(Default)]
pub struct LastSample {
    pointer: Vec2,
    spinning: bool,
}

/// Ease the tilt toward the pointer and spin the blades while enabled
pub fn animate_fan(
    time: Res<Time>,
    config: Res<SceneConfig>,
    controls: Option<Res<ControlsRes>>,
    pointer: Option<Res<PointerRes>>,
    mut pose: ResMut<FanPoseRes>,
    mut last: Local<LastSample>,
    mut bodies: Query<&mut Transform, (With<FanBody>, Without<BladeAssembly>)>,
    mut assemblies: Query<&mut Transform, (With<BladeAssembly>, Without<FanBody>)>,
) {
    if let Some(controls) = controls {
        if let Ok(spinning) = controls.0.with(|c| c.spinning()) {
            last.spinning = spinning;
        }
    }
    if let Some(pointer) = pointer {
        if let Ok(sample) = pointer.0.load() {
            last.pointer = sample.as_vec2();
        }
    }

    let input = FrameInput {
        pointer: last.pointer,
        delta: time.delta_secs(),
        spinning: last.spinning,
    };
    pose.0.advance(&input, &config.motion);

    for mut transform in bodies.iter_mut() {
        transform.rotation = body_rotation(&pose.0);
    }
    for mut transform in assemblies.iter_mut() {
        transform.rotation = blade_rotation(&pose.0);
    }
}

fn body_rotation(pose: &FanPose) -> Quat {
    Quat::from_euler(EulerRot::XYZ, pose.tilt.x, pose.tilt.y, 0.0)
}

fn blade_rotation(pose: &FanPose) -> Quat {
    // Wrap before narrowing so f32 keeps full precision
    let wrapped = pose.blade_angle.rem_euclid(std::f64::consts::TAU);
    Quat::from_rotation_z(wrapped as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    use crate::tauri_bridge::shared_state::PointerSample;
    use crate::tauri_bridge::{SharedFanControls, SharedPointer};

    struct Rig {
        world: World,
        controls: SharedFanControls,
        pointer: SharedPointer,
        body: Entity,
        blades: Entity,
    }

    fn rig() -> Rig {
        let controls = SharedFanControls::default();
        let pointer = SharedPointer::default();
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        world.insert_resource(SceneConfig::default());
        world.insert_resource(FanPoseRes::default());
        world.insert_resource(ControlsRes(controls.clone()));
        world.insert_resource(PointerRes(pointer.clone()));
        let body = world.spawn((Transform::default(), FanBody)).id();
        let blades = world.spawn((Transform::default(), BladeAssembly)).id();
        Rig {
            world,
            controls,
            pointer,
            body,
            blades,
        }
    }

    fn step(world: &mut World, delta: f32) {
        world
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(delta));
        world.run_system_once(animate_fan).unwrap();
    }

    #[test]
    fn stopped_fan_keeps_blade_angle() {
        let mut rig = rig();
        for _ in 0..30 {
            step(&mut rig.world, 1.0 / 60.0);
        }
        assert_eq!(rig.world.resource::<FanPoseRes>().0.blade_angle, 0.0);
        let rotation = rig.world.get::<Transform>(rig.blades).unwrap().rotation;
        assert_eq!(rotation, Quat::from_rotation_z(0.0));
    }

    #[test]
    fn one_click_then_ten_frames_turns_blades() {
        let mut rig = rig();
        let snapshot = rig.controls.with(|c| c.toggle_spin()).unwrap();
        assert!(snapshot.spinning);
        assert_eq!(snapshot.clicks, 1);

        for _ in 0..10 {
            step(&mut rig.world, 1.0 / 60.0);
        }

        let angle = rig.world.resource::<FanPoseRes>().0.blade_angle;
        assert!((angle + 1.5).abs() < 1e-4, "angle was {angle}");
        let rotation = rig.world.get::<Transform>(rig.blades).unwrap().rotation;
        assert!(rotation.angle_between(Quat::from_rotation_z(-1.5)) < 1e-3);
    }

    #[test]
    fn toggling_off_freezes_blades_mid_turn() {
        let mut rig = rig();
        rig.controls.with(|c| c.toggle_spin()).unwrap();
        step(&mut rig.world, 0.1);
        rig.controls.with(|c| c.toggle_spin()).unwrap();
        let frozen = rig.world.resource::<FanPoseRes>().0.blade_angle;
        for _ in 0..5 {
            step(&mut rig.world, 0.1);
        }
        assert_eq!(
            rig.world.resource::<FanPoseRes>().0.blade_angle.to_bits(),
            frozen.to_bits()
        );
    }

    #[test]
    fn blade_rotation_stays_precise_at_large_angles() {
        let pose = FanPose {
            tilt: Vec2::ZERO,
            blade_angle: -std::f64::consts::TAU * 100_000.0 - 1.5,
        };
        let expected = Quat::from_rotation_z(-1.5);
        assert!(blade_rotation(&pose).angle_between(expected) < 1e-4);
    }

    #[test]
    fn pointer_tilts_fan_body() {
        let mut rig = rig();
        rig.pointer.store(PointerSample::normalized(1.0, 1.0)).unwrap();
        step(&mut rig.world, 1.0 / 60.0);

        let tilt = rig.world.resource::<FanPoseRes>().0.tilt;
        assert!((tilt.x - 0.006).abs() < 1e-6);
        assert!((tilt.y - 0.01).abs() < 1e-6);

        let rotation = rig.world.get::<Transform>(rig.body).unwrap().rotation;
        let expected = Quat::from_euler(EulerRot::XYZ, 0.006, 0.01, 0.0);
        assert!(rotation.angle_between(expected) < 1e-5);
    }

    #[test]
    fn slider_movement_leaves_animation_untouched() {
        let mut moved = rig();
        let mut still = rig();
        moved.controls.with(|c| c.set_fan_speed(100)).unwrap();
        for _ in 0..20 {
            step(&mut moved.world, 1.0 / 60.0);
            step(&mut still.world, 1.0 / 60.0);
        }
        assert_eq!(
            moved.world.resource::<FanPoseRes>().0,
            still.world.resource::<FanPoseRes>().0
        );
    }

    #[test]
    fn runs_without_bridge_resources() {
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        world.insert_resource(SceneConfig::default());
        world.insert_resource(FanPoseRes::default());
        step(&mut world, 1.0 / 60.0);
        assert_eq!(world.resource::<FanPoseRes>().0, FanPose::default());
    }
}
