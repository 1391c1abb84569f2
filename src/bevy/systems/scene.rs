//! Scene setup system
//!
//! Builds the view (offscreen target, fixed camera, lights, ground) and the
//! static table-fan model from [`SceneConfig`].

use std::f32::consts::TAU;

use bevy::{
    asset::Assets,
    camera::RenderTarget,
    core_pipeline::tonemapping::Tonemapping,
    image::Image,
    math::primitives::{ConicalFrustum, Cuboid, Cylinder, Plane3d, Sphere, Torus},
    math::{Quat, Vec3},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    render::{
        render_resource::{Extent3d, TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};

use crate::bevy::components::{Blade, BladeAssembly, BladeTip, FanBody, OffscreenCamera};
use crate::bevy::plugins::image_copy::ImageCopier;
use crate::config::{FanModel, SceneConfig, RENDER_HEIGHT, RENDER_WIDTH};

/// Setup the view container and spawn the fan
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    config: Res<SceneConfig>,
) {
    tracing::info!("setting up fan scene");

    let size = Extent3d {
        width: RENDER_WIDTH,
        height: RENDER_HEIGHT,
        depth_or_array_layers: 1,
    };

    let mut target =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    target.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let target = images.add(target);

    commands.spawn(ImageCopier::new(target.clone(), size, &render_device));

    let camera = &config.camera;
    let lighting = &config.lighting;

    // The sky half of the hemisphere light rides on the ambient term
    let sky = lighting.sky_color.to_linear();
    let ambient_brightness = lighting.ambient_brightness + lighting.hemisphere_brightness;
    let sky_share = lighting.hemisphere_brightness / ambient_brightness.max(f32::EPSILON);
    let ambient_color = LinearRgba::rgb(
        1.0 - sky_share + sky.red * sky_share,
        1.0 - sky_share + sky.green * sky_share,
        1.0 - sky_share + sky.blue * sky_share,
    );

    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(target.into()),
            clear_color: ClearColorConfig::Custom(camera.clear_color),
            ..default()
        },
        Projection::from(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            ..default()
        }),
        AmbientLight {
            color: Color::from(ambient_color),
            brightness: ambient_brightness,
            ..default()
        },
        Tonemapping::None,
        Transform::from_translation(camera.position).looking_at(camera.look_at, Vec3::Y),
        OffscreenCamera,
    ));

    // Key light
    commands.spawn((
        DirectionalLight {
            illuminance: lighting.key_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(lighting.key_position).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Ground half of the hemisphere light, bouncing up from below
    commands.spawn((
        DirectionalLight {
            illuminance: lighting.hemisphere_fill_illuminance,
            color: lighting.ground_color,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, -1.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    let fan = &config.fan;
    let [r, g, b] = fan.ground_color;
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(fan.ground_size, fan.ground_size))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(r, g, b),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, fan.ground_height, 0.0),
    ));

    spawn_fan(&mut commands, &mut meshes, &mut materials, fan);

    tracing::info!("fan scene ready");
}

/// Spawn the fan model and return its root entity
pub fn spawn_fan(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    fan: &FanModel,
) -> Entity {
    let metal = materials.add(fan.metal.to_material());
    let dark = materials.add(fan.dark.to_material());
    let blade = materials.add(fan.blade.to_material());
    let ring = materials.add(fan.ring.to_material());

    let base = meshes.add(
        ConicalFrustum {
            radius_top: fan.base_radius_top,
            radius_bottom: fan.base_radius_bottom,
            height: fan.base_height,
        }
        .mesh()
        .resolution(fan.base_segments),
    );
    let pole = meshes.add(
        Cylinder::new(fan.pole_radius, fan.pole_height)
            .mesh()
            .resolution(fan.cylinder_segments),
    );
    let head = meshes.add(
        Sphere::new(fan.head_radius)
            .mesh()
            .uv(fan.head_segments, fan.head_segments),
    );
    let guard = meshes.add(
        Torus {
            minor_radius: fan.ring_tube_radius,
            major_radius: fan.ring_radius,
        }
        .mesh()
        .minor_resolution(fan.ring_tube_segments as usize)
        .major_resolution(fan.ring_segments as usize),
    );
    let hub = meshes.add(
        Cylinder::new(fan.hub_radius, fan.hub_height)
            .mesh()
            .resolution(fan.cylinder_segments),
    );
    let blade_mesh = meshes.add(Cuboid::new(fan.blade_size.x, fan.blade_size.y, fan.blade_size.z));
    let tip = meshes.add(
        Cylinder::new(fan.tip_radius, fan.blade_size.z)
            .mesh()
            .resolution(fan.cylinder_segments),
    );

    let blade_count = fan.blade_count.max(1);
    let tip_offset = Vec3::new(fan.blade_size.x / 2.0, 0.0, 0.0);

    commands
        .spawn((
            Transform::from_translation(fan.origin),
            Visibility::default(),
            FanBody,
        ))
        .with_children(|body| {
            body.spawn((
                Mesh3d(base),
                MeshMaterial3d(dark.clone()),
                Transform::from_translation(fan.base_offset),
            ));
            body.spawn((
                Mesh3d(pole),
                MeshMaterial3d(metal.clone()),
                Transform::from_translation(fan.pole_offset),
            ));
            body.spawn((
                Mesh3d(head),
                MeshMaterial3d(metal),
                Transform::from_translation(fan.head_offset),
            ));
            // Bevy's torus lies in XZ; stand it up around the spin axis
            body.spawn((
                Mesh3d(guard),
                MeshMaterial3d(ring),
                Transform::from_translation(fan.ring_offset)
                    .with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            ));
            body.spawn((
                Mesh3d(hub),
                MeshMaterial3d(dark),
                Transform::from_translation(fan.hub_offset),
            ));

            body.spawn((
                Transform::from_translation(fan.blades_offset),
                Visibility::default(),
                BladeAssembly,
            ))
            .with_children(|assembly| {
                for slot in 0..blade_count {
                    let angle = TAU * slot as f32 / blade_count as f32;
                    assembly
                        .spawn((
                            Mesh3d(blade_mesh.clone()),
                            MeshMaterial3d(blade.clone()),
                            Transform::from_rotation(Quat::from_rotation_z(angle)),
                            Blade(slot),
                        ))
                        .with_children(|b| {
                            b.spawn((
                                Mesh3d(tip.clone()),
                                MeshMaterial3d(blade.clone()),
                                Transform::from_translation(tip_offset),
                                BladeTip,
                            ));
                        });
                }
            });
        })
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn spawn_default_fan(
        mut commands: Commands,
        mut meshes: ResMut<Assets<Mesh>>,
        mut materials: ResMut<Assets<StandardMaterial>>,
    ) -> Entity {
        spawn_fan(&mut commands, &mut meshes, &mut materials, &FanModel::default())
    }

    fn world_with_fan() -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        let root = world.run_system_once(spawn_default_fan).unwrap();
        (world, root)
    }

    #[test]
    fn fan_has_four_tipped_blades() {
        let (mut world, _) = world_with_fan();
        let blades = world.query::<&Blade>().iter(&world).count();
        let tips = world.query::<&BladeTip>().iter(&world).count();
        assert_eq!(blades, 4);
        assert_eq!(tips, 4);
        assert_eq!(world.query::<&BladeAssembly>().iter(&world).count(), 1);
        assert_eq!(world.query::<&FanBody>().iter(&world).count(), 1);
    }

    #[test]
    fn blades_hang_off_the_assembly() {
        let (mut world, _) = world_with_fan();
        let assembly = world
            .query_filtered::<Entity, With<BladeAssembly>>()
            .single(&world)
            .unwrap();
        let parents: Vec<Entity> = world
            .query_filtered::<&ChildOf, With<Blade>>()
            .iter(&world)
            .map(|child_of| child_of.parent())
            .collect();
        assert_eq!(parents.len(), 4);
        assert!(parents.iter().all(|p| *p == assembly));
    }

    #[test]
    fn blades_are_spaced_a_quarter_turn_apart() {
        let (mut world, _) = world_with_fan();
        let blades: Vec<(Blade, Quat)> = world
            .query::<(&Blade, &Transform)>()
            .iter(&world)
            .map(|(blade, t)| (*blade, t.rotation))
            .collect();
        assert_eq!(blades.len(), 4);
        for (Blade(slot), rotation) in blades {
            let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2 * slot as f32);
            assert!(expected.angle_between(rotation) < 1e-4, "slot {slot}");
        }
    }

    #[test]
    fn fan_root_sits_at_model_origin() {
        let (world, root) = world_with_fan();
        let transform = world.get::<Transform>(root).unwrap();
        assert_eq!(transform.translation, FanModel::default().origin);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn materials_are_shared_across_parts() {
        let (world, _) = world_with_fan();
        // metal, dark, blade, ring
        assert_eq!(world.resource::<Assets<StandardMaterial>>().len(), 4);
    }
}
