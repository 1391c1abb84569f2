//! GPU → CPU frame readback
//!
//! A render graph node copies the offscreen target into a mappable buffer
//! after the camera driver runs; a render-world system then maps that buffer
//! and ships the bytes to the main world over a channel. Rows keep the GPU's
//! 256-byte alignment padding; `frame_extraction` strips it.

use bevy::{
    prelude::*,
    render::{
        render_asset::RenderAssets,
        render_graph::{self, NodeRunError, RenderGraph, RenderGraphContext, RenderLabel},
        render_resource::{
            Buffer, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, Extent3d, MapMode,
            PollType, TexelCopyBufferInfo, TexelCopyBufferLayout,
        },
        renderer::{RenderContext, RenderDevice, RenderQueue},
        texture::GpuImage,
        Extract, Render, RenderApp, RenderSystems,
    },
};

use crate::bevy::resources::{MainWorldReceiver, RenderWorldSender};

/// Wires the readback node and channel into the render app
pub struct ImageCopyPlugin;

impl Plugin for ImageCopyPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = crossbeam_channel::unbounded();

        let render_app = app
            .insert_resource(MainWorldReceiver(receiver))
            .sub_app_mut(RenderApp);

        let mut graph = render_app.world_mut().resource_mut::<RenderGraph>();
        graph.add_node(FrameReadback, FrameReadbackNode);
        graph.add_node_edge(bevy::render::graph::CameraDriverLabel, FrameReadback);

        render_app
            .insert_resource(RenderWorldSender(sender))
            .add_systems(ExtractSchedule, extract_image_copiers)
            .add_systems(Render, send_mapped_frames.after(RenderSystems::Render));
    }
}

/// Main-world component pairing a render target with its readback buffer
#[derive(Clone, Component)]
pub struct ImageCopier {
    buffer: Buffer,
    src_image: Handle<Image>,
}

impl ImageCopier {
    pub fn new(src_image: Handle<Image>, size: Extent3d, render_device: &RenderDevice) -> Self {
        let padded_bytes_per_row = RenderDevice::align_copy_bytes_per_row(size.width as usize * 4);

        let buffer = render_device.create_buffer(&BufferDescriptor {
            label: Some("fan_frame_readback"),
            size: padded_bytes_per_row as u64 * size.height as u64,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { buffer, src_image }
    }
}

#[derive(Clone, Default, Resource, Deref, DerefMut)]
struct ImageCopiers(Vec<ImageCopier>);

fn extract_image_copiers(mut commands: Commands, copiers: Extract<Query<&ImageCopier>>) {
    commands.insert_resource(ImageCopiers(copiers.iter().cloned().collect()));
}

#[derive(Debug, PartialEq, Eq, Clone, Hash, RenderLabel)]
struct FrameReadback;

#[derive(Default)]
struct FrameReadbackNode;

impl render_graph::Node for FrameReadbackNode {
    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let (Some(copiers), Some(gpu_images), Some(queue)) = (
            world.get_resource::<ImageCopiers>(),
            world.get_resource::<RenderAssets<GpuImage>>(),
            world.get_resource::<RenderQueue>(),
        ) else {
            return Ok(());
        };

        for copier in copiers.iter() {
            // Not uploaded yet on the first frames
            let Some(src) = gpu_images.get(&copier.src_image) else {
                continue;
            };
            let Some(block_size) = src.texture_format.block_copy_size(None) else {
                tracing::warn!(format = ?src.texture_format, "render target has no copyable block size");
                continue;
            };
            let (block_width, _) = src.texture_format.block_dimensions();
            let padded_bytes_per_row = RenderDevice::align_copy_bytes_per_row(
                (src.size.width / block_width) as usize * block_size as usize,
            );

            let mut encoder = render_context
                .render_device()
                .create_command_encoder(&CommandEncoderDescriptor::default());

            encoder.copy_texture_to_buffer(
                src.texture.as_image_copy(),
                TexelCopyBufferInfo {
                    buffer: &copier.buffer,
                    layout: TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(padded_bytes_per_row as u32),
                        rows_per_image: None,
                    },
                },
                src.size,
            );

            queue.submit(std::iter::once(encoder.finish()));
        }

        Ok(())
    }
}

fn send_mapped_frames(
    copiers: Res<ImageCopiers>,
    render_device: Res<RenderDevice>,
    sender: Res<RenderWorldSender>,
) {
    for copier in copiers.iter() {
        let slice = copier.buffer.slice(..);

        let (map_tx, map_rx) = crossbeam_channel::bounded(1);
        slice.map_async(MapMode::Read, move |result| {
            let _ = map_tx.send(result);
        });

        if let Err(err) = render_device.poll(PollType::wait()) {
            tracing::warn!(error = ?err, "device poll failed during frame readback");
            // Cancel the pending map so the next copy sees an unmapped buffer
            copier.buffer.unmap();
            continue;
        }

        match map_rx.recv() {
            Ok(Ok(())) => {
                let _ = sender.send(slice.get_mapped_range().to_vec());
                copier.buffer.unmap();
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "failed to map readback buffer");
                copier.buffer.unmap();
            }
            Err(_) => {
                tracing::warn!("readback map callback dropped");
                copier.buffer.unmap();
            }
        }
    }
}
