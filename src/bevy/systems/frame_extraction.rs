//! Frame extraction system
//!
//! Drains readback buffers from the render world, strips GPU row padding
//! and publishes the newest frame to the page.

use bevy::{prelude::*, render::renderer::RenderDevice, time::Time};
use std::time::Instant;

use crate::bevy::resources::{
    FrameBufferRes, FrameCount, FramePacer, FrameTimings, MainWorldReceiver, PreRollFrames,
    RenderStatsRes,
};
use crate::config::{performance::*, RENDER_HEIGHT, RENDER_WIDTH};

/// Publish the newest rendered frame, paced to the target output rate
pub fn extract_and_process_frame(
    receiver: Res<MainWorldReceiver>,
    buffer: Option<Res<FrameBufferRes>>,
    stats: Option<Res<RenderStatsRes>>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut timings: ResMut<FrameTimings>,
    mut pacer: ResMut<FramePacer>,
    time: Res<Time>,
) {
    let Some(buffer) = buffer else { return };

    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 == 0 {
            tracing::info!("pre-roll finished, publishing frames");
        }
        return;
    }

    if !pacer.ready(Instant::now()) {
        while receiver.try_recv().is_ok() {}
        return;
    }

    let frame_start = Instant::now();
    let Some(padded) = receiver.try_iter().last() else {
        return;
    };
    let receive_ms = frame_start.elapsed().as_secs_f64() * 1000.0;

    let process_start = Instant::now();
    let Some(rgba) = remove_row_padding(&padded, RENDER_WIDTH, RENDER_HEIGHT) else {
        tracing::warn!(bytes = padded.len(), "readback buffer smaller than one frame");
        return;
    };
    let process_ms = process_start.elapsed().as_secs_f64() * 1000.0;
    let size_kb = rgba.len() as f64 / 1024.0;

    if let Err(err) = buffer.0.publish(rgba) {
        tracing::warn!(error = %err, "dropping frame");
        return;
    }
    count.0 += 1;

    let total_ms = frame_start.elapsed().as_secs_f64() * 1000.0;
    timings.record(total_ms, FRAME_TIMING_SAMPLES);
    let avg_ms = timings.average().unwrap_or(total_ms);

    if let Some(stats) = &stats {
        let frame_count = count.0;
        let result = stats.0.update(|s| {
            s.gpu_transfer_ms = receive_ms;
            s.data_processing_ms = process_ms;
            s.frame_count = frame_count;
            s.data_size_kb = size_kb;
            s.bevy_fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
        });
        if let Err(err) = result {
            tracing::warn!(error = %err, "render stats not updated");
        }
    }

    let now = time.elapsed_secs_f64();
    if now - timings.last_log_time >= STATS_PRINT_INTERVAL {
        let max_ms = timings.samples.iter().copied().fold(0.0f64, f64::max);
        tracing::debug!(
            frame = count.0,
            receive_ms,
            process_ms,
            avg_ms,
            max_ms,
            size_kb,
            "frame pipeline"
        );
        timings.last_log_time = now;
    }
}

/// Remove GPU buffer row padding alignment, returning tightly packed RGBA
pub fn remove_row_padding(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let row_bytes = width as usize * 4;
    let aligned_row_bytes = RenderDevice::align_copy_bytes_per_row(row_bytes);
    let height = height as usize;

    // The final row may come without trailing padding
    if height == 0 || data.len() < aligned_row_bytes * (height - 1) + row_bytes {
        return None;
    }

    if row_bytes == aligned_row_bytes {
        return Some(data[..row_bytes * height].to_vec());
    }

    Some(
        data.chunks(aligned_row_bytes)
            .take(height)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect(),
    )
}
