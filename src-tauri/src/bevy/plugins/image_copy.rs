//! GPU to CPU image copy
//!
//! Flow:
//! 1. The camera renders into a GPU image render target
//! 2. `ImageCopyDriver` (a render graph node after the camera driver) copies
//!    that image into a mappable buffer
//! 3. After `RenderSystems::Render` the buffer is mapped and its contents are
//!    sent to the main world as a [`FramePacket`]
//!
//! A viewport resize replaces the [`ImageCopier`] entity; copiers whose GPU
//! image is not prepared yet are skipped for that frame.

use bevy::{
    prelude::*,
    render::{
        render_asset::RenderAssets,
        render_graph::{self, NodeRunError, RenderGraph, RenderGraphContext, RenderLabel},
        render_resource::{
            Buffer, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, MapMode, PollType,
            TexelCopyBufferInfo, TexelCopyBufferLayout,
        },
        renderer::{RenderContext, RenderDevice, RenderQueue},
        texture::GpuImage,
        Extract, Render, RenderApp, RenderSystems,
    },
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::bevy::resources::{FramePacket, MainWorldReceiver, RenderWorldSender};

/// Bytes per pixel of the RGBA8 render target
const BYTES_PER_PIXEL: usize = 4;

pub struct ImageCopyPlugin;

impl Plugin for ImageCopyPlugin {
    fn build(&self, app: &mut App) {
        let (s, r) = crossbeam_channel::unbounded();

        let render_app = app
            .insert_resource(MainWorldReceiver(r))
            .sub_app_mut(RenderApp);

        let mut graph = render_app.world_mut().resource_mut::<RenderGraph>();
        graph.add_node(ImageCopy, ImageCopyDriver);
        graph.add_node_edge(bevy::render::graph::CameraDriverLabel, ImageCopy);

        render_app
            .insert_resource(RenderWorldSender(s))
            .add_systems(ExtractSchedule, image_copy_extract)
            .add_systems(
                Render,
                receive_image_from_buffer.after(RenderSystems::Render),
            );
    }
}

#[derive(Clone, Default, Resource, Deref, DerefMut)]
struct ImageCopiers(pub Vec<ImageCopier>);

/// Copies one render target image into a CPU readable buffer every frame
#[derive(Clone, Component)]
pub struct ImageCopier {
    buffer: Buffer,
    enabled: Arc<AtomicBool>,
    src_image: Handle<Image>,
    width: u32,
    height: u32,
    padded_bytes_per_row: usize,
}

impl ImageCopier {
    pub fn new(
        src_image: Handle<Image>,
        width: u32,
        height: u32,
        render_device: &RenderDevice,
    ) -> ImageCopier {
        let padded_bytes_per_row = padded_bytes_per_row(width);

        let cpu_buffer = render_device.create_buffer(&BufferDescriptor {
            label: Some("frame_readback_buffer"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        ImageCopier {
            buffer: cpu_buffer,
            src_image,
            enabled: Arc::new(AtomicBool::new(true)),
            width,
            height,
            padded_bytes_per_row,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Stop copying into this buffer; a resize brings a fresh copier
    fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }
}

/// State of a readback buffer after waiting for its map request
#[derive(Debug, PartialEq, Eq)]
enum MapOutcome {
    Mapped,
    /// The map was rejected; the buffer is free to use again
    Failed,
    /// The map may still be pending, so the buffer must not be touched
    Stuck,
}

fn map_outcome<E>(callback: Option<Result<(), E>>) -> MapOutcome {
    match callback {
        Some(Ok(())) => MapOutcome::Mapped,
        Some(Err(_)) => MapOutcome::Failed,
        None => MapOutcome::Stuck,
    }
}

/// Row length of a `width` pixel wide RGBA8 image in a GPU copy buffer
pub fn padded_bytes_per_row(width: u32) -> usize {
    RenderDevice::align_copy_bytes_per_row(width as usize * BYTES_PER_PIXEL)
}

fn image_copy_extract(mut commands: Commands, image_copiers: Extract<Query<&ImageCopier>>) {
    commands.insert_resource(ImageCopiers(
        image_copiers.iter().cloned().collect::<Vec<ImageCopier>>(),
    ));
}

#[derive(Debug, PartialEq, Eq, Clone, Hash, RenderLabel)]
struct ImageCopy;

#[derive(Default)]
struct ImageCopyDriver;

impl render_graph::Node for ImageCopyDriver {
    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let (Some(image_copiers), Some(gpu_images), Some(render_queue)) = (
            world.get_resource::<ImageCopiers>(),
            world.get_resource::<RenderAssets<GpuImage>>(),
            world.get_resource::<RenderQueue>(),
        ) else {
            return Ok(());
        };

        for image_copier in image_copiers.iter() {
            if !image_copier.enabled() {
                continue;
            }

            // Not prepared yet, or still the previous size right after a resize
            let Some(src_image) = gpu_images.get(&image_copier.src_image) else {
                continue;
            };
            if src_image.size.width != image_copier.width
                || src_image.size.height != image_copier.height
            {
                continue;
            }

            let mut encoder = render_context
                .render_device()
                .create_command_encoder(&CommandEncoderDescriptor::default());

            encoder.copy_texture_to_buffer(
                src_image.texture.as_image_copy(),
                TexelCopyBufferInfo {
                    buffer: &image_copier.buffer,
                    layout: TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(image_copier.padded_bytes_per_row as u32),
                        rows_per_image: None,
                    },
                },
                src_image.size,
            );

            render_queue.submit(std::iter::once(encoder.finish()));
        }

        Ok(())
    }
}

fn receive_image_from_buffer(
    image_copiers: Res<ImageCopiers>,
    render_device: Res<RenderDevice>,
    sender: Res<RenderWorldSender>,
) {
    for image_copier in image_copiers.0.iter() {
        if !image_copier.enabled() {
            continue;
        }

        let buffer_slice = image_copier.buffer.slice(..);

        let (s, r) = crossbeam_channel::bounded(1);

        buffer_slice.map_async(MapMode::Read, move |result| {
            let _ = s.send(result);
        });

        let callback = match render_device.poll(PollType::wait()) {
            Ok(_) => r.recv().ok(),
            Err(err) => {
                warn!("[Bevy] Failed to poll device for frame readback: {err}");
                r.try_recv().ok()
            }
        };

        match map_outcome(callback) {
            MapOutcome::Mapped => {}
            MapOutcome::Failed => {
                warn!("[Bevy] Failed to map frame buffer");
                continue;
            }
            MapOutcome::Stuck => {
                warn!(
                    "[Bevy] Frame buffer map never completed, readback paused until the next resize"
                );
                image_copier.disable();
                continue;
            }
        }

        let packet = FramePacket {
            width: image_copier.width,
            height: image_copier.height,
            padded_bytes_per_row: image_copier.padded_bytes_per_row,
            data: buffer_slice.get_mapped_range().to_vec(),
        };
        // The main world may already be gone during shutdown
        let _ = sender.send(packet);

        image_copier.buffer.unmap();
    }
}
