// src/fields/mod.rs
//! GPU-resident field storage
//!
//! Single source of truth for field shapes and generation pairing. Every
//! mutable field exists in two same-shaped generations (A and B); the
//! boundary mask has no pair and the output texture is shared by both
//! projection dispatches. Fields are allocated once, seeded once from
//! host-computed buffers, then mutated in place by the per-frame stages.

use crate::error::{Result, SolverError};
use crate::grid::GridLayout;

/// One of the two copies of a double-buffered field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    A,
    B,
}

impl Generation {
    pub fn other(self) -> Self {
        match self {
            Generation::A => Generation::B,
            Generation::B => Generation::A,
        }
    }
}

/// A grid-sized f32 storage buffer on the device
pub struct FieldBuffer {
    buffer: wgpu::Buffer,
    len: usize,
    label: String,
}

impl FieldBuffer {
    /// Allocate a zero-initialized storage buffer of `len` f32 elements.
    ///
    /// Creation runs inside an out-of-memory error scope so that device
    /// storage exhaustion surfaces as `SolverError::Allocation` instead of a
    /// deferred device error.
    pub fn allocate(device: &wgpu::Device, label: &str, len: usize) -> Result<Self> {
        let bytes = (len * std::mem::size_of::<f32>()) as u64;

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        if let Some(source) = pollster::block_on(device.pop_error_scope()) {
            return Err(SolverError::Allocation {
                field: label.to_string(),
                bytes,
                source,
            });
        }

        Ok(Self {
            buffer,
            len,
            label: label.to_string(),
        })
    }

    /// Upload a full host-side field; the generators guarantee coverage, so a
    /// length mismatch is a seeding bug
    pub fn upload(&self, queue: &wgpu::Queue, data: &[f32]) {
        assert_eq!(
            data.len(),
            self.len,
            "seed data length mismatch for field `{}`",
            self.label
        );
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
    }

    /// Copy the field back to the host through a staging buffer
    pub fn read_back(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Vec<f32> {
        let bytes = (self.len * std::mem::size_of::<f32>()) as u64;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} staging", self.label)),
            size: bytes,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Field Read-back Encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, bytes);
        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::MaintainBase::Wait);

        pollster::block_on(rx)
            .expect("read-back mapping callback dropped")
            .expect("failed to map field staging buffer");

        let data = slice.get_mapped_range();
        let contents: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        contents
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Generation pair of a double-buffered field
pub struct FieldPair {
    a: FieldBuffer,
    b: FieldBuffer,
}

impl FieldPair {
    pub fn allocate(device: &wgpu::Device, label: &str, len: usize) -> Result<Self> {
        Ok(Self {
            a: FieldBuffer::allocate(device, &format!("{label}.a"), len)?,
            b: FieldBuffer::allocate(device, &format!("{label}.b"), len)?,
        })
    }

    pub fn get(&self, generation: Generation) -> &FieldBuffer {
        match generation {
            Generation::A => &self.a,
            Generation::B => &self.b,
        }
    }
}

/// 3D storage texture the projection stage writes and a renderer samples
pub struct VolumeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl VolumeTexture {
    /// Texel format: cell-centered velocity in rgb, density in alpha
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

    pub fn new(device: &wgpu::Device, resolution: u32, label: &str) -> Result<Self> {
        let size = wgpu::Extent3d {
            width: resolution,
            height: resolution,
            depth_or_array_layers: resolution,
        };

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[Self::FORMAT],
        });
        if let Some(source) = pollster::block_on(device.pop_error_scope()) {
            let bytes = (resolution as u64).pow(3) * 16;
            return Err(SolverError::Allocation {
                field: label.to_string(),
                bytes,
                source,
            });
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Rgba32Float is not filterable without an extra device feature
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

/// All solver fields, allocated once at initialization
pub struct FieldStore {
    layout: GridLayout,
    /// Face-sampled velocity components, one pair per axis
    pub velocity: [FieldPair; 3],
    pub density: FieldPair,
    pub pressure: FieldPair,
    pub source: FieldPair,
    /// Static obstacle mask with a one-cell halo; no generation pair
    pub boundary: FieldBuffer,
    /// Shared projection target
    pub output: VolumeTexture,
}

impl FieldStore {
    pub fn allocate(device: &wgpu::Device, layout: GridLayout) -> Result<Self> {
        let cells = layout.cell_count();
        let faces = layout.face_count();

        let store = Self {
            layout,
            velocity: [
                FieldPair::allocate(device, "velocity.x", faces)?,
                FieldPair::allocate(device, "velocity.y", faces)?,
                FieldPair::allocate(device, "velocity.z", faces)?,
            ],
            density: FieldPair::allocate(device, "density", cells)?,
            pressure: FieldPair::allocate(device, "pressure", cells)?,
            source: FieldPair::allocate(device, "source", cells)?,
            boundary: FieldBuffer::allocate(device, "boundary", layout.halo_count())?,
            output: VolumeTexture::new(device, layout.resolution(), "density texture")?,
        };

        log::info!(
            "allocated field store at resolution {} ({} cells, {} faces per component)",
            layout.resolution(),
            cells,
            faces
        );
        Ok(store)
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GpuContext;
    use crate::seed;

    /// GPU tests skip on machines without an adapter
    fn test_context() -> Option<GpuContext> {
        GpuContext::headless().ok()
    }

    #[test]
    fn test_generation_other_flips() {
        assert_eq!(Generation::A.other(), Generation::B);
        assert_eq!(Generation::B.other(), Generation::A);
    }

    #[test]
    fn test_upload_read_back_round_trip() {
        // A generator's output survives the device round trip bit-exactly
        let Some(ctx) = test_context() else { return };
        let layout = GridLayout::new(6);
        let store = FieldStore::allocate(&ctx.device, layout).unwrap();

        let boundary = seed::domain_boundary(6);
        store.boundary.upload(&ctx.queue, &boundary);
        assert_eq!(store.boundary.read_back(&ctx.device, &ctx.queue), boundary);

        let density = seed::uniform_scalar(6, 2.0);
        store.density.get(Generation::A).upload(&ctx.queue, &density);
        assert_eq!(
            store.density.get(Generation::A).read_back(&ctx.device, &ctx.queue),
            density
        );
    }

    #[test]
    fn test_generations_are_independent() {
        let Some(ctx) = test_context() else { return };
        let layout = GridLayout::new(4);
        let pair = FieldPair::allocate(&ctx.device, "scratch", layout.cell_count()).unwrap();

        let ones = seed::uniform_scalar(4, 1.0);
        let twos = seed::uniform_scalar(4, 2.0);
        pair.get(Generation::A).upload(&ctx.queue, &ones);
        pair.get(Generation::B).upload(&ctx.queue, &twos);

        assert_eq!(pair.get(Generation::A).read_back(&ctx.device, &ctx.queue), ones);
        assert_eq!(pair.get(Generation::B).read_back(&ctx.device, &ctx.queue), twos);
    }
}
