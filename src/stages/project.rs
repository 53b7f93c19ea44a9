// src/stages/project.rs
//! Texture projection stage
//!
//! Copies one generation's density and velocity into the shared 3D texture
//! for external sampling. Both the forward and swapped dispatches run every
//! frame; only the one matching the current generation is meaningful, and
//! the redundant write is tolerated in exchange for a branch-free schedule.

use crate::fields::{FieldStore, Generation, VolumeTexture};
use crate::grid::GridLayout;
use crate::wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, UniformBuffer};

use super::{create_compute_pipeline, kernels, GridParams};

pub struct TextureProjectionStage {
    pipeline: wgpu::ComputePipeline,
    forward: wgpu::BindGroup,
    swapped: wgpu::BindGroup,
    _params: UniformBuffer<GridParams>,
    layout: GridLayout,
}

impl TextureProjectionStage {
    pub fn new(device: &wgpu::Device, store: &FieldStore) -> Self {
        Self::with_kernel(device, store, kernels::PROJECT)
    }

    pub fn with_kernel(device: &wgpu::Device, store: &FieldStore, kernel_source: &str) -> Self {
        let layout = store.layout();

        let bind_layout = BindGroupLayoutBuilder::new()
            .next_binding_compute(binding_types::storage_buffer_read_only())
            .next_binding_compute(binding_types::storage_buffer_read_only())
            .next_binding_compute(binding_types::storage_buffer_read_only())
            .next_binding_compute(binding_types::storage_buffer_read_only())
            .next_binding_compute(binding_types::storage_buffer_read_only())
            .next_binding_compute(binding_types::image_3d(
                VolumeTexture::FORMAT,
                wgpu::StorageTextureAccess::WriteOnly,
            ))
            .next_binding_compute(binding_types::uniform())
            .create(device, "Texture Projection Layout");

        let pipeline = create_compute_pipeline(
            device,
            "Texture Projection Pipeline",
            kernel_source,
            &bind_layout,
        );

        let params = UniformBuffer::new_with_data(
            device,
            &GridParams {
                grid_size: layout.resolution(),
                time_step: 0.0,
                dissipation: 0.0,
                _padding: 0,
            },
        );

        let bind_group = |generation: Generation, label: &str| {
            BindGroupBuilder::new(&bind_layout)
                .resource(store.velocity[0].get(generation).binding_resource())
                .resource(store.velocity[1].get(generation).binding_resource())
                .resource(store.velocity[2].get(generation).binding_resource())
                .resource(store.density.get(generation).binding_resource())
                .resource(store.boundary.binding_resource())
                .resource(wgpu::BindingResource::TextureView(&store.output.view))
                .resource(params.binding_resource())
                .create(device, label)
        };

        let forward = bind_group(Generation::A, "Texture Projection Forward");
        let swapped = bind_group(Generation::B, "Texture Projection Swapped");

        Self {
            pipeline,
            forward,
            swapped,
            _params: params,
            layout,
        }
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, label: &str) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(GridLayout::workgroups_for(self.layout.cell_count()), 1, 1);
    }

    /// Project generation A
    pub fn encode_forward(&self, encoder: &mut wgpu::CommandEncoder) {
        self.encode(encoder, &self.forward, "Texture Projection (forward)");
    }

    /// Project generation B
    pub fn encode_swapped(&self, encoder: &mut wgpu::CommandEncoder) {
        self.encode(encoder, &self.swapped, "Texture Projection (swapped)");
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }
}
