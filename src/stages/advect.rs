// src/stages/advect.rs
//! Double-buffered advection/update stage
//!
//! One dispatch per direction, run twice per frame with input/output roles
//! exchanged: forward reads generation A and fully repopulates generation B,
//! swapped does the reverse. The kernel is a pure function of its declared
//! inputs and writes every element of every output field each call.

use crate::config::SolverConfig;
use crate::fields::{FieldStore, Generation};
use crate::grid::GridLayout;
use crate::wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, UniformBuffer};

use super::{create_compute_pipeline, kernels, GridParams};

pub struct AdvectionStage {
    pipeline: wgpu::ComputePipeline,
    forward: wgpu::BindGroup,
    swapped: wgpu::BindGroup,
    params: UniformBuffer<GridParams>,
    layout: GridLayout,
}

impl AdvectionStage {
    pub fn new(device: &wgpu::Device, store: &FieldStore, config: &SolverConfig) -> Self {
        Self::with_kernel(device, store, config, kernels::ADVECT)
    }

    /// Build the stage with a caller-supplied update kernel matching the
    /// binding interface of [`kernels::ADVECT`]
    pub fn with_kernel(
        device: &wgpu::Device,
        store: &FieldStore,
        config: &SolverConfig,
        kernel_source: &str,
    ) -> Self {
        let layout = store.layout();

        let mut builder = BindGroupLayoutBuilder::new();
        for _ in 0..6 {
            builder = builder.next_binding_compute(binding_types::storage_buffer_read_only());
        }
        for _ in 0..6 {
            builder = builder.next_binding_compute(binding_types::storage_buffer_read_write());
        }
        let bind_layout = builder
            .next_binding_compute(binding_types::storage_buffer_read_only())
            .next_binding_compute(binding_types::uniform())
            .create(device, "Advection Layout");

        let pipeline =
            create_compute_pipeline(device, "Advection Pipeline", kernel_source, &bind_layout);

        let params = UniformBuffer::new_with_data(
            device,
            &GridParams {
                grid_size: layout.resolution(),
                time_step: config.time_step,
                dissipation: config.dissipation,
                _padding: 0,
            },
        );

        let bind_group = |source: Generation, label: &str| {
            let target = source.other();
            BindGroupBuilder::new(&bind_layout)
                .resource(store.velocity[0].get(source).binding_resource())
                .resource(store.velocity[1].get(source).binding_resource())
                .resource(store.velocity[2].get(source).binding_resource())
                .resource(store.density.get(source).binding_resource())
                .resource(store.pressure.get(source).binding_resource())
                .resource(store.source.get(source).binding_resource())
                .resource(store.velocity[0].get(target).binding_resource())
                .resource(store.velocity[1].get(target).binding_resource())
                .resource(store.velocity[2].get(target).binding_resource())
                .resource(store.density.get(target).binding_resource())
                .resource(store.pressure.get(target).binding_resource())
                .resource(store.source.get(target).binding_resource())
                .resource(store.boundary.binding_resource())
                .resource(params.binding_resource())
                .create(device, label)
        };

        let forward = bind_group(Generation::A, "Advection Forward");
        let swapped = bind_group(Generation::B, "Advection Swapped");

        Self {
            pipeline,
            forward,
            swapped,
            params,
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
        pass.dispatch_workgroups(GridLayout::workgroups_for(self.layout.face_count()), 1, 1);
    }

    /// Generation A -> generation B
    pub fn encode_forward(&self, encoder: &mut wgpu::CommandEncoder) {
        self.encode(encoder, &self.forward, "Advection Pass (forward)");
    }

    /// Generation B -> generation A
    pub fn encode_swapped(&self, encoder: &mut wgpu::CommandEncoder) {
        self.encode(encoder, &self.swapped, "Advection Pass (swapped)");
    }

    /// Retune the time step and dissipation between frames
    pub fn set_time_step(&mut self, queue: &wgpu::Queue, time_step: f32, dissipation: f32) {
        self.params.update_content(
            queue,
            GridParams {
                grid_size: self.layout.resolution(),
                time_step,
                dissipation,
                _padding: 0,
            },
        );
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }
}
