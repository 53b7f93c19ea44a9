// src/stages/mod.rs
//! Per-frame compute stages
//!
//! Each stage owns its pipeline and statically built bind groups. Binding is
//! fixed for the run; the generation swap is realized by two bind groups with
//! the field roles exchanged, never by re-binding at frame time.

pub mod advect;
pub mod kernels;
pub mod project;
pub mod relax;

pub use advect::AdvectionStage;
pub use project::TextureProjectionStage;
pub use relax::RelaxationStage;

use crate::wgpu_utils::BindGroupLayoutWithDesc;

/// Per-dispatch grid parameters shared by the advection and projection
/// kernels
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridParams {
    pub grid_size: u32,
    pub time_step: f32,
    pub dissipation: f32,
    pub _padding: u32,
}

/// Relaxation parameters; `phase` selects the checkerboard color (red = 0,
/// black = 1)
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RelaxParams {
    pub grid_size: u32,
    pub phase: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

/// Compile a WGSL kernel into a compute pipeline against an explicit layout
pub(crate) fn create_compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader_source: &str,
    bind_group_layout: &BindGroupLayoutWithDesc,
) -> wgpu::ComputePipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[&bind_group_layout.layout],
        push_constant_ranges: &[],
    });

    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module: &shader,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    })
}
