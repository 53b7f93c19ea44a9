// src/context.rs
//! Headless GPU context
//!
//! Minimal adapter/device acquisition for compute-only use. Rendering,
//! windowing and presentation are somebody else's problem; the solver only
//! needs a device, a queue, and enough storage-buffer bindings for the
//! advection stage's field set.

use anyhow::Context as _;

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    pub async fn new() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter found")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        // The advection stage binds 13 storage buffers; the WebGPU default
        // limit is 8
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Solver Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_storage_buffers_per_shader_stage: 16,
                    ..wgpu::Limits::default()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to request a device")?;

        Ok(Self { device, queue })
    }

    /// Blocking constructor for non-async callers
    pub fn headless() -> anyhow::Result<Self> {
        pollster::block_on(Self::new())
    }
}
