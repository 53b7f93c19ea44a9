// src/solver.rs
//! Solver assembly
//!
//! Wires the field store, the three compute stages and the frame driver
//! together, seeds the initial state, and exposes stepping plus host-side
//! read-back of the current generation's fields.

use crate::config::SolverConfig;
use crate::context::GpuContext;
use crate::driver::FrameDriver;
use crate::error::Result;
use crate::fields::{FieldStore, VolumeTexture};
use crate::grid::GridLayout;
use crate::seed::{self, SeededState};
use crate::stages::{AdvectionStage, RelaxationStage, TextureProjectionStage};

pub struct FluidSolver {
    config: SolverConfig,
    store: FieldStore,
    driver: FrameDriver,
}

impl FluidSolver {
    /// Build a solver seeded with the default smoke scene
    pub fn new(ctx: &GpuContext, config: SolverConfig) -> Result<Self> {
        let state = seed::default_state(&config);
        Self::with_state(ctx, config, &state)
    }

    /// Build a solver seeded with caller-provided field content
    pub fn with_state(ctx: &GpuContext, config: SolverConfig, state: &SeededState) -> Result<Self> {
        let layout = GridLayout::new(config.resolution);
        let store = FieldStore::allocate(&ctx.device, layout)?;

        let relax = RelaxationStage::new(&ctx.device, &store, config.relax_iterations);
        let advect = AdvectionStage::new(&ctx.device, &store, &config);
        let project = TextureProjectionStage::new(&ctx.device, &store);
        let driver = FrameDriver::new(layout, relax, advect, project)?;

        let solver = Self {
            config,
            store,
            driver,
        };
        solver.seed(&ctx.queue, state);
        Ok(solver)
    }

    /// Upload a full field state into the current generation. Runs only
    /// while no frame is in flight; the seeded content is what the next
    /// frame's forward dispatches read.
    pub fn seed(&self, queue: &wgpu::Queue, state: &SeededState) {
        let generation = self.driver.current_generation();
        for (axis, component) in state.velocity.iter().enumerate() {
            self.store.velocity[axis].get(generation).upload(queue, component);
        }
        self.store.density.get(generation).upload(queue, &state.density);
        self.store.pressure.get(generation).upload(queue, &state.pressure);
        self.store.source.get(generation).upload(queue, &state.source);
        self.store.boundary.upload(queue, &state.boundary);
        log::info!(
            "seeded solver state at resolution {}",
            self.config.resolution
        );
    }

    /// Repaint the boundary mask (terrain reload path). The mask is shared
    /// by every stage, so this must only run between frames; taking `&mut
    /// self` makes that the only possibility.
    pub fn reseed_boundary(&mut self, queue: &wgpu::Queue, boundary: &[f32]) {
        self.store.boundary.upload(queue, boundary);
    }

    /// Run one frame
    pub fn step(&mut self, ctx: &GpuContext) {
        self.driver.step(&ctx.device, &ctx.queue);
    }

    /// Run `frames` frames back to back
    pub fn step_n(&mut self, ctx: &GpuContext, frames: u32) {
        for _ in 0..frames {
            self.step(ctx);
        }
    }

    /// Read the current generation's density field back to the host
    pub fn read_density(&self, ctx: &GpuContext) -> Vec<f32> {
        self.store
            .density
            .get(self.driver.current_generation())
            .read_back(&ctx.device, &ctx.queue)
    }

    /// Read the current generation's pressure field back to the host
    pub fn read_pressure(&self, ctx: &GpuContext) -> Vec<f32> {
        self.store
            .pressure
            .get(self.driver.current_generation())
            .read_back(&ctx.device, &ctx.queue)
    }

    /// Read one velocity component of the current generation back to the host
    pub fn read_velocity(&self, ctx: &GpuContext, axis: usize) -> Vec<f32> {
        self.store.velocity[axis]
            .get(self.driver.current_generation())
            .read_back(&ctx.device, &ctx.queue)
    }

    /// The texture the projection stage writes; sample it with its bundled
    /// nearest sampler
    pub fn output_texture(&self) -> &VolumeTexture {
        &self.store.output
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn layout(&self) -> GridLayout {
        self.store.layout()
    }

    pub fn frame_index(&self) -> u64 {
        self.driver.frame_index()
    }

    pub fn driver_mut(&mut self) -> &mut FrameDriver {
        &mut self.driver
    }
}
