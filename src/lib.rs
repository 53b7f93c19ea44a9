// src/lib.rs
//! Eddy
//!
//! A GPU-resident Eulerian grid fluid solver built on wgpu. All simulation
//! state lives in device storage buffers; a frame is a fixed sequence of
//! compute dispatches (red/black pressure relaxation, double-buffered
//! advection, projection into a 3D texture) driven by a deterministic,
//! branch-free schedule.

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod fields;
pub mod grid;
pub mod seed;
pub mod solver;
pub mod stages;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use config::SolverConfig;
pub use context::GpuContext;
pub use error::{Result, SolverError};
pub use solver::FluidSolver;

/// Acquires a headless GPU context, blocking on adapter and device requests
pub fn headless() -> anyhow::Result<GpuContext> {
    GpuContext::headless()
}
