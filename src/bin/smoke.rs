// src/bin/smoke.rs
//! Headless smoke-plume run
//!
//! Seeds the default scene (optionally with a terrain-derived boundary),
//! steps the solver for a fixed number of frames and prints density
//! statistics along the way.
//!
//! Usage: smoke [resolution] [frames] [terrain.txt]

use anyhow::Result;

use eddy::seed::terrain;
use eddy::{FluidSolver, GpuContext, SolverConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let resolution: u32 = match args.next() {
        Some(arg) => arg.parse()?,
        None => 96,
    };
    let frames: u32 = match args.next() {
        Some(arg) => arg.parse()?,
        None => 120,
    };
    let terrain_path = args.next();

    let config = SolverConfig::with_resolution(resolution);
    let ctx = GpuContext::headless()?;
    let mut solver = FluidSolver::new(&ctx, config)?;

    if let Some(path) = terrain_path {
        let boundary = terrain::load_terrain_or_flat(&path, resolution);
        solver.reseed_boundary(&ctx.queue, &boundary);
        log::info!("boundary reseeded from {path}");
    }

    println!(
        "running {frames} frames at {resolution}^3, {} relaxation passes per frame",
        config.relax_iterations
    );

    for frame in 0..frames {
        solver.step(&ctx);

        if frame % 30 == 0 || frame + 1 == frames {
            let density = solver.read_density(&ctx);
            let max = density.iter().cloned().fold(0.0f32, f32::max);
            let total: f32 = density.iter().sum();
            println!(
                "frame {:>4}: density max {:.3}, total {:.1}",
                solver.frame_index(),
                max,
                total
            );
        }
    }

    Ok(())
}
