//! Solver configuration
//!
//! All tunables for the default smoke scene. The grid resolution is fixed at
//! initialization; every field size in the solver derives from it.

use cgmath::Vector3;

/// Top-level solver parameters
#[derive(Clone, Copy, Debug)]
pub struct SolverConfig {
    /// Grid resolution R; fields are R^3 cells, (R+1)*R*R faces per velocity
    /// component and (R+2)^3 boundary voxels
    pub resolution: u32,
    /// Pressure relaxation passes per frame, alternating red/black by parity.
    /// There is no convergence check; more passes buy a closer-to-divergence-
    /// free field, fewer buy speed.
    pub relax_iterations: u32,
    /// Time step handed to the advection kernel, in grid units
    pub time_step: f32,
    /// Per-step density retention factor
    pub dissipation: f32,
    /// Rest velocity the whole field is filled with before the inflow block
    /// is stamped
    pub rest_velocity: Vector3<f32>,
    /// Inflow block configuration
    pub inflow: InflowConfig,
    /// Smoke emitter lattice configuration
    pub emitters: EmitterConfig,
}

/// A block of constant X-velocity stamped into the low-X quarter of the grid
#[derive(Clone, Copy, Debug)]
pub struct InflowConfig {
    /// X-velocity inside the block
    pub speed: f32,
    /// Margin (in cells) kept between the block and the Y/Z domain faces
    pub margin: u32,
    /// The block spans x in [0, resolution / extent_divisor)
    pub extent_divisor: u32,
}

/// A regular 3D lattice of smoke emitters seeded into density and source
#[derive(Clone, Copy, Debug)]
pub struct EmitterConfig {
    /// Lattice subdivisions per axis; emitters sit at interior lattice points
    pub lattice: u32,
    /// Initial density at each emitter cell
    pub density: f32,
    /// Source strength at each emitter cell (fed back every frame)
    pub strength: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            resolution: 129,
            relax_iterations: 50,
            time_step: 0.05,
            dissipation: 0.999,
            rest_velocity: Vector3::new(0.0, 0.0, 0.0),
            inflow: InflowConfig::default(),
            emitters: EmitterConfig::default(),
        }
    }
}

impl Default for InflowConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            margin: 40,
            extent_divisor: 4,
        }
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            lattice: 10,
            density: 10.0,
            strength: 1.0,
        }
    }
}

impl SolverConfig {
    /// Convenience constructor for a given resolution with default tunables
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.resolution, 129);
        assert_eq!(config.relax_iterations, 50);
        assert_eq!(config.emitters.lattice, 10);
    }

    #[test]
    fn test_with_resolution() {
        let config = SolverConfig::with_resolution(64);
        assert_eq!(config.resolution, 64);
        assert_eq!(config.inflow.speed, 20.0);
    }
}
