//! Solver error taxonomy
//!
//! Everything that can fail does so at initialization or seeding time; once
//! the frame loop is running no stage is expected to fail, and any underlying
//! device error is fatal.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Debug, Error)]
pub enum SolverError {
    /// Device storage exhaustion while creating a field. Fatal; surfaced to
    /// the caller and aborts solver initialization.
    #[error("failed to allocate field `{field}` ({bytes} bytes): {source}")]
    Allocation {
        field: String,
        bytes: u64,
        source: wgpu::Error,
    },

    /// Heightfield file missing or unreadable. Recoverable at the terrain
    /// seam: `load_terrain_or_flat` logs and falls back to a flat boundary.
    #[error("heightfield i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Heightfield contents are malformed (ragged rows, non-numeric tokens).
    #[error("malformed heightfield at line {line}: {reason}")]
    Heightfield { line: usize, reason: String },

    /// A stage was wired against a different grid than the field store.
    /// Programming error; not expected once initialization order is respected.
    #[error("scheduling: {0}")]
    Scheduling(String),
}
