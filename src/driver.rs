// src/driver.rs
//! Frame driver
//!
//! Owns the deterministic, non-branching per-frame schedule:
//!
//! relaxation x K (alternating phase) -> advection forward -> advection
//! swapped -> texture projection forward -> texture projection swapped
//!
//! Everything is encoded into one command encoder and submitted as a single
//! queue submission; wgpu's ordering guarantee between dispatches supplies
//! the happens-before barrier each stage needs on its predecessor's writes.
//!
//! "Which generation is current" is an explicit two-element ring advanced
//! once per advection dispatch. Because a frame always issues both
//! directions, the ring is back at generation A at every frame boundary.

use crate::error::{Result, SolverError};
use crate::fields::Generation;
use crate::grid::GridLayout;
use crate::stages::{AdvectionStage, RelaxationStage, TextureProjectionStage};

/// Two-element ring over the field generations
#[derive(Clone, Copy, Debug)]
pub struct GenerationRing {
    current: Generation,
}

impl GenerationRing {
    pub fn new() -> Self {
        Self {
            current: Generation::A,
        }
    }

    /// The generation holding the most recently completed update
    pub fn current(&self) -> Generation {
        self.current
    }

    /// Advance past one advection dispatch
    pub fn advance(&mut self) {
        self.current = self.current.other();
    }
}

impl Default for GenerationRing {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FrameDriver {
    relax: RelaxationStage,
    advect: AdvectionStage,
    project: TextureProjectionStage,
    ring: GenerationRing,
    frame_index: u64,
    layout: GridLayout,
}

impl FrameDriver {
    /// Wire the three stages into a driver. Every stage must have been built
    /// against the same grid as the field store; a mismatch means a stage
    /// would dispatch over fields that do not exist at its sizes.
    pub fn new(
        layout: GridLayout,
        relax: RelaxationStage,
        advect: AdvectionStage,
        project: TextureProjectionStage,
    ) -> Result<Self> {
        for (name, stage_layout) in [
            ("relaxation", relax.layout()),
            ("advection", advect.layout()),
            ("texture projection", project.layout()),
        ] {
            if stage_layout != layout {
                return Err(SolverError::Scheduling(format!(
                    "{name} stage was built for resolution {} but the field store has {}",
                    stage_layout.resolution(),
                    layout.resolution()
                )));
            }
        }

        Ok(Self {
            relax,
            advect,
            project,
            ring: GenerationRing::new(),
            frame_index: 0,
            layout,
        })
    }

    /// Encode one full frame into `encoder`
    pub fn encode_frame(&mut self, encoder: &mut wgpu::CommandEncoder) {
        self.relax.encode(encoder);

        self.advect.encode_forward(encoder);
        self.ring.advance();
        self.advect.encode_swapped(encoder);
        self.ring.advance();

        self.project.encode_forward(encoder);
        self.project.encode_swapped(encoder);

        self.frame_index += 1;
    }

    /// Encode and submit one frame
    pub fn step(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        self.encode_frame(&mut encoder);
        queue.submit(std::iter::once(encoder.finish()));
    }

    pub fn current_generation(&self) -> Generation {
        self.ring.current()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn advect_mut(&mut self) -> &mut AdvectionStage {
        &mut self.advect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_round_trips_each_frame() {
        let mut ring = GenerationRing::new();
        assert_eq!(ring.current(), Generation::A);
        // Forward advection
        ring.advance();
        assert_eq!(ring.current(), Generation::B);
        // Swapped advection closes the cycle
        ring.advance();
        assert_eq!(ring.current(), Generation::A);
    }
}
