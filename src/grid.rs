// src/grid.rs
//! Grid layout and indexing
//!
//! `GridLayout` is the single authority for field shapes and linearization.
//! Three grids derive from one resolution R:
//!
//! - cell grid: R^3 scalar samples at cell centers (density, pressure, source)
//! - face grid: (R+1)*R*R samples per velocity component; all three
//!   components share the X-inflated shape and stride
//! - halo grid: (R+2)^3 boundary voxels, one padding cell around the domain
//!
//! Linearization is row-major with X fastest-varying, then Y, then Z, for
//! every grid. Compute kernels mirror these formulas; nothing else in the
//! crate computes an index by hand.

/// Linear workgroup width used by every compute dispatch
pub const WORKGROUP_SIZE: u32 = 32;

/// Shapes and index math for a cubic grid of resolution R
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    resolution: u32,
}

impl GridLayout {
    pub fn new(resolution: u32) -> Self {
        debug_assert!(resolution >= 2, "grid resolution must be at least 2");
        Self { resolution }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Number of scalar cells (R^3)
    pub fn cell_count(&self) -> usize {
        let r = self.resolution as usize;
        r * r * r
    }

    /// Number of face samples per velocity component ((R+1)*R*R)
    pub fn face_count(&self) -> usize {
        let r = self.resolution as usize;
        (r + 1) * r * r
    }

    /// Number of boundary voxels ((R+2)^3)
    pub fn halo_count(&self) -> usize {
        let m = self.resolution as usize + 2;
        m * m * m
    }

    /// Linear index of cell (x, y, z), X fastest
    pub fn cell_index(&self, x: u32, y: u32, z: u32) -> usize {
        let r = self.resolution as usize;
        x as usize + y as usize * r + z as usize * r * r
    }

    /// Linear index of face sample (x, y, z); x may reach R
    pub fn face_index(&self, x: u32, y: u32, z: u32) -> usize {
        let r = self.resolution as usize;
        x as usize + y as usize * (r + 1) + z as usize * (r + 1) * r
    }

    /// Linear index into the halo grid from halo coordinates in [0, R+2)
    pub fn halo_index(&self, x: u32, y: u32, z: u32) -> usize {
        let m = self.resolution as usize + 2;
        x as usize + y as usize * m + z as usize * m * m
    }

    /// Halo index of the boundary voxel covering cell (x, y, z)
    pub fn halo_index_of_cell(&self, x: u32, y: u32, z: u32) -> usize {
        self.halo_index(x + 1, y + 1, z + 1)
    }

    /// Decode a linear cell index back to (x, y, z)
    pub fn cell_coords(&self, index: usize) -> (u32, u32, u32) {
        let r = self.resolution as usize;
        (
            (index % r) as u32,
            ((index / r) % r) as u32,
            (index / (r * r)) as u32,
        )
    }

    /// Decode a linear face index back to (x, y, z); x in [0, R]
    pub fn face_coords(&self, index: usize) -> (u32, u32, u32) {
        let r = self.resolution as usize;
        (
            (index % (r + 1)) as u32,
            ((index / (r + 1)) % r) as u32,
            (index / ((r + 1) * r)) as u32,
        )
    }

    /// Workgroup count for a linear dispatch over `items` work-items
    pub fn workgroups_for(items: usize) -> u32 {
        ((items as u32) + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let layout = GridLayout::new(4);
        assert_eq!(layout.cell_count(), 64);
        assert_eq!(layout.face_count(), 5 * 4 * 4);
        assert_eq!(layout.halo_count(), 6 * 6 * 6);
    }

    #[test]
    fn test_x_fastest_ordering() {
        let layout = GridLayout::new(8);
        assert_eq!(layout.cell_index(0, 0, 0), 0);
        assert_eq!(layout.cell_index(1, 0, 0), 1);
        assert_eq!(layout.cell_index(0, 1, 0), 8);
        assert_eq!(layout.cell_index(0, 0, 1), 64);
        assert_eq!(layout.face_index(8, 0, 0), 8);
        assert_eq!(layout.face_index(0, 1, 0), 9);
        assert_eq!(layout.halo_index(0, 1, 0), 10);
    }

    #[test]
    fn test_cell_index_round_trip() {
        let layout = GridLayout::new(7);
        for index in 0..layout.cell_count() {
            let (x, y, z) = layout.cell_coords(index);
            assert_eq!(layout.cell_index(x, y, z), index);
        }
    }

    #[test]
    fn test_face_index_round_trip() {
        let layout = GridLayout::new(5);
        for index in 0..layout.face_count() {
            let (x, y, z) = layout.face_coords(index);
            assert_eq!(layout.face_index(x, y, z), index);
        }
    }

    #[test]
    fn test_halo_covers_cells() {
        let layout = GridLayout::new(4);
        // Cell (0,0,0) sits one voxel inside the halo shell
        assert_eq!(
            layout.halo_index_of_cell(0, 0, 0),
            layout.halo_index(1, 1, 1)
        );
        assert!(layout.halo_index_of_cell(3, 3, 3) < layout.halo_count());
    }

    #[test]
    fn test_workgroup_rounding() {
        assert_eq!(GridLayout::workgroups_for(0), 0);
        assert_eq!(GridLayout::workgroups_for(1), 1);
        assert_eq!(GridLayout::workgroups_for(32), 1);
        assert_eq!(GridLayout::workgroups_for(33), 2);
    }
}
