// src/seed/terrain.rs
//! Terrain-derived boundary fields
//!
//! Parses a plain-text heightfield (one row per line, whitespace-separated
//! floats, heights normalized to [0, 1]) and converts it into a boundary mask
//! by thresholding each column's Z against the interpolated terrain height.
//! A missing or unreadable file is recoverable: the caller gets a flat
//! domain boundary and the run proceeds.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, SolverError};
use crate::grid::GridLayout;

use super::domain_boundary;

/// A parsed rectangular heightfield
pub struct Heightfield {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl Heightfield {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Height at (row, col); rows index the file's lines
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.width + col]
    }
}

/// Parse a whitespace-delimited heightfield file.
///
/// Rows must all carry the same number of tokens; ragged input is rejected
/// rather than silently truncated. Fully blank lines are skipped so trailing
/// newlines are harmless.
pub fn load_heightfield(path: impl AsRef<Path>) -> Result<Heightfield> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    let mut width = 0usize;
    let mut height = 0usize;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut row_width = 0usize;
        for token in line.split_whitespace() {
            let value: f32 = token.parse().map_err(|_| SolverError::Heightfield {
                line: line_number + 1,
                reason: format!("non-numeric token `{token}`"),
            })?;
            values.push(value);
            row_width += 1;
        }

        if height == 0 {
            width = row_width;
        } else if row_width != width {
            return Err(SolverError::Heightfield {
                line: line_number + 1,
                reason: format!("row has {row_width} values, expected {width}"),
            });
        }
        height += 1;
    }

    if height == 0 {
        return Err(SolverError::Heightfield {
            line: 0,
            reason: "heightfield file contains no rows".to_string(),
        });
    }

    log::info!("loaded heightfield {width} x {height}");
    Ok(Heightfield {
        values,
        width,
        height,
    })
}

/// Build an (R+2)^3 boundary mask from a heightfield: each interior column
/// samples the terrain by nearest index, and cells at or above the scaled
/// terrain height are open. The outer shell stays closed.
pub fn boundary_from_heightfield(heightfield: &Heightfield, resolution: u32) -> Vec<f32> {
    let mut boundary = domain_boundary(resolution);
    let layout = GridLayout::new(resolution);
    let m = resolution + 2;

    for z in 1..=resolution {
        for y in 1..=resolution {
            for x in 1..=resolution {
                let row = ((x - 1) as usize * heightfield.height) / resolution as usize;
                let col = ((y - 1) as usize * heightfield.width) / resolution as usize;
                let terrain_height = heightfield.get(
                    row.min(heightfield.height - 1),
                    col.min(heightfield.width - 1),
                );
                let open = z as f32 >= terrain_height * m as f32;
                boundary[layout.halo_index(x, y, z)] = if open { 1.0 } else { 0.0 };
            }
        }
    }

    boundary
}

/// Stamp a one-cell-thick transverse wall at mid-height across the low-X
/// side of the domain, spanning all of Y
pub fn stamp_transverse_wall(boundary: &mut [f32], resolution: u32) {
    let layout = GridLayout::new(resolution);
    debug_assert_eq!(boundary.len(), layout.halo_count());
    let m = resolution + 2;
    let z = resolution / 2 + 1;
    for y in 0..m {
        boundary[layout.halo_index(1, y, z)] = 0.0;
    }
}

/// Terrain loading with the recovery policy: any failure logs a warning and
/// falls back to the flat domain boundary with no interior obstacles
pub fn load_terrain_or_flat(path: impl AsRef<Path>, resolution: u32) -> Vec<f32> {
    match load_heightfield(path.as_ref()) {
        Ok(heightfield) => boundary_from_heightfield(&heightfield, resolution),
        Err(err) => {
            log::warn!(
                "failed to load terrain from {}: {err}; using flat boundary",
                path.as_ref().display()
            );
            domain_boundary(resolution)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_heightfield() {
        let path = write_temp("eddy_terrain_ok.txt", "0.0 0.5 1.0\n0.25 0.5 0.75\n");
        let heightfield = load_heightfield(&path).unwrap();
        assert_eq!(heightfield.width(), 3);
        assert_eq!(heightfield.height(), 2);
        assert_eq!(heightfield.get(0, 1), 0.5);
        assert_eq!(heightfield.get(1, 2), 0.75);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_heightfield("/nonexistent/terrain.txt");
        assert!(matches!(result, Err(SolverError::Io(_))));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let path = write_temp("eddy_terrain_ragged.txt", "0.0 0.5\n0.25\n");
        let result = load_heightfield(&path);
        assert!(matches!(
            result,
            Err(SolverError::Heightfield { line: 2, .. })
        ));
    }

    #[test]
    fn test_non_numeric_token_rejected() {
        let path = write_temp("eddy_terrain_bad_token.txt", "0.0 hill\n");
        assert!(matches!(
            load_heightfield(&path),
            Err(SolverError::Heightfield { line: 1, .. })
        ));
    }

    #[test]
    fn test_boundary_from_heightfield_thresholds_z() {
        let r = 6u32;
        let layout = GridLayout::new(r);
        // Uniform half-height terrain: cells open iff z >= 0.5 * (r + 2)
        let heightfield = Heightfield {
            values: vec![0.5; 4],
            width: 2,
            height: 2,
        };
        let boundary = boundary_from_heightfield(&heightfield, r);
        let threshold = 0.5 * (r + 2) as f32;
        for z in 1..=r {
            for y in 1..=r {
                for x in 1..=r {
                    let expected = if (z as f32) >= threshold { 1.0 } else { 0.0 };
                    assert_eq!(boundary[layout.halo_index(x, y, z)], expected);
                }
            }
        }
        // Shell stays closed regardless of terrain
        assert_eq!(boundary[layout.halo_index(0, 3, 7)], 0.0);
        assert_eq!(boundary[layout.halo_index(3, 3, 0)], 0.0);
    }

    #[test]
    fn test_fallback_is_flat_boundary() {
        let boundary = load_terrain_or_flat("/nonexistent/terrain.txt", 6);
        assert_eq!(boundary, domain_boundary(6));
    }

    #[test]
    fn test_transverse_wall() {
        let r = 8u32;
        let layout = GridLayout::new(r);
        let mut boundary = domain_boundary(r);
        stamp_transverse_wall(&mut boundary, r);
        let z = r / 2 + 1;
        for y in 0..r + 2 {
            assert_eq!(boundary[layout.halo_index(1, y, z)], 0.0);
        }
        // A neighboring column is untouched
        assert_eq!(boundary[layout.halo_index(2, 3, z)], 1.0);
    }
}
