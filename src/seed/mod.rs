// src/seed/mod.rs
//! Initial-condition generators
//!
//! Pure, deterministic functions producing the host-side initial content for
//! each field. Every generator writes every element of the array it returns;
//! no field is ever left partially seeded. Linearization follows
//! `GridLayout`: X fastest, then Y, then Z.

pub mod terrain;

use cgmath::Vector3;

use crate::config::SolverConfig;
use crate::grid::GridLayout;

/// Uniform cell-centered fill: every cell of an R^3 scalar field = `value`
pub fn uniform_scalar(resolution: u32, value: f32) -> Vec<f32> {
    vec![value; GridLayout::new(resolution).cell_count()]
}

/// Uniform face fill for one velocity component ((R+1)*R*R samples)
pub fn uniform_faces(resolution: u32, value: f32) -> Vec<f32> {
    vec![value; GridLayout::new(resolution).face_count()]
}

/// Uniform velocity field: three face arrays filled with the respective
/// component of `velocity`
pub fn uniform_velocity(resolution: u32, velocity: Vector3<f32>) -> [Vec<f32>; 3] {
    [
        uniform_faces(resolution, velocity.x),
        uniform_faces(resolution, velocity.y),
        uniform_faces(resolution, velocity.z),
    ]
}

/// Inflow wall: `value` on the whole low-X face and on a band of the high-X
/// face spanning the central half of Y, zero everywhere else.
///
/// Shaped by raw dimensions rather than a `GridLayout` so it can seed either
/// a cell- or face-shaped array.
pub fn inflow_wall(value: f32, size_x: u32, size_y: u32, size_z: u32) -> Vec<f32> {
    let (sx, sy, sz) = (size_x as usize, size_y as usize, size_z as usize);
    let mut out = vec![0.0; sx * sy * sz];
    for (i, cell) in out.iter_mut().enumerate() {
        let x = i % sx;
        let y = (i / sx) % sy;
        let band = y as f32 - size_y as f32 / 4.0;
        if x == 0 || (x == sx - 1 && band > 0.0 && band < size_y as f32 / 2.0) {
            *cell = value;
        }
    }
    out
}

/// Cylinder mask: zero inside a Z-aligned cylinder of `radius` centered in
/// the XY plane, `value` outside. Center uses the integer midpoint
/// `(size - 1) / 2` per axis.
pub fn cylinder_mask(value: f32, size_x: u32, size_y: u32, size_z: u32, radius: u32) -> Vec<f32> {
    let (sx, sy, sz) = (size_x as usize, size_y as usize, size_z as usize);
    let cx = ((size_x - 1) / 2) as i64;
    let cy = ((size_y - 1) / 2) as i64;
    let r2 = (radius as i64) * (radius as i64);
    let mut out = vec![0.0; sx * sy * sz];
    for (i, cell) in out.iter_mut().enumerate() {
        let x = (i % sx) as i64;
        let y = ((i / sx) % sy) as i64;
        let dx = x - cx;
        let dy = y - cy;
        *cell = if dx * dx + dy * dy < r2 { 0.0 } else { value };
    }
    out
}

/// Domain boundary: an (R+2)^3 halo field where every voxel on the outer
/// shell is closed (0) and the interior is open (1)
pub fn domain_boundary(resolution: u32) -> Vec<f32> {
    let m = resolution as usize + 2;
    let last = m - 1;
    let mut out = vec![0.0; m * m * m];
    for (i, voxel) in out.iter_mut().enumerate() {
        let x = i % m;
        let y = (i / m) % m;
        let z = i / (m * m);
        let on_shell = x == 0 || x == last || y == 0 || y == last || z == 0 || z == last;
        *voxel = if on_shell { 0.0 } else { 1.0 };
    }
    out
}

/// Carve a Z-aligned cylindrical obstacle into an existing boundary field,
/// offset from the domain center. Coordinates are halo-shifted by one so the
/// offsets are expressed in cell space.
pub fn stamp_cylinder(
    boundary: &mut [f32],
    radius: i32,
    offset_x: i32,
    offset_y: i32,
    resolution: u32,
) {
    let m = resolution as usize + 2;
    debug_assert_eq!(boundary.len(), m * m * m);
    let center = ((m as i32) - 1) / 2;
    let r2 = (radius as i64) * (radius as i64);
    for (i, voxel) in boundary.iter_mut().enumerate() {
        let x = (i % m) as i32;
        let y = ((i / m) % m) as i32;
        let dx = (x - 1 - offset_x - center) as i64;
        let dy = (y - 1 - offset_y - center) as i64;
        if dx * dx + dy * dy < r2 {
            *voxel = 0.0;
        }
    }
}

/// Stamp a block of constant X-velocity into the low-X quarter of a face
/// array, keeping `margin` cells clear of the Y/Z domain faces
pub fn inflow_block(vel_x: &mut [f32], resolution: u32, margin: u32, speed: f32, extent_divisor: u32) {
    let layout = GridLayout::new(resolution);
    debug_assert_eq!(vel_x.len(), layout.face_count());
    let span = resolution.saturating_sub(2 * margin);
    let extent = resolution / extent_divisor.max(1);
    for z in 0..span {
        for y in 0..span {
            for x in 0..extent {
                vel_x[layout.face_index(x, y + margin, z + margin)] = speed;
            }
        }
    }
}

/// Seed a regular 3D lattice of smoke emitters: `lattice` subdivisions per
/// axis, emitters at the interior lattice points only
pub fn emitter_lattice(
    density: &mut [f32],
    source: &mut [f32],
    resolution: u32,
    lattice: u32,
    density_value: f32,
    strength: f32,
) {
    let layout = GridLayout::new(resolution);
    debug_assert_eq!(density.len(), layout.cell_count());
    debug_assert_eq!(source.len(), layout.cell_count());
    if lattice < 3 || resolution < lattice {
        return;
    }
    let spacing = resolution / lattice;
    for i in 1..lattice - 1 {
        for j in 1..lattice - 1 {
            for k in 1..lattice - 1 {
                let index = layout.cell_index(j * spacing, i * spacing, k * spacing);
                density[index] = density_value;
                source[index] = strength;
            }
        }
    }
}

/// Host-side content for every solver field
pub struct SeededState {
    pub velocity: [Vec<f32>; 3],
    pub density: Vec<f32>,
    pub pressure: Vec<f32>,
    pub source: Vec<f32>,
    pub boundary: Vec<f32>,
}

/// The default scene: velocity at rest plus an inflow block, zeroed scalars
/// plus an emitter lattice, closed domain shell
pub fn default_state(config: &SolverConfig) -> SeededState {
    let r = config.resolution;
    let mut velocity = uniform_velocity(r, config.rest_velocity);
    inflow_block(
        &mut velocity[0],
        r,
        config.inflow.margin,
        config.inflow.speed,
        config.inflow.extent_divisor,
    );

    let mut density = uniform_scalar(r, 0.0);
    let mut source = uniform_scalar(r, 0.0);
    emitter_lattice(
        &mut density,
        &mut source,
        r,
        config.emitters.lattice,
        config.emitters.density,
        config.emitters.strength,
    );

    SeededState {
        velocity,
        density,
        pressure: uniform_scalar(r, 0.0),
        source,
        boundary: domain_boundary(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_scalar_covers_grid() {
        let field = uniform_scalar(4, 2.0);
        assert_eq!(field.len(), 64);
        assert!(field.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_uniform_velocity_shapes() {
        let [vx, vy, vz] = uniform_velocity(4, Vector3::new(1.0, 2.0, 3.0));
        let faces = 5 * 4 * 4;
        assert_eq!(vx.len(), faces);
        assert_eq!(vy.len(), faces);
        assert_eq!(vz.len(), faces);
        assert!(vx.iter().all(|&v| v == 1.0));
        assert!(vy.iter().all(|&v| v == 2.0));
        assert!(vz.iter().all(|&v| v == 3.0));
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let a = inflow_wall(5.0, 5, 4, 4);
        let b = inflow_wall(5.0, 5, 4, 4);
        assert_eq!(a, b);
        let c = cylinder_mask(1.0, 16, 16, 16, 5);
        let d = cylinder_mask(1.0, 16, 16, 16, 5);
        assert_eq!(c, d);
    }

    #[test]
    fn test_inflow_wall_scenario() {
        let wall = inflow_wall(5.0, 5, 4, 4);
        let index = |x: usize, y: usize, z: usize| x + y * 5 + z * 5 * 4;
        assert_eq!(wall[index(0, 2, 1)], 5.0);
        assert_eq!(wall[index(2, 2, 1)], 0.0);
        // High-X band spans the central half of Y
        assert_eq!(wall[index(4, 2, 1)], 5.0);
        assert_eq!(wall[index(4, 0, 1)], 0.0);
    }

    #[test]
    fn test_inflow_wall_closed_form() {
        let (sx, sy, sz) = (6u32, 8u32, 3u32);
        let wall = inflow_wall(2.5, sx, sy, sz);
        for (i, &v) in wall.iter().enumerate() {
            let x = i % sx as usize;
            let y = (i / sx as usize) % sy as usize;
            let band = y as f32 - sy as f32 / 4.0;
            let expected = if x == 0
                || (x == sx as usize - 1 && band > 0.0 && band < sy as f32 / 2.0)
            {
                2.5
            } else {
                0.0
            };
            assert_eq!(v, expected, "element {i}");
        }
    }

    #[test]
    fn test_cylinder_mask_invariant() {
        let (sx, sy, sz, rad) = (12u32, 12u32, 5u32, 4u32);
        let mask = cylinder_mask(1.0, sx, sy, sz, rad);
        let cx = ((sx - 1) / 2) as i64;
        let cy = ((sy - 1) / 2) as i64;
        for (i, &v) in mask.iter().enumerate() {
            let x = (i % sx as usize) as i64;
            let y = ((i / sx as usize) % sy as usize) as i64;
            let inside = (x - cx).pow(2) + (y - cy).pow(2) < (rad as i64).pow(2);
            assert_eq!(v, if inside { 0.0 } else { 1.0 }, "element {i}");
        }
        // Independent of z: every z-slice identical
        let slice = (sx * sy) as usize;
        for z in 1..sz as usize {
            assert_eq!(mask[..slice], mask[z * slice..(z + 1) * slice]);
        }
    }

    #[test]
    fn test_domain_boundary_invariant() {
        let r = 6u32;
        let boundary = domain_boundary(r);
        let m = r as usize + 2;
        assert_eq!(boundary.len(), m * m * m);
        for (i, &v) in boundary.iter().enumerate() {
            let x = i % m;
            let y = (i / m) % m;
            let z = i / (m * m);
            let on_shell =
                x == 0 || x == m - 1 || y == 0 || y == m - 1 || z == 0 || z == m - 1;
            assert_eq!(v, if on_shell { 0.0 } else { 1.0 }, "voxel {i}");
        }
    }

    #[test]
    fn test_stamp_cylinder_carves_only_inside() {
        let r = 16u32;
        let mut boundary = domain_boundary(r);
        let before = boundary.clone();
        stamp_cylinder(&mut boundary, 3, 2, -1, r);
        let m = r as usize + 2;
        let center = ((m as i32) - 1) / 2;
        let mut carved = 0;
        for (i, (&now, &was)) in boundary.iter().zip(before.iter()).enumerate() {
            let x = (i % m) as i32;
            let y = ((i / m) % m) as i32;
            let dx = (x - 1 - 2 - center) as i64;
            let dy = (y - 1 + 1 - center) as i64;
            if dx * dx + dy * dy < 9 {
                assert_eq!(now, 0.0, "voxel {i} should be carved");
                if was != 0.0 {
                    carved += 1;
                }
            } else {
                assert_eq!(now, was, "voxel {i} should be untouched");
            }
        }
        assert!(carved > 0);
    }

    #[test]
    fn test_inflow_block_respects_margin() {
        let r = 16u32;
        let layout = GridLayout::new(r);
        let mut vx = uniform_faces(r, 0.0);
        inflow_block(&mut vx, r, 4, 20.0, 4);
        // Inside the block
        assert_eq!(vx[layout.face_index(0, 4, 4)], 20.0);
        assert_eq!(vx[layout.face_index(3, 11, 11)], 20.0);
        // Outside: past x extent, inside margin, and the untouched rest
        assert_eq!(vx[layout.face_index(4, 4, 4)], 0.0);
        assert_eq!(vx[layout.face_index(0, 3, 4)], 0.0);
        assert_eq!(vx[layout.face_index(0, 12, 4)], 0.0);
    }

    #[test]
    fn test_inflow_block_oversized_margin_is_noop() {
        let r = 8u32;
        let mut vx = uniform_faces(r, 0.0);
        inflow_block(&mut vx, r, 8, 20.0, 4);
        assert!(vx.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_emitter_lattice_interior_points() {
        let r = 20u32;
        let layout = GridLayout::new(r);
        let mut density = uniform_scalar(r, 0.0);
        let mut source = uniform_scalar(r, 0.0);
        emitter_lattice(&mut density, &mut source, r, 5, 10.0, 1.0);
        let spacing = 4;
        let mut emitters = 0;
        for (i, &d) in density.iter().enumerate() {
            let (x, y, z) = layout.cell_coords(i);
            let on_lattice = x % spacing == 0
                && y % spacing == 0
                && z % spacing == 0
                && (1..4).contains(&(x / spacing))
                && (1..4).contains(&(y / spacing))
                && (1..4).contains(&(z / spacing));
            if on_lattice {
                assert_eq!(d, 10.0);
                assert_eq!(source[i], 1.0);
                emitters += 1;
            } else {
                assert_eq!(d, 0.0);
                assert_eq!(source[i], 0.0);
            }
        }
        assert_eq!(emitters, 27);
    }

    #[test]
    fn test_default_state_full_coverage() {
        let config = crate::config::SolverConfig::with_resolution(16);
        let layout = GridLayout::new(16);
        let state = default_state(&config);
        for component in &state.velocity {
            assert_eq!(component.len(), layout.face_count());
        }
        assert_eq!(state.density.len(), layout.cell_count());
        assert_eq!(state.pressure.len(), layout.cell_count());
        assert_eq!(state.source.len(), layout.cell_count());
        assert_eq!(state.boundary.len(), layout.halo_count());
        assert!(state.pressure.iter().all(|&p| p == 0.0));
        assert!(state.density.iter().any(|&d| d > 0.0));
    }
}
