// src/stages/kernels.rs
//! Default WGSL kernel sources
//!
//! Each stage accepts any WGSL source that matches its binding interface and
//! fully repopulates its outputs; these are the kernels the solver ships
//! with. Index formulas mirror `GridLayout` exactly: X fastest, then Y,
//! then Z, with the velocity face grid inflated by one along X and the
//! boundary halo grid padded by one cell per side.

/// Red/black Gauss-Seidel pressure relaxation.
///
/// Reads velocity and the boundary mask, updates pressure in place. Only
/// cells whose checkerboard color matches `params.phase` write, so neighbor
/// reads within one invocation never race a same-invocation write.
pub const RELAX: &str = r#"
struct RelaxParams {
    grid_size: u32,
    phase: u32,
    _pad0: u32,
    _pad1: u32,
}

@group(0) @binding(0) var<storage, read> vel_x: array<f32>;
@group(0) @binding(1) var<storage, read> vel_y: array<f32>;
@group(0) @binding(2) var<storage, read> vel_z: array<f32>;
@group(0) @binding(3) var<storage, read_write> pressure: array<f32>;
@group(0) @binding(4) var<storage, read> boundary: array<f32>;
@group(0) @binding(5) var<uniform> params: RelaxParams;

fn cell_index(x: u32, y: u32, z: u32) -> u32 {
    let n = params.grid_size;
    return x + y * n + z * n * n;
}

fn face_index(x: u32, y: u32, z: u32) -> u32 {
    let n = params.grid_size;
    return x + y * (n + 1u) + z * (n + 1u) * n;
}

fn open_at(x: i32, y: i32, z: i32) -> f32 {
    let m = params.grid_size + 2u;
    let i = u32(x + 1) + u32(y + 1) * m + u32(z + 1) * m * m;
    return boundary[i];
}

fn divergence(x: u32, y: u32, z: u32) -> f32 {
    let n = params.grid_size;
    var div = vel_x[face_index(x + 1u, y, z)] - vel_x[face_index(x, y, z)];
    if (y + 1u < n) {
        div += vel_y[face_index(x, y + 1u, z)] - vel_y[face_index(x, y, z)];
    }
    if (z + 1u < n) {
        div += vel_z[face_index(x, y, z + 1u)] - vel_z[face_index(x, y, z)];
    }
    return div;
}

@compute @workgroup_size(32)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let n = params.grid_size;
    let idx = gid.x;
    if (idx >= n * n * n) {
        return;
    }
    let x = idx % n;
    let y = (idx / n) % n;
    let z = idx / (n * n);

    if ((x + y + z) % 2u != params.phase) {
        return;
    }
    if (open_at(i32(x), i32(y), i32(z)) == 0.0) {
        pressure[idx] = 0.0;
        return;
    }

    var sum = 0.0;
    var count = 0.0;
    if (x > 0u) {
        let o = open_at(i32(x) - 1, i32(y), i32(z));
        sum += o * pressure[cell_index(x - 1u, y, z)];
        count += o;
    }
    if (x + 1u < n) {
        let o = open_at(i32(x) + 1, i32(y), i32(z));
        sum += o * pressure[cell_index(x + 1u, y, z)];
        count += o;
    }
    if (y > 0u) {
        let o = open_at(i32(x), i32(y) - 1, i32(z));
        sum += o * pressure[cell_index(x, y - 1u, z)];
        count += o;
    }
    if (y + 1u < n) {
        let o = open_at(i32(x), i32(y) + 1, i32(z));
        sum += o * pressure[cell_index(x, y + 1u, z)];
        count += o;
    }
    if (z > 0u) {
        let o = open_at(i32(x), i32(y), i32(z) - 1);
        sum += o * pressure[cell_index(x, y, z - 1u)];
        count += o;
    }
    if (z + 1u < n) {
        let o = open_at(i32(x), i32(y), i32(z) + 1);
        sum += o * pressure[cell_index(x, y, z + 1u)];
        count += o;
    }

    pressure[idx] = (sum - divergence(x, y, z)) / max(count, 1.0);
}
"#;

/// Semi-Lagrangian advection over the full field set.
///
/// Dispatched over the face grid; every thread writes the three velocity
/// outputs at its face index, and threads whose index also names a cell
/// write the scalar outputs. Every output element is written exactly once
/// per dispatch.
pub const ADVECT: &str = r#"
struct GridParams {
    grid_size: u32,
    time_step: f32,
    dissipation: f32,
    _pad0: u32,
}

@group(0) @binding(0) var<storage, read> src_vel_x: array<f32>;
@group(0) @binding(1) var<storage, read> src_vel_y: array<f32>;
@group(0) @binding(2) var<storage, read> src_vel_z: array<f32>;
@group(0) @binding(3) var<storage, read> src_density: array<f32>;
@group(0) @binding(4) var<storage, read> src_pressure: array<f32>;
@group(0) @binding(5) var<storage, read> src_source: array<f32>;
@group(0) @binding(6) var<storage, read_write> dst_vel_x: array<f32>;
@group(0) @binding(7) var<storage, read_write> dst_vel_y: array<f32>;
@group(0) @binding(8) var<storage, read_write> dst_vel_z: array<f32>;
@group(0) @binding(9) var<storage, read_write> dst_density: array<f32>;
@group(0) @binding(10) var<storage, read_write> dst_pressure: array<f32>;
@group(0) @binding(11) var<storage, read_write> dst_source: array<f32>;
@group(0) @binding(12) var<storage, read> boundary: array<f32>;
@group(0) @binding(13) var<uniform> params: GridParams;

fn cell_index(x: u32, y: u32, z: u32) -> u32 {
    let n = params.grid_size;
    return x + y * n + z * n * n;
}

fn face_index(x: u32, y: u32, z: u32) -> u32 {
    let n = params.grid_size;
    return x + y * (n + 1u) + z * (n + 1u) * n;
}

fn open_at(x: u32, y: u32, z: u32) -> f32 {
    let m = params.grid_size + 2u;
    let i = (x + 1u) + (y + 1u) * m + (z + 1u) * m * m;
    return boundary[i];
}

fn vel_at_cell(x: u32, y: u32, z: u32) -> vec3<f32> {
    let n = params.grid_size;
    let vx = 0.5 * (src_vel_x[face_index(x, y, z)] + src_vel_x[face_index(x + 1u, y, z)]);
    var vy = src_vel_y[face_index(x, y, z)];
    if (y + 1u < n) {
        vy = 0.5 * (vy + src_vel_y[face_index(x, y + 1u, z)]);
    }
    var vz = src_vel_z[face_index(x, y, z)];
    if (z + 1u < n) {
        vz = 0.5 * (vz + src_vel_z[face_index(x, y, z + 1u)]);
    }
    return vec3<f32>(vx, vy, vz);
}

fn sample_velocity(p: vec3<f32>) -> vec3<f32> {
    let n = params.grid_size;
    let top = f32(n - 1u);
    let q = clamp(p, vec3<f32>(0.0), vec3<f32>(top));
    let base = floor(q);
    let f = q - base;
    let x0 = u32(base.x);
    let y0 = u32(base.y);
    let z0 = u32(base.z);
    let x1 = min(x0 + 1u, n - 1u);
    let y1 = min(y0 + 1u, n - 1u);
    let z1 = min(z0 + 1u, n - 1u);

    let c000 = vel_at_cell(x0, y0, z0);
    let c100 = vel_at_cell(x1, y0, z0);
    let c010 = vel_at_cell(x0, y1, z0);
    let c110 = vel_at_cell(x1, y1, z0);
    let c001 = vel_at_cell(x0, y0, z1);
    let c101 = vel_at_cell(x1, y0, z1);
    let c011 = vel_at_cell(x0, y1, z1);
    let c111 = vel_at_cell(x1, y1, z1);

    let c00 = mix(c000, c100, f.x);
    let c10 = mix(c010, c110, f.x);
    let c01 = mix(c001, c101, f.x);
    let c11 = mix(c011, c111, f.x);
    return mix(mix(c00, c10, f.y), mix(c01, c11, f.y), f.z);
}

fn sample_density(p: vec3<f32>) -> f32 {
    let n = params.grid_size;
    let top = f32(n - 1u);
    let q = clamp(p, vec3<f32>(0.0), vec3<f32>(top));
    let base = floor(q);
    let f = q - base;
    let x0 = u32(base.x);
    let y0 = u32(base.y);
    let z0 = u32(base.z);
    let x1 = min(x0 + 1u, n - 1u);
    let y1 = min(y0 + 1u, n - 1u);
    let z1 = min(z0 + 1u, n - 1u);

    let c00 = mix(src_density[cell_index(x0, y0, z0)], src_density[cell_index(x1, y0, z0)], f.x);
    let c10 = mix(src_density[cell_index(x0, y1, z0)], src_density[cell_index(x1, y1, z0)], f.x);
    let c01 = mix(src_density[cell_index(x0, y0, z1)], src_density[cell_index(x1, y0, z1)], f.x);
    let c11 = mix(src_density[cell_index(x0, y1, z1)], src_density[cell_index(x1, y1, z1)], f.x);
    return mix(mix(c00, c10, f.y), mix(c01, c11, f.y), f.z);
}

fn advected_component(pos: vec3<f32>) -> vec3<f32> {
    let back = pos - params.time_step * sample_velocity(pos);
    return sample_velocity(back);
}

@compute @workgroup_size(32)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let n = params.grid_size;
    let faces = (n + 1u) * n * n;
    let idx = gid.x;
    if (idx >= faces) {
        return;
    }
    let x = idx % (n + 1u);
    let y = (idx / (n + 1u)) % n;
    let z = idx / ((n + 1u) * n);

    // Velocity backtrace per component at its own face position
    let cx = min(x, n - 1u);
    let mask = open_at(cx, y, z);
    let pos_x = vec3<f32>(f32(x) - 0.5, f32(y), f32(z));
    let pos_y = vec3<f32>(f32(cx), f32(y) - 0.5, f32(z));
    let pos_z = vec3<f32>(f32(cx), f32(y), f32(z) - 0.5);
    dst_vel_x[idx] = mask * advected_component(pos_x).x;
    dst_vel_y[idx] = mask * advected_component(pos_y).y;
    dst_vel_z[idx] = mask * advected_component(pos_z).z;

    // Scalar update for the cell-range prefix of the dispatch
    if (idx < n * n * n) {
        let sx = idx % n;
        let sy = (idx / n) % n;
        let sz = idx / (n * n);
        let cmask = open_at(sx, sy, sz);
        let pos = vec3<f32>(f32(sx), f32(sy), f32(sz));
        let back = pos - params.time_step * sample_velocity(pos);
        let fed = sample_density(back) + params.time_step * src_source[idx];
        dst_density[idx] = cmask * params.dissipation * fed;
        dst_pressure[idx] = cmask * src_pressure[idx];
        dst_source[idx] = src_source[idx];
    }
}
"#;

/// Frozen per-voxel update: copies every input field to its output
/// unchanged. Running it forward then swapped must return both generations
/// to their pre-frame contents, which is what its tests rely on.
pub const ADVECT_PASSTHROUGH: &str = r#"
struct GridParams {
    grid_size: u32,
    time_step: f32,
    dissipation: f32,
    _pad0: u32,
}

@group(0) @binding(0) var<storage, read> src_vel_x: array<f32>;
@group(0) @binding(1) var<storage, read> src_vel_y: array<f32>;
@group(0) @binding(2) var<storage, read> src_vel_z: array<f32>;
@group(0) @binding(3) var<storage, read> src_density: array<f32>;
@group(0) @binding(4) var<storage, read> src_pressure: array<f32>;
@group(0) @binding(5) var<storage, read> src_source: array<f32>;
@group(0) @binding(6) var<storage, read_write> dst_vel_x: array<f32>;
@group(0) @binding(7) var<storage, read_write> dst_vel_y: array<f32>;
@group(0) @binding(8) var<storage, read_write> dst_vel_z: array<f32>;
@group(0) @binding(9) var<storage, read_write> dst_density: array<f32>;
@group(0) @binding(10) var<storage, read_write> dst_pressure: array<f32>;
@group(0) @binding(11) var<storage, read_write> dst_source: array<f32>;
@group(0) @binding(12) var<storage, read> boundary: array<f32>;
@group(0) @binding(13) var<uniform> params: GridParams;

@compute @workgroup_size(32)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let n = params.grid_size;
    let faces = (n + 1u) * n * n;
    let idx = gid.x;
    if (idx >= faces) {
        return;
    }
    dst_vel_x[idx] = src_vel_x[idx];
    dst_vel_y[idx] = src_vel_y[idx];
    dst_vel_z[idx] = src_vel_z[idx];
    if (idx < n * n * n) {
        dst_density[idx] = src_density[idx];
        dst_pressure[idx] = src_pressure[idx];
        dst_source[idx] = src_source[idx];
    }
}
"#;

/// Projection of one generation's fields into the shared 3D texture:
/// cell-centered velocity in rgb, density in alpha, obstacles zeroed.
pub const PROJECT: &str = r#"
struct GridParams {
    grid_size: u32,
    time_step: f32,
    dissipation: f32,
    _pad0: u32,
}

@group(0) @binding(0) var<storage, read> vel_x: array<f32>;
@group(0) @binding(1) var<storage, read> vel_y: array<f32>;
@group(0) @binding(2) var<storage, read> vel_z: array<f32>;
@group(0) @binding(3) var<storage, read> density: array<f32>;
@group(0) @binding(4) var<storage, read> boundary: array<f32>;
@group(0) @binding(5) var output_tex: texture_storage_3d<rgba32float, write>;
@group(0) @binding(6) var<uniform> params: GridParams;

fn face_index(x: u32, y: u32, z: u32) -> u32 {
    let n = params.grid_size;
    return x + y * (n + 1u) + z * (n + 1u) * n;
}

fn open_at(x: u32, y: u32, z: u32) -> f32 {
    let m = params.grid_size + 2u;
    let i = (x + 1u) + (y + 1u) * m + (z + 1u) * m * m;
    return boundary[i];
}

@compute @workgroup_size(32)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let n = params.grid_size;
    let idx = gid.x;
    if (idx >= n * n * n) {
        return;
    }
    let x = idx % n;
    let y = (idx / n) % n;
    let z = idx / (n * n);

    let mask = open_at(x, y, z);
    let vx = 0.5 * (vel_x[face_index(x, y, z)] + vel_x[face_index(x + 1u, y, z)]);
    var vy = vel_y[face_index(x, y, z)];
    if (y + 1u < n) {
        vy = 0.5 * (vy + vel_y[face_index(x, y + 1u, z)]);
    }
    var vz = vel_z[face_index(x, y, z)];
    if (z + 1u < n) {
        vz = 0.5 * (vz + vel_z[face_index(x, y, z + 1u)]);
    }

    let texel = mask * vec4<f32>(vx, vy, vz, density[idx]);
    textureStore(output_tex, vec3<i32>(i32(x), i32(y), i32(z)), texel);
}
"#;
