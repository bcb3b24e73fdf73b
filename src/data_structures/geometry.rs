//! CPU-side geometry and procedural sphere generation.
//!
//! [`CpuGeometry`] is the plain vertex/normal/UV/index data that is produced
//! once at startup and later uploaded into a [`Mesh`](crate::data_structures::model::Mesh).

use anyhow::ensure;
use cgmath::{Deg, Vector2, Vector3};

/// Polar sampling step (from the north pole down to the south pole).
pub const POLAR_STEP_DEG: u32 = 10;
/// Azimuthal sampling step around the Y axis.
pub const AZIMUTH_STEP_DEG: u32 = 20;

/// Positions, normals, texture coordinates and triangle indices of a mesh.
///
/// The three attribute vectors are parallel: entry `k` of each describes vertex `k`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CpuGeometry {
    pub verts: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub tex_coords: Vec<Vector2<f32>>,
    pub indices: Vec<u32>,
}

impl CpuGeometry {
    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flip every normal so the surface is lit from the inside (used for the starfield).
    pub fn invert_normals(&mut self) {
        self.normals.iter_mut().for_each(|n| *n = -*n);
    }

    /// Check the invariants the GPU upload relies on.
    pub fn validate(&self) -> anyhow::Result<()> {
        let count = self.vertex_count();
        ensure!(
            self.normals.len() == count && self.tex_coords.len() == count,
            "attribute length mismatch: {} positions, {} normals, {} tex coords",
            count,
            self.normals.len(),
            self.tex_coords.len()
        );
        ensure!(
            self.indices.len() % 3 == 0,
            "index count {} is not a multiple of three",
            self.indices.len()
        );
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            anyhow::bail!("index {} out of range for {} vertices", bad, count);
        }
        Ok(())
    }
}

/**
 * Triangulate a row-major grid of `rows` x `cols` samples into two triangles per cell.
 *
 * The winding matches for every cell, so the whole surface faces the same way.
 */
pub fn create_triangle_mesh(rows: u32, cols: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity((rows.saturating_sub(1) * cols.saturating_sub(1) * 6) as usize);
    for i in 1..rows {
        for j in 1..cols {
            indices.push(i * cols + j);
            indices.push((i - 1) * cols + j);
            indices.push((i - 1) * cols + j - 1);

            indices.push((i - 1) * cols + j - 1);
            indices.push(i * cols + j - 1);
            indices.push(i * cols + j);
        }
    }
    indices
}

/// Generate a UV-sphere of the given radius centred at the origin.
///
/// The polar angle runs 0..=180 degrees in [`POLAR_STEP_DEG`] steps and the
/// azimuth 0..=360 degrees in [`AZIMUTH_STEP_DEG`] steps. The seam column is
/// duplicated so texture coordinates wrap from `u = 1` back to `u = 0`.
pub fn create_sphere(radius: f32) -> CpuGeometry {
    let rows = 180 / POLAR_STEP_DEG + 1;
    let cols = 360 / AZIMUTH_STEP_DEG + 1;
    let mut geometry = CpuGeometry::default();

    for row in 0..rows {
        let phi = (row * POLAR_STEP_DEG) as f32;
        let (sin_phi, cos_phi) = cgmath::Rad::from(Deg(phi)).0.sin_cos();
        for col in 0..cols {
            let theta = (col * AZIMUTH_STEP_DEG) as f32;
            let (sin_theta, cos_theta) = cgmath::Rad::from(Deg(theta)).0.sin_cos();

            let direction = Vector3::new(cos_theta * sin_phi, cos_phi, sin_theta * sin_phi);
            geometry.verts.push(direction * radius);
            geometry.normals.push(direction);
            geometry
                .tex_coords
                .push(Vector2::new(theta / 360.0, phi / 180.0));
        }
    }
    geometry.indices = create_triangle_mesh(rows, cols);
    geometry
}
