//! Ray-mesh intersection
//!
//! Brute-force Moller-Trumbore over every triangle, with barycentric
//! interpolation of normals and UVs at the closest hit.

use glam::{Vec2, Vec3};

use crate::types::MeshHit;

const EPSILON: f32 = 1e-6;

/// Ray parameter and barycentrics of a triangle hit
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub t: f32,
    /// Weight of vertex 1
    pub u: f32,
    /// Weight of vertex 2
    pub v: f32,
}

impl TriangleHit {
    /// Barycentric weights as (w0, w1, w2)
    #[inline]
    pub fn weights(&self) -> Vec3 {
        Vec3::new(1.0 - self.u - self.v, self.u, self.v)
    }
}

/// Moller-Trumbore ray-triangle test; hits behind the origin are rejected
pub fn ray_triangle_intersection(
    origin: Vec3,
    dir: Vec3,
    [v0, v1, v2]: [Vec3; 3],
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let pvec = dir.cross(edge2);
    let det = edge1.dot(pvec);
    // Parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = det.recip();

    let tvec = origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    (t >= EPSILON).then_some(TriangleHit { t, u, v })
}

/// Interpolate a per-vertex attribute with barycentric weights
#[inline]
pub fn interpolate<T>(a: T, b: T, c: T, weights: Vec3) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    a * weights.x + b * weights.y + c * weights.z
}

/// Triangle mesh geometry for picking
#[derive(Debug, Clone, Default)]
pub struct MeshRaycastData {
    pub positions: Vec<Vec3>,
    /// Three indices per triangle
    pub indices: Vec<u32>,
    /// Per-vertex normals, or empty to use face normals
    pub normals: Vec<Vec3>,
    /// Per-vertex UVs, or empty if the mesh is not unwrapped
    pub uvs: Vec<Vec2>,
}

impl MeshRaycastData {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex indices of a triangle; `None` if the face or an index is out of range
    pub fn triangle_indices(&self, face: usize) -> Option<[usize; 3]> {
        let tri = self.indices.get(face * 3..face * 3 + 3)?;
        let idx = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        idx.iter().all(|&i| i < self.positions.len()).then_some(idx)
    }

    pub fn triangle_positions(&self, face: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.triangle_indices(face)?;
        Some([self.positions[a], self.positions[b], self.positions[c]])
    }

    pub fn triangle_uvs(&self, face: usize) -> Option<[Vec2; 3]> {
        let [a, b, c] = self.triangle_indices(face)?;
        Some([*self.uvs.get(a)?, *self.uvs.get(b)?, *self.uvs.get(c)?])
    }

    /// Area of a triangle in UV space
    pub fn uv_triangle_area(&self, face: usize) -> Option<f32> {
        let [a, b, c] = self.triangle_uvs(face)?;
        Some(((b - a).perp_dot(c - a) * 0.5).abs())
    }

    /// Closest hit of a ray given in mesh space
    pub fn raycast(&self, origin: Vec3, dir: Vec3) -> Option<MeshHit> {
        let (hit, face) = (0..self.triangle_count())
            .filter_map(|face| {
                let tri = self.triangle_positions(face)?;
                ray_triangle_intersection(origin, dir, tri).map(|hit| (hit, face))
            })
            .min_by(|(a, _), (b, _)| a.t.total_cmp(&b.t))?;

        let [i0, i1, i2] = self.triangle_indices(face)?;
        let weights = hit.weights();

        let normal = match (self.normals.get(i0), self.normals.get(i1), self.normals.get(i2)) {
            (Some(&n0), Some(&n1), Some(&n2)) => interpolate(n0, n1, n2, weights),
            _ => {
                let [p0, p1, p2] = self.triangle_positions(face)?;
                (p1 - p0).cross(p2 - p0)
            }
        }
        .normalize_or_zero();

        let uv = self
            .triangle_uvs(face)
            .map(|[a, b, c]| interpolate(a, b, c, weights));

        Some(MeshHit {
            world_pos: origin + dir * hit.t,
            face_id: face as u32,
            barycentric: weights,
            normal,
            uv,
        })
    }
}
