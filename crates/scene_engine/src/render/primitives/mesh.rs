//! Geometry data for the built-in primitives
//!
//! CPU-side vertex and index data. The backend uploads it once per pooled
//! geometry; the data itself stays on the geometry so outline extraction can
//! run against it later.
//!
//! All generators emit counter-clockwise triangles when viewed from outside
//! and per-vertex normals pointing outward.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{constants, Vec3};

/// Vertex with position, normal and texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Unit normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Indexed triangle geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create geometry from raw parts
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize].position,
                self.vertices[tri[1] as usize].position,
                self.vertices[tri[2] as usize].position,
            ]
        })
    }

    /// Vertex buffer as raw bytes, ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes, ready for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Axis-aligned box centred on the origin, one quad per face
pub fn box_geometry(width: f32, height: f32, depth: f32) -> GeometryData {
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
    // (normal, u axis, v axis) with u x v == normal
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -hz), Vec3::new(0.0, hy, 0.0)),
        (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, hz), Vec3::new(0.0, hy, 0.0)),
        (Vec3::new(0.0, 1.0, 0.0), Vec3::new(hx, 0.0, 0.0), Vec3::new(0.0, 0.0, -hz)),
        (Vec3::new(0.0, -1.0, 0.0), Vec3::new(hx, 0.0, 0.0), Vec3::new(0.0, 0.0, hz)),
        (Vec3::new(0.0, 0.0, 1.0), Vec3::new(hx, 0.0, 0.0), Vec3::new(0.0, hy, 0.0)),
        (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-hx, 0.0, 0.0), Vec3::new(0.0, hy, 0.0)),
    ];
    let half = Vec3::new(hx, hy, hz);

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let center = normal.component_mul(&half);
        let base = vertices.len() as u32;
        let corners = [
            (center - u - v, [0.0, 0.0]),
            (center + u - v, [1.0, 0.0]),
            (center + u + v, [1.0, 1.0]),
            (center - u + v, [0.0, 1.0]),
        ];
        for (position, uv) in corners {
            vertices.push(Vertex::new(position.into(), normal.into(), uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    GeometryData::new(vertices, indices)
}

/// UV sphere centred on the origin
///
/// The pole rows collapse to a point, so only one triangle per segment is
/// emitted there.
pub fn sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::new();
    let mut grid = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * constants::TAU;
            let theta = v * constants::PI;
            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            let normal = position.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y);
            row.push(vertices.len() as u32);
            vertices.push(Vertex::new(position.into(), normal.into(), [u + u_offset, 1.0 - v]));
        }
        grid.push(row);
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    GeometryData::new(vertices, indices)
}

/// Capped cylinder along the Y axis, centred on the origin
pub fn cylinder_geometry(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> GeometryData {
    let radial_segments = radial_segments.max(3);
    let half_height = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side wall: two rings, top then bottom
    let mut rings = [Vec::new(), Vec::new()];
    for (row, ring) in rings.iter_mut().enumerate() {
        let v = row as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        for x in 0..=radial_segments {
            let u = x as f32 / radial_segments as f32;
            let theta = u * constants::TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            ring.push(vertices.len() as u32);
            vertices.push(Vertex::new(
                [radius * sin, -v * height + half_height, radius * cos],
                normal.into(),
                [u, 1.0 - v],
            ));
        }
    }
    for x in 0..radial_segments as usize {
        let a = rings[0][x];
        let b = rings[1][x];
        let c = rings[1][x + 1];
        let d = rings[0][x + 1];
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    for top in [true, false] {
        let radius = if top { radius_top } else { radius_bottom };
        let sign = if top { 1.0 } else { -1.0 };
        let normal = [0.0, sign, 0.0];

        let center_start = vertices.len() as u32;
        for _ in 0..radial_segments {
            vertices.push(Vertex::new([0.0, half_height * sign, 0.0], normal, [0.5, 0.5]));
        }
        let rim_start = vertices.len() as u32;
        for x in 0..=radial_segments {
            let theta = x as f32 / radial_segments as f32 * constants::TAU;
            let (sin, cos) = theta.sin_cos();
            vertices.push(Vertex::new(
                [radius * sin, half_height * sign, radius * cos],
                normal,
                [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
            ));
        }
        for x in 0..radial_segments {
            let c = center_start + x;
            let i = rim_start + x;
            if top {
                indices.extend_from_slice(&[i, i + 1, c]);
            } else {
                indices.extend_from_slice(&[i + 1, i, c]);
            }
        }
    }

    GeometryData::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn face_normal(tri: [[f32; 3]; 3]) -> Vec3 {
        let a = Vec3::from(tri[0]);
        let b = Vec3::from(tri[1]);
        let c = Vec3::from(tri[2]);
        (b - a).cross(&(c - a))
    }

    #[test]
    fn test_box_counts() {
        let data = box_geometry(1.0, 1.0, 1.0);
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.triangle_count(), 12);
    }

    #[test]
    fn test_box_winding_faces_outward() {
        let data = box_geometry(1.0, 2.0, 3.0);
        for tri in data.triangles() {
            let centroid = (Vec3::from(tri[0]) + Vec3::from(tri[1]) + Vec3::from(tri[2])) / 3.0;
            assert!(face_normal(tri).dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_box_extents() {
        let data = box_geometry(2.0, 4.0, 6.0);
        let max_x = data.vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        let max_z = data.vertices.iter().map(|v| v.position[2]).fold(f32::MIN, f32::max);
        assert_relative_eq!(max_x, 1.0);
        assert_relative_eq!(max_z, 3.0);
    }

    #[test]
    fn test_sphere_counts_and_radius() {
        let data = sphere_geometry(0.7, 32, 16);
        assert_eq!(data.vertices.len(), 33 * 17);
        assert_eq!(data.triangle_count(), 32 * 16 * 2 - 2 * 32);
        for vertex in &data.vertices {
            assert_relative_eq!(Vec3::from(vertex.position).norm(), 0.7, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cylinder_counts() {
        let data = cylinder_geometry(0.5, 0.5, 1.0, 32);
        assert_eq!(data.triangle_count(), 32 * 2 + 32 * 2);
    }

    #[test]
    fn test_byte_views_match_lengths() {
        let data = box_geometry(1.0, 1.0, 1.0);
        assert_eq!(data.vertex_bytes().len(), 24 * std::mem::size_of::<Vertex>());
        assert_eq!(data.index_bytes().len(), 36 * 4);
    }
}
