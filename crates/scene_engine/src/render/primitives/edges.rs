//! Feature-edge extraction
//!
//! Produces the line segments drawn as a primitive's outline. An edge is kept
//! when it borders exactly one triangle, or when the angle between the face
//! normals of its two triangles exceeds a threshold. Positions are snapped to
//! a fixed grid before matching so that seams with duplicated vertices still
//! pair up.

use std::collections::HashMap;

use crate::foundation::math::{utils, Vec3};
use crate::render::primitives::GeometryData;

/// Decimal places kept when matching vertex positions
const PRECISION_POINTS: i32 = 4;

type PositionKey = [i64; 3];

#[derive(Debug, Clone, Copy)]
struct OpenEdge {
    start: [f32; 3],
    end: [f32; 3],
    normal: Vec3,
}

fn position_key(position: [f32; 3], multiplier: f32) -> PositionKey {
    position.map(|c| (c * multiplier).round() as i64)
}

/// Extract outline segments from indexed triangle data
///
/// Returns a flat list of points, two per segment.
pub fn extract_edges(data: &GeometryData, threshold_deg: f32) -> Vec<[f32; 3]> {
    let multiplier = 10f32.powi(PRECISION_POINTS);
    let threshold_dot = utils::deg_to_rad(threshold_deg).cos();

    // Directed edge -> first triangle that produced it; `None` once paired.
    let mut open: HashMap<(PositionKey, PositionKey), Option<OpenEdge>> = HashMap::new();
    // Insertion order of directed edges, so boundary output is deterministic
    let mut order = Vec::new();
    let mut segments = Vec::new();

    for tri in data.triangles() {
        let keys = tri.map(|p| position_key(p, multiplier));
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            continue;
        }

        let a = Vec3::from(tri[0]);
        let b = Vec3::from(tri[1]);
        let c = Vec3::from(tri[2]);
        let Some(normal) = (b - a).cross(&(c - a)).try_normalize(f32::EPSILON) else {
            continue;
        };

        for j in 0..3 {
            let next = (j + 1) % 3;
            let forward = (keys[j], keys[next]);
            let reverse = (keys[next], keys[j]);

            if let Some(slot) = open.get_mut(&reverse) {
                if let Some(other) = slot.take() {
                    if normal.dot(&other.normal) <= threshold_dot {
                        segments.push(other.start);
                        segments.push(other.end);
                    }
                }
            } else if !open.contains_key(&forward) {
                open.insert(forward, Some(OpenEdge { start: tri[j], end: tri[next], normal }));
                order.push(forward);
            }
        }
    }

    for key in order {
        if let Some(Some(edge)) = open.get(&key) {
            segments.push(edge.start);
            segments.push(edge.end);
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::{box_geometry, cylinder_geometry, sphere_geometry, Vertex};

    #[test]
    fn test_box_has_twelve_edges() {
        let segments = extract_edges(&box_geometry(1.0, 1.0, 1.0), 1.0);
        assert_eq!(segments.len() / 2, 12);
    }

    #[test]
    fn test_cylinder_edges() {
        // 32 vertical creases plus the two rims
        let segments = extract_edges(&cylinder_geometry(0.5, 0.5, 1.0, 32), 1.0);
        assert_eq!(segments.len() / 2, 96);
    }

    #[test]
    fn test_sphere_creases_exceed_threshold() {
        let segments = extract_edges(&sphere_geometry(0.7, 32, 16), 1.0);
        assert!(!segments.is_empty());
        assert_eq!(segments.len() % 2, 0);
    }

    #[test]
    fn test_high_threshold_keeps_only_boundaries() {
        let quad = GeometryData::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                Vertex::new([1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        // Shared diagonal is coplanar; the four sides are boundaries
        assert_eq!(extract_edges(&quad, 1.0).len() / 2, 4);
    }

    #[test]
    fn test_degenerate_triangles_are_skipped() {
        let data = GeometryData::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([0.00001, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            ],
            vec![0, 1, 2],
        );
        assert!(extract_edges(&data, 1.0).is_empty());
    }
}
