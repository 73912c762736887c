//! Geometry primitives
//!
//! Vertex layout, generators for the built-in shapes and outline extraction.

pub mod edges;
pub mod mesh;

pub use edges::extract_edges;
pub use mesh::{box_geometry, cylinder_geometry, sphere_geometry, GeometryData, Vertex};
