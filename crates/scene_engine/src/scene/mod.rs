//! Scene management
//!
//! Entities, the scene graph, the factory that builds entities from pooled
//! resources, their disposal, persistence, and the transform gizmo.

pub mod disposal;
pub mod entity;
pub mod gizmo;
pub mod node;
pub mod primitives;
pub mod scene_manager;
pub mod scene_state;

pub use entity::{EntityId, PrimitiveKind};
pub use gizmo::{GizmoMode, TransformGizmo};
pub use node::{Group, Helper, Light, LineSegments, Mesh, Node, PrimitiveTag, Scene};
pub use primitives::{PrimitiveFactory, PrimitiveStyle};
pub use scene_manager::{ClearSummary, SceneManager};
pub use scene_state::{ObjectState, SceneState};
