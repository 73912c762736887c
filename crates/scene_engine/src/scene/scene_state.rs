//! Serializable scene snapshot
//!
//! Only identity, kind and transform are stored. Geometry and materials are
//! rebuilt from the kind on load.
//!
//! ```json
//! { "objects": [ { "uuid": "<entity id>", "type": "Box",
//!                  "position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1] } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::math::Transform;
use crate::scene::{EntityId, PrimitiveKind};

/// One saved entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    /// Entity id
    #[serde(rename = "uuid")]
    pub id: EntityId,
    /// Shape kind
    #[serde(rename = "type")]
    pub kind: PrimitiveKind,
    /// Position
    pub position: [f32; 3],
    /// Euler rotation in radians, XYZ order
    pub rotation: [f32; 3],
    /// Scale
    pub scale: [f32; 3],
}

impl ObjectState {
    /// Capture an entity
    pub fn new(id: EntityId, kind: PrimitiveKind, transform: &Transform) -> Self {
        let (position, rotation, scale) = transform.to_arrays();
        Self { id, kind, position, rotation, scale }
    }

    /// Saved transform
    pub fn transform(&self) -> Transform {
        Transform::from_arrays(self.position, self.rotation, self.scale)
    }
}

/// Ordered list of saved entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    /// Entities in scene order
    #[serde(default)]
    pub objects: Vec<ObjectState>,
}

impl SceneState {
    /// Number of saved entities
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no entities are saved
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Saved entity with `id`
    pub fn get(&self, id: &EntityId) -> Option<&ObjectState> {
        self.objects.iter().find(|object| &object.id == id)
    }
}

impl Config for SceneState {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_wire_field_names() {
        let state = SceneState {
            objects: vec![ObjectState::new(
                EntityId::new("a"),
                PrimitiveKind::Cylinder,
                &Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            )],
        };
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        let object = &json["objects"][0];
        assert_eq!(object["uuid"], "a");
        assert_eq!(object["type"], "Cylinder");
        assert_eq!(object["position"][2], 3.0);
        assert_eq!(object["scale"][0], 1.0);
    }

    #[test]
    fn test_unknown_type_loads_as_box() {
        let json = r#"{"objects":[{"uuid":"x","type":"Torus","position":[0,0,0],"rotation":[0,0,0],"scale":[1,1,1]}]}"#;
        let state: SceneState = serde_json::from_str(json).unwrap();
        assert_eq!(state.objects[0].kind, PrimitiveKind::Box);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("scene-state-{}", uuid::Uuid::new_v4()));
        let path = dir.join("scene.json");
        let state = SceneState {
            objects: vec![ObjectState::new(EntityId::new("b"), PrimitiveKind::Sphere, &Transform::identity())],
        };

        state.save_to_file(&path).unwrap();
        let loaded = SceneState::load_from_file(&path).unwrap();
        assert_eq!(loaded, state);
        std::fs::remove_dir_all(dir).ok();
    }
}
