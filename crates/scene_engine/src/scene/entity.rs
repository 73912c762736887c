//! Entity identity and primitive kinds

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::render::primitives::{box_geometry, cylinder_geometry, sphere_geometry, GeometryData};

/// Stable identifier of a scene entity
///
/// Generated ids are UUID v4 strings; ids read from a saved scene are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Allocate a fresh, session-unique id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Shapes the editor can place
///
/// Serialized by name. Unknown names fall back to [`PrimitiveKind::Box`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrimitiveKind {
    /// Unit cube
    #[default]
    Box,
    /// Sphere of radius 0.7
    Sphere,
    /// Cylinder of radius 0.5 and height 1
    Cylinder,
}

impl PrimitiveKind {
    /// Every kind, in toolbar order
    pub const ALL: [Self; 3] = [Self::Box, Self::Sphere, Self::Cylinder];

    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Sphere => "Sphere",
            Self::Cylinder => "Cylinder",
        }
    }

    /// Parse a name, falling back to `Box` for anything unknown
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                log::warn!("Unknown primitive kind '{}', using Box", name);
                Self::Box
            })
    }

    /// Vertex data for this kind
    pub fn geometry_data(self) -> GeometryData {
        match self {
            Self::Box => box_geometry(1.0, 1.0, 1.0),
            Self::Sphere => sphere_geometry(0.7, 32, 16),
            Self::Cylinder => cylinder_geometry(0.5, 0.5, 1.0, 32),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PrimitiveKind {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<PrimitiveKind> for String {
    fn from(value: PrimitiveKind) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(PrimitiveKind::from_name("Sphere"), PrimitiveKind::Sphere);
        assert_eq!(PrimitiveKind::from_name("cylinder"), PrimitiveKind::Cylinder);
        assert_eq!(PrimitiveKind::from_name("Torus"), PrimitiveKind::Box);
    }

    #[test]
    fn test_kind_serde_falls_back() {
        let kind: PrimitiveKind = serde_json::from_str("\"Cone\"").unwrap();
        assert_eq!(kind, PrimitiveKind::Box);
        assert_eq!(serde_json::to_string(&PrimitiveKind::Sphere).unwrap(), "\"Sphere\"");
    }

    #[test]
    fn test_entity_id_is_transparent() {
        let id = EntityId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
