//! Scene graph nodes
//!
//! A deliberately small graph: groups own their children by value, drawables
//! hold `Rc` handles to shared resources. A primitive root is a [`Group`]
//! carrying a [`PrimitiveTag`]; its mesh points back at it through
//! [`Mesh::parent_root`] so a hit on the drawable resolves to the entity.

use std::rc::Rc;

use crate::assets::Resource;
use crate::foundation::math::{Transform, Vec3};
use crate::render::api::NativeHandle;
use crate::render::resources::{Color, Geometry, Material, OutlineGeometry};
use crate::scene::{EntityId, PrimitiveKind};

/// Identity carried by a primitive root group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveTag {
    /// Entity id
    pub id: EntityId,
    /// Shape kind
    pub kind: PrimitiveKind,
    /// Marks the group as an entity root
    pub is_primitive_root: bool,
}

/// Visible triangle mesh
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Pooled geometry
    pub geometry: Rc<Geometry>,
    /// Materials, one draw each
    pub materials: Vec<Rc<Material>>,
    /// Draw order within a frame
    pub render_order: i32,
    /// Entity this mesh belongs to
    pub parent_root: Option<EntityId>,
}

/// Outline drawable
#[derive(Debug, Clone)]
pub struct LineSegments {
    /// Pooled outline geometry
    pub geometry: Rc<OutlineGeometry>,
    /// Line material
    pub material: Rc<Material>,
    /// Draw order within a frame
    pub render_order: i32,
}

/// Scene lights
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Uniform fill light
    Ambient {
        /// Light color
        color: Color,
        /// Intensity
        intensity: f32,
    },
    /// Light from a point at infinity in the direction of `position`
    Directional {
        /// Light color
        color: Color,
        /// Intensity
        intensity: f32,
        /// Position the light shines from
        position: Vec3,
    },
}

/// Editor helper drawn on top of the scene, owned outside the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Helper {
    /// Helper name
    pub name: String,
    /// Line buffer
    pub geometry: NativeHandle,
    /// Line material
    pub material: NativeHandle,
    /// Segment count
    pub segments: u32,
    /// Drawn only when visible
    pub visible: bool,
}

/// Transform node with children
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Node name
    pub name: String,
    /// Local transform
    pub transform: Transform,
    /// Set on primitive roots
    pub tag: Option<PrimitiveTag>,
    /// Owned children
    pub children: Vec<Node>,
}

impl Group {
    /// Whether this group is the root of a primitive entity
    pub fn is_primitive_root(&self) -> bool {
        self.tag.as_ref().is_some_and(|tag| tag.is_primitive_root)
    }

    /// Entity id, if tagged
    pub fn entity_id(&self) -> Option<&EntityId> {
        self.tag.as_ref().map(|tag| &tag.id)
    }

    /// Primitive kind, if tagged
    pub fn kind(&self) -> Option<PrimitiveKind> {
        self.tag.as_ref().map(|tag| tag.kind)
    }

    /// First mesh among the direct children
    pub fn mesh(&self) -> Option<&Mesh> {
        self.children.iter().find_map(|child| match child {
            Node::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    /// First outline among the direct children
    pub fn outline(&self) -> Option<&LineSegments> {
        self.children.iter().find_map(|child| match child {
            Node::Lines(lines) => Some(lines),
            _ => None,
        })
    }

    /// Every face material in the subtree
    pub fn face_materials(&self) -> Vec<Rc<Material>> {
        let mut out = Vec::new();
        for child in &self.children {
            match child {
                Node::Mesh(mesh) => out.extend(mesh.materials.iter().cloned()),
                Node::Group(group) => out.extend(group.face_materials()),
                _ => {}
            }
        }
        out
    }

    /// Every outline material in the subtree
    pub fn outline_materials(&self) -> Vec<Rc<Material>> {
        let mut out = Vec::new();
        for child in &self.children {
            match child {
                Node::Lines(lines) => out.push(Rc::clone(&lines.material)),
                Node::Group(group) => out.extend(group.outline_materials()),
                _ => {}
            }
        }
        out
    }
}

/// Any node in the scene graph
#[derive(Debug, Clone)]
pub enum Node {
    /// Transform group
    Group(Group),
    /// Triangle mesh
    Mesh(Mesh),
    /// Outline
    Lines(LineSegments),
    /// Light
    Light(Light),
    /// Editor helper
    Helper(Helper),
}

impl Node {
    /// Root group, when this node is a primitive root
    pub fn as_primitive_root(&self) -> Option<&Group> {
        match self {
            Self::Group(group) if group.is_primitive_root() => Some(group),
            _ => None,
        }
    }

    /// Mutable root group, when this node is a primitive root
    pub fn as_primitive_root_mut(&mut self) -> Option<&mut Group> {
        match self {
            Self::Group(group) if group.is_primitive_root() => Some(group),
            _ => None,
        }
    }

    /// Every tracked resource reachable from this node
    ///
    /// Walks the whole drawable subtree, so a group owning several meshes
    /// yields all of their geometries and materials.
    pub fn owned_resources(&self) -> Vec<Resource> {
        let mut out = Vec::new();
        self.collect_resources(&mut out);
        out
    }

    fn collect_resources(&self, out: &mut Vec<Resource>) {
        match self {
            Self::Group(group) => {
                for child in &group.children {
                    child.collect_resources(out);
                }
            }
            Self::Mesh(mesh) => {
                out.push(Resource::Geometry(Rc::clone(&mesh.geometry)));
                out.extend(mesh.materials.iter().cloned().map(Resource::Material));
            }
            Self::Lines(lines) => {
                out.push(Resource::OutlineGeometry(Rc::clone(&lines.geometry)));
                out.push(Resource::Material(Rc::clone(&lines.material)));
            }
            Self::Light(_) | Self::Helper(_) => {}
        }
    }
}

/// Root container of the scene graph
#[derive(Debug, Clone, Default)]
pub struct Scene {
    children: Vec<Node>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child
    pub fn add(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Children in insertion order
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Children, mutably
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    /// Detach and return the child at `index`
    pub fn remove_at(&mut self, index: usize) -> Option<Node> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Index of the first child matching `predicate`
    pub fn position(&self, predicate: impl Fn(&Node) -> bool) -> Option<usize> {
        self.children.iter().position(predicate)
    }

    /// Index of the primitive root with `id`
    pub fn position_of(&self, id: &EntityId) -> Option<usize> {
        self.position(|node| node.as_primitive_root().and_then(Group::entity_id) == Some(id))
    }

    /// Primitive roots in insertion order
    pub fn primitive_roots(&self) -> impl Iterator<Item = &Group> {
        self.children.iter().filter_map(Node::as_primitive_root)
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the scene has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(id: &str) -> Node {
        Node::Group(Group {
            name: id.to_string(),
            tag: Some(PrimitiveTag {
                id: EntityId::new(id),
                kind: PrimitiveKind::Box,
                is_primitive_root: true,
            }),
            ..Group::default()
        })
    }

    #[test]
    fn test_position_of_ignores_untagged() {
        let mut scene = Scene::new();
        scene.add(Node::Light(Light::Ambient { color: Color::WHITE, intensity: 1.0 }));
        scene.add(Node::Group(Group::default()));
        scene.add(root("a"));

        assert_eq!(scene.position_of(&EntityId::new("a")), Some(2));
        assert_eq!(scene.position_of(&EntityId::new("b")), None);
        assert_eq!(scene.primitive_roots().count(), 1);
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut scene = Scene::new();
        assert!(scene.remove_at(0).is_none());
        scene.add(root("a"));
        assert!(scene.remove_at(0).is_some());
        assert!(scene.is_empty());
    }
}
