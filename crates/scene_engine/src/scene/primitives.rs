//! Primitive Factory - builds renderable entities from pooled resources
//!
//! Each entity is a tagged [`Group`] holding:
//!
//! - a [`Mesh`] over the pooled geometry for its kind and a face material of
//!   its own
//! - a [`LineSegments`] over the pooled outline for its kind and a line
//!   material of its own
//!
//! Pooled geometry is borrowed: the pool acquires it for the entity. The two
//! materials are exclusive and are acquired here with a count of one, so
//! disposal releases every resource of the entity through the tracker's
//! counted path. When a face map image is set, each face material gets its
//! own texture uploaded from it, freed together with the material.

use std::rc::Rc;

use crate::assets::{Resource, ResourceContext};
use crate::core::SceneConfig;
use crate::foundation::math::{Transform, Vec3};
use crate::render::resources::{Color, Material, Texture, TextureSlot};
use crate::scene::node::{Group, LineSegments, Mesh, Node, PrimitiveTag};
use crate::scene::{EntityId, PrimitiveKind};

/// Render order of outlines, drawn after faces
const OUTLINE_RENDER_ORDER: i32 = 1;

/// Colors and lighting applied to new entities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveStyle {
    /// Face base color
    pub face_color: Color,
    /// Outline color
    pub edge_color: Color,
    /// Outline color while hovered
    pub edge_hover_color: Color,
    /// Light position fed to face materials
    pub light_position: Vec3,
}

impl PrimitiveStyle {
    /// Derive the style from scene configuration
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            face_color: Color::from_hex(config.face_color),
            edge_color: Color::from_hex(config.edge_color),
            edge_hover_color: Color::from_hex(config.edge_hover_color),
            light_position: Vec3::from(config.light_position),
        }
    }
}

impl Default for PrimitiveStyle {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

/// Builds primitive entities
#[derive(Debug, Clone, Default)]
pub struct PrimitiveFactory {
    style: PrimitiveStyle,
    /// Decoded face map, uploaded once per entity
    face_map: Option<Rc<image::RgbaImage>>,
}

impl PrimitiveFactory {
    /// Create a factory with the given style
    pub fn new(style: PrimitiveStyle) -> Self {
        Self { style, face_map: None }
    }

    /// Texture every new face material with `image`
    pub fn with_face_map(mut self, image: image::RgbaImage) -> Self {
        self.face_map = Some(Rc::new(image));
        self
    }

    /// Whether new entities get a face map
    pub fn has_face_map(&self) -> bool {
        self.face_map.is_some()
    }

    /// Styling applied to new entities
    pub fn style(&self) -> &PrimitiveStyle {
        &self.style
    }

    /// Build an entity of `kind`
    ///
    /// Without an `id` a fresh UUID is generated.
    pub fn create(&self, resources: &mut ResourceContext, kind: PrimitiveKind, id: Option<EntityId>) -> Group {
        let id = id.unwrap_or_else(EntityId::generate);

        let geometry = resources.geometry(kind, || kind.geometry_data());
        let outline_geometry = resources.edge_geometry(kind, &geometry);

        let face = Material::face(resources.backend_mut(), self.style.face_color, self.style.light_position);
        if let Some(image) = &self.face_map {
            let map = Texture::from_image(resources.backend_mut(), image);
            face.set_texture(resources.backend_mut(), TextureSlot::Map, Some(map));
        }
        resources.acquire(Some(&Resource::Material(Rc::clone(&face))));
        let line = Material::line_basic(resources.backend_mut(), self.style.edge_color);
        resources.acquire(Some(&Resource::Material(Rc::clone(&line))));

        let mesh = Mesh {
            geometry,
            materials: vec![face],
            render_order: 0,
            parent_root: Some(id.clone()),
        };
        let outline = LineSegments {
            geometry: outline_geometry,
            material: line,
            render_order: OUTLINE_RENDER_ORDER,
        };

        log::debug!("Created {} entity {}", kind, id);
        Group {
            name: format!("{kind}-{id}"),
            transform: Transform::identity(),
            tag: Some(PrimitiveTag {
                id,
                kind,
                is_primitive_root: true,
            }),
            children: vec![Node::Mesh(mesh), Node::Lines(outline)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    fn context() -> ResourceContext {
        ResourceContext::new(Box::new(HeadlessBackend::new()), 1.0)
    }

    #[test]
    fn test_entity_structure() {
        let mut resources = context();
        let factory = PrimitiveFactory::default();
        let group = factory.create(&mut resources, PrimitiveKind::Sphere, Some(EntityId::new("s1")));

        assert!(group.is_primitive_root());
        assert_eq!(group.kind(), Some(PrimitiveKind::Sphere));
        let mesh = group.mesh().unwrap();
        assert_eq!(mesh.parent_root, Some(EntityId::new("s1")));
        assert_eq!(group.outline().unwrap().render_order, OUTLINE_RENDER_ORDER);
        assert_eq!(mesh.materials[0].color(), factory.style().face_color);
    }

    #[test]
    fn test_entities_share_pooled_geometry() {
        let mut resources = context();
        let factory = PrimitiveFactory::default();
        let a = factory.create(&mut resources, PrimitiveKind::Box, None);
        let b = factory.create(&mut resources, PrimitiveKind::Box, None);

        assert_ne!(a.entity_id(), b.entity_id());
        let (ma, mb) = (a.mesh().unwrap(), b.mesh().unwrap());
        assert!(Rc::ptr_eq(&ma.geometry, &mb.geometry));
        assert!(!Rc::ptr_eq(&ma.materials[0], &mb.materials[0]));

        // Baseline plus one per entity
        assert_eq!(resources.tracker().ref_count(ma.geometry.id()), 3);
        assert_eq!(resources.tracker().ref_count(ma.materials[0].id()), 1);
        assert_eq!(resources.info().memory.geometries, 2);
        assert_eq!(resources.info().programs, 2);
    }

    #[test]
    fn test_face_map_is_owned_per_entity() {
        let mut resources = context();
        let factory = PrimitiveFactory::default().with_face_map(image::RgbaImage::new(4, 4));
        let a = factory.create(&mut resources, PrimitiveKind::Box, None);
        let b = factory.create(&mut resources, PrimitiveKind::Box, None);
        assert_eq!(resources.info().memory.textures, 2);

        let map_a = a.mesh().unwrap().materials[0].textures();
        let map_b = b.mesh().unwrap().materials[0].textures();
        assert_eq!(map_a.len(), 1);
        assert_ne!(map_a[0].id(), map_b[0].id());

        for group in [a, b] {
            for resource in Node::Group(group).owned_resources() {
                resources.release(Some(&resource));
            }
        }
        let info = resources.info();
        assert_eq!(info.memory.textures, 0);
        assert_eq!(info.invalid_releases, 0);
        assert_eq!(resources.tracker().stats().untracked_releases, 0);
    }

    #[test]
    fn test_face_material_receives_light_position() {
        let mut resources = context();
        let style = PrimitiveStyle {
            light_position: Vec3::new(1.0, 2.0, 3.0),
            ..PrimitiveStyle::default()
        };
        let group = PrimitiveFactory::new(style).create(&mut resources, PrimitiveKind::Cylinder, None);
        let material = &group.mesh().unwrap().materials[0];
        let params = material.params();
        match params.uniforms.get(crate::render::resources::material::U_LIGHT_POSITION) {
            Some(crate::render::resources::UniformValue::Vec3(p)) => assert_eq!(*p, Vec3::new(1.0, 2.0, 3.0)),
            other => panic!("unexpected uniform {other:?}"),
        }
    }
}
