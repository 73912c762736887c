//! Scene Manager - owns the live entities and drives their lifecycle
//!
//! Creation goes through [`PrimitiveFactory`], removal through
//! [`disposal`](crate::scene::disposal). The manager also keeps the
//! interactable index, the ordered list of entities whose meshes take part
//! in hit testing, in step with the scene.
//!
//! **Teardown order**: `clear` disposes every primitive root first and purges
//! the pool afterwards. The pool baseline is the last reference to go, so a
//! shared geometry is never freed while an entity still draws it.
//!
//! Missing ids are no-ops everywhere; nothing here returns an error.

use crate::assets::{PurgeReport, ResourceContext};
use crate::core::SceneConfig;
use crate::foundation::math::{Transform, Vec3};
use crate::render::api::{RenderBackend, RendererInfo};
use crate::render::resources::Color;
use crate::scene::disposal;
use crate::scene::node::{Group, Light, Mesh, Node, Scene};
use crate::scene::primitives::{PrimitiveFactory, PrimitiveStyle};
use crate::scene::scene_state::{ObjectState, SceneState};
use crate::scene::{EntityId, PrimitiveKind};

/// Result of [`SceneManager::clear`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearSummary {
    /// Entities disposed
    pub disposed: usize,
    /// Pool purge outcome
    pub purge: PurgeReport<PrimitiveKind>,
}

/// Live scene plus the resources backing it
#[derive(Debug)]
pub struct SceneManager {
    scene: Scene,
    resources: ResourceContext,
    factory: PrimitiveFactory,
    /// Entities taking part in hit testing, in insertion order
    interactables: Vec<EntityId>,
}

impl SceneManager {
    /// Create a scene with its lights, drawing through `backend`
    pub fn new(config: &SceneConfig, backend: Box<dyn RenderBackend>) -> Self {
        let mut scene = Scene::new();
        scene.add(Node::Light(Light::Ambient {
            color: Color::from_hex(config.ambient_color),
            intensity: config.ambient_intensity,
        }));
        scene.add(Node::Light(Light::Directional {
            color: Color::WHITE,
            intensity: config.directional_intensity,
            position: Vec3::from(config.light_position),
        }));

        Self {
            scene,
            resources: ResourceContext::new(backend, config.outline_threshold_deg),
            factory: PrimitiveFactory::new(PrimitiveStyle::from_config(config)),
            interactables: Vec::new(),
        }
    }

    /// Add a new entity of `kind` at the origin
    pub fn add_primitive(&mut self, kind: PrimitiveKind) -> EntityId {
        let group = self.factory.create(&mut self.resources, kind, None);
        self.insert(group)
    }

    /// Remove the entity with `id`; returns whether it existed
    pub fn remove_object(&mut self, id: &EntityId) -> bool {
        if !disposal::dispose_entity(&mut self.resources, &mut self.scene, id) {
            log::trace!("remove_object: {} not found", id);
            return false;
        }
        self.interactables.retain(|entry| entry != id);
        log::info!("Removed entity {}", id);
        true
    }

    /// Dispose every entity, then drop the pool's baseline references
    pub fn clear(&mut self) -> ClearSummary {
        let disposed = disposal::dispose_primitive_roots(&mut self.resources, &mut self.scene);
        let purge = self.resources.purge();
        self.interactables.clear();
        if disposed > 0 || purge.released > 0 {
            log::info!("Cleared scene: {} entities, {} pooled resources", disposed, purge.released);
        }
        ClearSummary { disposed, purge }
    }

    /// Replace the scene with `state`
    ///
    /// Saved ids are reused. An id that appears twice is loaded once.
    pub fn load_state(&mut self, state: &SceneState) {
        self.clear();
        for object in &state.objects {
            if self.contains(&object.id) {
                log::warn!("Skipping duplicate entity {} in saved scene", object.id);
                continue;
            }
            let mut group = self.factory.create(&mut self.resources, object.kind, Some(object.id.clone()));
            group.transform = object.transform();
            self.insert(group);
        }
        log::info!("Loaded scene with {} entities", self.len());
    }

    /// Snapshot ids, kinds and transforms of the live entities
    pub fn export_state(&self) -> SceneState {
        let objects = self
            .scene
            .primitive_roots()
            .filter_map(|group| {
                let tag = group.tag.as_ref()?;
                Some(ObjectState::new(tag.id.clone(), tag.kind, &group.transform))
            })
            .collect();
        SceneState { objects }
    }

    /// Entity root with `id`
    pub fn find_object(&self, id: &EntityId) -> Option<&Group> {
        let index = self.scene.position_of(id)?;
        self.scene.children()[index].as_primitive_root()
    }

    /// Mutable entity root with `id`
    pub fn find_object_mut(&mut self, id: &EntityId) -> Option<&mut Group> {
        let index = self.scene.position_of(id)?;
        self.scene.children_mut()[index].as_primitive_root_mut()
    }

    /// Whether an entity with `id` exists
    pub fn contains(&self, id: &EntityId) -> bool {
        self.scene.position_of(id).is_some()
    }

    /// Ids of the live entities in scene order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.scene.primitive_roots().filter_map(Group::entity_id).cloned().collect()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.scene.primitive_roots().count()
    }

    /// Whether there are no live entities
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Meshes eligible for hit testing, in insertion order
    pub fn interactable_meshes(&self) -> Vec<&Mesh> {
        self.interactables
            .iter()
            .filter_map(|id| self.find_object(id))
            .filter_map(Group::mesh)
            .collect()
    }

    /// Entity a hit mesh belongs to
    pub fn resolve_root(&self, mesh: &Mesh) -> Option<&Group> {
        self.find_object(mesh.parent_root.as_ref()?)
    }

    /// Replace an entity's transform; returns whether it existed
    pub fn set_transform(&mut self, id: &EntityId, transform: Transform) -> bool {
        match self.find_object_mut(id) {
            Some(group) => {
                group.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Toggle hover styling: face highlight plus outline hover color
    pub fn set_hovered(&mut self, id: &EntityId, hovered: bool) {
        let style = *self.factory.style();
        let Some(group) = self.find_object(id) else {
            return;
        };
        for material in group.face_materials() {
            material.set_hovered(hovered);
        }
        let edge = if hovered { style.edge_hover_color } else { style.edge_color };
        for material in group.outline_materials() {
            material.set_color(edge);
        }
    }

    /// Toggle selection styling
    pub fn set_selected(&mut self, id: &EntityId, selected: bool) {
        if let Some(group) = self.find_object(id) {
            for material in group.face_materials() {
                material.set_selected(selected);
            }
        }
    }

    /// Dispose every child of the scene, lights and helpers included, then purge
    pub fn dispose(&mut self) -> ClearSummary {
        let disposed = disposal::dispose_scene_entities(&mut self.resources, &mut self.scene);
        let purge = self.resources.purge();
        self.interactables.clear();
        log::info!("Scene disposed ({} nodes)", disposed);
        ClearSummary { disposed, purge }
    }

    /// The scene graph
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene graph, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Backend, tracker and pool
    pub fn resources(&self) -> &ResourceContext {
        &self.resources
    }

    /// Backend, tracker and pool, mutably
    pub fn resources_mut(&mut self) -> &mut ResourceContext {
        &mut self.resources
    }

    /// Scene and backend borrowed together
    pub fn parts_mut(&mut self) -> (&mut Scene, &mut dyn RenderBackend) {
        (&mut self.scene, self.resources.backend_mut())
    }

    /// Backend counters
    pub fn info(&self) -> RendererInfo {
        self.resources.info()
    }

    /// Texture the face of every entity added from now on with `image`
    pub fn set_face_map(&mut self, image: image::RgbaImage) {
        self.factory = std::mem::take(&mut self.factory).with_face_map(image);
        log::info!("Face map enabled for new entities");
    }

    fn insert(&mut self, group: Group) -> EntityId {
        let id = group
            .entity_id()
            .cloned()
            .unwrap_or_else(EntityId::generate);
        self.scene.add(Node::Group(group));
        self.interactables.push(id.clone());
        log::info!("Added entity {}", id);
        id
    }
}
