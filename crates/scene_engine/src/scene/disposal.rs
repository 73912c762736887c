//! Disposal - teardown of entities, whole scenes and engine singletons
//!
//! Pooled and per-entity resources are never freed here directly: every one
//! is routed through [`ResourceContext::release`], which frees the native
//! handle only when its count reaches zero.
//!
//! Scene-wide loops re-read the live head of the child list on every
//! iteration instead of walking a snapshot, so they stay correct however
//! the list changes underneath them.
//!
//! The renderer and the transform gizmo are process-scoped singletons with a
//! single owner. They are torn down without reference counting.

use crate::assets::ResourceContext;
use crate::render::api::RenderBackend;
use crate::render::renderer::{HostSurface, Renderer};
use crate::scene::gizmo::{TransformGizmo, GIZMO_HELPER_NAME};
use crate::scene::node::{Node, Scene};
use crate::scene::EntityId;

/// Release every resource reachable from `node`
pub fn dispose_node(resources: &mut ResourceContext, node: &Node) {
    for resource in node.owned_resources() {
        resources.release(Some(&resource));
    }
}

/// Dispose the child at `index` and detach it from the scene
pub fn dispose_child_at(resources: &mut ResourceContext, scene: &mut Scene, index: usize) -> Option<Node> {
    let node = scene.children().get(index)?;
    dispose_node(resources, node);
    scene.remove_at(index)
}

/// Dispose the primitive root with `id`; returns whether one was found
pub fn dispose_entity(resources: &mut ResourceContext, scene: &mut Scene, id: &EntityId) -> bool {
    match scene.position_of(id) {
        Some(index) => {
            dispose_child_at(resources, scene, index);
            log::debug!("Disposed entity {}", id);
            true
        }
        None => false,
    }
}

/// Dispose every primitive root, leaving lights and helpers in place
pub fn dispose_primitive_roots(resources: &mut ResourceContext, scene: &mut Scene) -> usize {
    let mut disposed = 0;
    while let Some(index) = scene.position(|node| node.as_primitive_root().is_some()) {
        dispose_child_at(resources, scene, index);
        disposed += 1;
    }
    disposed
}

/// Dispose every child of the scene, first child first
pub fn dispose_scene_entities(resources: &mut ResourceContext, scene: &mut Scene) -> usize {
    let mut disposed = 0;
    while dispose_child_at(resources, scene, 0).is_some() {
        disposed += 1;
    }
    disposed
}

/// Tear down the renderer singleton
///
/// Drops the backend's render lists, forces the graphics context to release
/// driver state and detaches the output surface from its host.
pub fn dispose_renderer(renderer: Renderer, backend: &mut dyn RenderBackend, host: &mut HostSurface) {
    backend.dispose();
    backend.lose_context();
    if !host.remove(&renderer.surface().element) {
        log::warn!("Renderer surface {} was not attached", renderer.surface().element);
    }
    log::info!("Renderer disposed");
}

/// Tear down the transform gizmo singleton
///
/// Detaches it, removes its helper from the scene and frees its handles.
pub fn dispose_gizmo(mut gizmo: TransformGizmo, scene: &mut Scene, backend: &mut dyn RenderBackend) {
    gizmo.detach(scene);
    while let Some(index) =
        scene.position(|node| matches!(node, Node::Helper(helper) if helper.name == GIZMO_HELPER_NAME))
    {
        scene.remove_at(index);
    }
    for handle in gizmo.handles() {
        backend.release(handle);
    }
    log::info!("Transform gizmo disposed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RendererConfig;
    use crate::render::backends::HeadlessBackend;
    use crate::render::resources::Color;
    use crate::scene::node::{Group, Light};
    use crate::scene::{PrimitiveFactory, PrimitiveKind};

    fn setup(count: usize) -> (ResourceContext, Scene, Vec<EntityId>) {
        let mut resources = ResourceContext::new(Box::new(HeadlessBackend::new()), 1.0);
        let mut scene = Scene::new();
        scene.add(Node::Light(Light::Ambient { color: Color::WHITE, intensity: 2.0 }));
        let factory = PrimitiveFactory::default();
        let mut ids = Vec::new();
        for _ in 0..count {
            let group = factory.create(&mut resources, PrimitiveKind::Box, None);
            ids.extend(group.entity_id().cloned());
            scene.add(Node::Group(group));
        }
        (resources, scene, ids)
    }

    #[test]
    fn test_dispose_entity_releases_everything_it_owns() {
        let (mut resources, mut scene, ids) = setup(2);
        assert!(dispose_entity(&mut resources, &mut scene, &ids[0]));

        let info = resources.info();
        // Shared geometry stays alive for the remaining entity
        assert_eq!(info.memory.geometries, 2);
        assert_eq!(resources.tracker().stats().untracked_releases, 0);
        assert_eq!(scene.primitive_roots().count(), 1);
        assert!(!dispose_entity(&mut resources, &mut scene, &ids[0]));
    }

    #[test]
    fn test_nested_drawables_are_released() {
        let (mut resources, mut scene, _) = setup(0);
        let factory = PrimitiveFactory::default();
        let inner = factory.create(&mut resources, PrimitiveKind::Sphere, None);
        let mut outer = factory.create(&mut resources, PrimitiveKind::Sphere, None);
        let outer_id = outer.entity_id().cloned().unwrap();
        outer.children.push(Node::Group(Group { tag: None, ..inner }));
        scene.add(Node::Group(outer));

        dispose_entity(&mut resources, &mut scene, &outer_id);
        resources.purge();
        assert_eq!(resources.info().memory.geometries, 0);
        assert_eq!(resources.info().programs, 0);
        assert_eq!(resources.tracker().tracked_len(), 0);
    }

    #[test]
    fn test_foreign_material_falls_back_to_immediate_disposal() {
        let (mut resources, mut scene, ids) = setup(1);
        let foreign = crate::render::resources::Material::face(
            resources.backend_mut(),
            Color::WHITE,
            crate::foundation::math::Vec3::zeros(),
        );
        if let Some(Node::Group(group)) = scene.children_mut().last_mut() {
            if let Some(Node::Mesh(mesh)) = group.children.first_mut() {
                mesh.materials.push(foreign);
            }
        }

        dispose_entity(&mut resources, &mut scene, &ids[0]);
        let stats = resources.tracker().stats();
        assert_eq!(stats.untracked_releases, 1);
        assert_eq!(resources.info().invalid_releases, 0);
        assert_eq!(resources.info().programs, 0);
    }

    #[test]
    fn test_dispose_primitive_roots_keeps_lights() {
        let (mut resources, mut scene, _) = setup(3);
        assert_eq!(dispose_primitive_roots(&mut resources, &mut scene), 3);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_dispose_scene_entities_empties_scene() {
        let (mut resources, mut scene, _) = setup(3);
        assert_eq!(dispose_scene_entities(&mut resources, &mut scene), 4);
        assert!(scene.is_empty());
        resources.purge();
        assert_eq!(resources.info().memory.geometries, 0);
        assert_eq!(resources.info().invalid_releases, 0);
    }

    #[test]
    fn test_dispose_renderer_detaches_and_loses_context() {
        let mut backend = HeadlessBackend::new();
        let mut host = HostSurface::new();
        let renderer = Renderer::new(&RendererConfig::default(), &mut host);

        dispose_renderer(renderer, &mut backend, &mut host);
        assert!(host.elements().is_empty());
        assert!(backend.is_context_lost());
        assert!(backend.is_disposed());
    }

    #[test]
    fn test_dispose_gizmo_frees_handles_and_helper() {
        let mut backend = HeadlessBackend::new();
        let mut scene = Scene::new();
        let mut gizmo = TransformGizmo::new(&mut backend, &mut scene);
        gizmo.attach(&mut scene, EntityId::new("a"));

        dispose_gizmo(gizmo, &mut scene, &mut backend);
        assert!(scene.is_empty());
        assert_eq!(backend.live_allocations(), 0);
        assert_eq!(backend.info().invalid_releases, 0);
    }
}
