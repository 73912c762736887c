//! Transform gizmo singleton
//!
//! The gizmo draws three axis lines at the selected entity and turns drag
//! input into transform updates. Its line buffer and material are allocated
//! straight from the backend, outside the pool and the tracker: there is one
//! gizmo with one owner, and [`crate::scene::disposal::dispose_gizmo`] frees
//! both handles.

use crate::render::api::{NativeHandle, ProgramKey, RenderBackend};
use crate::scene::node::{Helper, Node};
use crate::scene::{EntityId, Scene};

/// Name of the helper node the gizmo adds to the scene
pub const GIZMO_HELPER_NAME: &str = "transform-gizmo";

/// Which transform component the gizmo edits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GizmoMode {
    /// Move
    #[default]
    Translate,
    /// Rotate
    Rotate,
    /// Scale
    Scale,
}

/// Interactive transform handle
#[derive(Debug)]
pub struct TransformGizmo {
    geometry: NativeHandle,
    material: NativeHandle,
    attached: Option<EntityId>,
    mode: GizmoMode,
}

impl TransformGizmo {
    /// Allocate the gizmo and add its helper to `scene`, hidden
    pub fn new(backend: &mut dyn RenderBackend, scene: &mut Scene) -> Self {
        let axes = [
            [0.0, 0.0, 0.0], [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0], [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0], [0.0, 0.0, 1.0],
        ];
        let geometry = backend.create_line_geometry(&axes);
        let material = backend.create_material(ProgramKey::LineBasic);

        scene.add(Node::Helper(Helper {
            name: GIZMO_HELPER_NAME.to_string(),
            geometry,
            material,
            segments: (axes.len() / 2) as u32,
            visible: false,
        }));

        Self {
            geometry,
            material,
            attached: None,
            mode: GizmoMode::default(),
        }
    }

    /// Attach to an entity and show the helper
    pub fn attach(&mut self, scene: &mut Scene, id: EntityId) {
        log::debug!("Gizmo attached to {}", id);
        self.attached = Some(id);
        Self::set_visible(scene, true);
    }

    /// Detach and hide the helper
    pub fn detach(&mut self, scene: &mut Scene) {
        if self.attached.take().is_some() {
            Self::set_visible(scene, false);
        }
    }

    /// Entity the gizmo is attached to
    pub fn attached(&self) -> Option<&EntityId> {
        self.attached.as_ref()
    }

    /// Current mode
    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Change mode
    pub fn set_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
    }

    /// Native handles owned by the gizmo
    pub(crate) fn handles(&self) -> [NativeHandle; 2] {
        [self.geometry, self.material]
    }

    fn set_visible(scene: &mut Scene, visible: bool) {
        for node in scene.children_mut() {
            if let Node::Helper(helper) = node {
                if helper.name == GIZMO_HELPER_NAME {
                    helper.visible = visible;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    fn helper_visible(scene: &Scene) -> Option<bool> {
        scene.children().iter().find_map(|node| match node {
            Node::Helper(helper) => Some(helper.visible),
            _ => None,
        })
    }

    #[test]
    fn test_attach_and_detach_toggle_helper() {
        let mut backend = HeadlessBackend::new();
        let mut scene = Scene::new();
        let mut gizmo = TransformGizmo::new(&mut backend, &mut scene);
        assert_eq!(helper_visible(&scene), Some(false));

        gizmo.attach(&mut scene, EntityId::new("a"));
        assert_eq!(gizmo.attached(), Some(&EntityId::new("a")));
        assert_eq!(helper_visible(&scene), Some(true));

        gizmo.detach(&mut scene);
        assert!(gizmo.attached().is_none());
        assert_eq!(helper_visible(&scene), Some(false));
    }

    #[test]
    fn test_allocations_are_outside_the_tracker() {
        let mut backend = HeadlessBackend::new();
        let mut scene = Scene::new();
        let gizmo = TransformGizmo::new(&mut backend, &mut scene);
        let info = backend.info();
        assert_eq!(info.memory.geometries, 1);
        assert_eq!(info.programs, 1);
        assert!(gizmo.handles().iter().all(|h| backend.is_live(*h)));
        assert_eq!(gizmo.mode(), GizmoMode::Translate);
    }
}
