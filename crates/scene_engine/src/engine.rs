//! Engine facade
//!
//! Wires the renderer, the scene manager (with its resource context) and the
//! transform gizmo together and exposes the operations the application
//! drives: editing, selection, persistence, frame ticks and teardown.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::core::EditorConfig;
use crate::foundation::math::Transform;
use crate::render::api::{RenderBackend, RendererInfo};
use crate::render::backends::HeadlessBackend;
use crate::render::renderer::{HostSurface, Renderer};
use crate::render::resources::Texture;
use crate::scene::disposal;
use crate::scene::{ClearSummary, EntityId, PrimitiveKind, SceneManager, SceneState, TransformGizmo};

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scene file could not be read or written
    #[error("Scene file {path}: {source}")]
    SceneFile {
        /// File involved
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: ConfigError,
    },

    /// The configured face map could not be decoded
    #[error("Face map {path}: {source}")]
    FaceMap {
        /// Image file
        path: PathBuf,
        /// Decoder failure
        #[source]
        source: image::ImageError,
    },
}

/// What is left after [`Engine::dispose`]
#[derive(Debug, Clone, PartialEq)]
pub struct Shutdown {
    /// The host, with the renderer's surface detached
    pub host: HostSurface,
    /// Backend counters after teardown
    pub final_info: RendererInfo,
    /// Resources the tracker still held
    pub still_tracked: usize,
}

/// Editor engine
#[derive(Debug)]
pub struct Engine {
    config: EditorConfig,
    renderer: Renderer,
    scene_manager: SceneManager,
    gizmo: TransformGizmo,
    host: HostSurface,
    selected: Option<EntityId>,
    hovered: Option<EntityId>,
    /// Last exported snapshot, refreshed after every edit
    state: SceneState,
}

impl Engine {
    /// Create the engine over `backend`, attaching the output surface to `host`
    pub fn new(config: EditorConfig, backend: Box<dyn RenderBackend>, mut host: HostSurface) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine...");

        let face_map = match &config.scene.face_map {
            Some(path) => Some(Texture::decode(path).map_err(|source| EngineError::FaceMap {
                path: PathBuf::from(path),
                source,
            })?),
            None => None,
        };

        let renderer = Renderer::new(&config.renderer, &mut host);
        let mut scene_manager = SceneManager::new(&config.scene, backend);
        if let Some(image) = face_map {
            scene_manager.set_face_map(image);
        }
        let (scene, backend) = scene_manager.parts_mut();
        let gizmo = TransformGizmo::new(backend, scene);

        Ok(Self {
            config,
            renderer,
            scene_manager,
            gizmo,
            host,
            selected: None,
            hovered: None,
            state: SceneState::default(),
        })
    }

    /// Create the engine over a fresh [`HeadlessBackend`]
    pub fn headless(config: EditorConfig) -> Result<Self, EngineError> {
        Self::new(config, Box::new(HeadlessBackend::new()), HostSurface::new())
    }

    /// Add an entity of `kind`
    pub fn add_primitive(&mut self, kind: PrimitiveKind) -> EntityId {
        let id = self.scene_manager.add_primitive(kind);
        self.refresh_state();
        id
    }

    /// Remove an entity, deselecting it first
    pub fn remove_object(&mut self, id: &EntityId) -> bool {
        if self.selected.as_ref() == Some(id) {
            self.select(None);
        }
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        let removed = self.scene_manager.remove_object(id);
        if removed {
            self.refresh_state();
        }
        removed
    }

    /// Remove every entity and purge the pool
    pub fn clear(&mut self) -> ClearSummary {
        self.select(None);
        self.hovered = None;
        let summary = self.scene_manager.clear();
        self.refresh_state();
        summary
    }

    /// Replace the scene with `state`
    pub fn load_state(&mut self, state: &SceneState) {
        self.select(None);
        self.hovered = None;
        self.scene_manager.load_state(state);
        self.refresh_state();
    }

    /// Snapshot the live entities
    pub fn export_state(&self) -> SceneState {
        self.scene_manager.export_state()
    }

    /// Snapshot as of the last edit
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Select an entity, or clear the selection with `None`
    ///
    /// Selecting an unknown id clears the selection.
    pub fn select(&mut self, id: Option<EntityId>) {
        if let Some(previous) = self.selected.take() {
            self.scene_manager.set_selected(&previous, false);
        }
        {
            let (scene, _) = self.scene_manager.parts_mut();
            self.gizmo.detach(scene);
        }

        let Some(id) = id.filter(|id| self.scene_manager.contains(id)) else {
            return;
        };
        self.scene_manager.set_selected(&id, true);
        let (scene, _) = self.scene_manager.parts_mut();
        self.gizmo.attach(scene, id.clone());
        self.selected = Some(id);
    }

    /// Currently selected entity
    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    /// Hover an entity, or clear hover with `None`
    pub fn hover(&mut self, id: Option<EntityId>) {
        if let Some(previous) = self.hovered.take() {
            self.scene_manager.set_hovered(&previous, false);
        }
        if let Some(id) = id.filter(|id| self.scene_manager.contains(id)) {
            self.scene_manager.set_hovered(&id, true);
            self.hovered = Some(id);
        }
    }

    /// Apply a gizmo drag to the selected entity
    ///
    /// Returns `false` when nothing is selected.
    pub fn apply_gizmo_transform(&mut self, transform: Transform) -> bool {
        let Some(id) = self.gizmo.attached().cloned() else {
            return false;
        };
        let applied = self.scene_manager.set_transform(&id, transform);
        if applied {
            self.refresh_state();
        }
        applied
    }

    /// Render one frame
    pub fn tick(&mut self) {
        let (scene, backend) = self.scene_manager.parts_mut();
        self.renderer.render(scene, backend);
    }

    /// Backend counters
    pub fn renderer_info(&self) -> RendererInfo {
        self.scene_manager.info()
    }

    /// Write the current scene to `path`
    pub fn save_scene(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        self.export_state().save_to_file(path).map_err(|source| EngineError::SceneFile {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved scene to {}", path.display());
        Ok(())
    }

    /// Replace the scene with the one stored at `path`
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        let state = SceneState::load_from_file(path).map_err(|source| EngineError::SceneFile {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_state(&state);
        Ok(())
    }

    /// Configuration the engine was created with
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Scene manager
    pub fn scene_manager(&self) -> &SceneManager {
        &self.scene_manager
    }

    /// Renderer singleton
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Transform gizmo singleton
    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    /// Host the renderer is attached to
    pub fn host(&self) -> &HostSurface {
        &self.host
    }

    /// Tear everything down: gizmo, then scene, then renderer
    pub fn dispose(self) -> Shutdown {
        let Self { renderer, mut scene_manager, gizmo, mut host, .. } = self;
        log::info!("Disposing engine...");

        let (scene, backend) = scene_manager.parts_mut();
        disposal::dispose_gizmo(gizmo, scene, backend);

        scene_manager.dispose();

        let (_, backend) = scene_manager.parts_mut();
        disposal::dispose_renderer(renderer, backend, &mut host);

        Shutdown {
            host,
            final_info: scene_manager.info(),
            still_tracked: scene_manager.resources().tracker().tracked_len(),
        }
    }

    fn refresh_state(&mut self) {
        self.state = self.scene_manager.export_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RendererConfig;
    use crate::foundation::math::Vec3;

    fn engine() -> Engine {
        Engine::headless(EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = EditorConfig::default();
        config.renderer = RendererConfig::new(0, 10);
        assert!(matches!(Engine::headless(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_select_attaches_gizmo_and_transform_updates_state() {
        let mut engine = engine();
        let id = engine.add_primitive(PrimitiveKind::Box);
        engine.select(Some(id.clone()));
        assert_eq!(engine.gizmo().attached(), Some(&id));

        assert!(engine.apply_gizmo_transform(Transform::from_position(Vec3::new(0.0, 3.0, 0.0))));
        assert_eq!(engine.state().get(&id).unwrap().position, [0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_remove_selected_detaches_gizmo() {
        let mut engine = engine();
        let id = engine.add_primitive(PrimitiveKind::Sphere);
        engine.select(Some(id.clone()));
        engine.remove_object(&id);

        assert!(engine.selected().is_none());
        assert!(engine.gizmo().attached().is_none());
        assert!(!engine.apply_gizmo_transform(Transform::identity()));
        assert!(engine.state().is_empty());
    }

    #[test]
    fn test_select_unknown_clears_selection() {
        let mut engine = engine();
        let id = engine.add_primitive(PrimitiveKind::Box);
        engine.select(Some(id));
        engine.select(Some(EntityId::new("nope")));
        assert!(engine.selected().is_none());
    }

    #[test]
    fn test_tick_draws_gizmo_only_when_selected() {
        let mut engine = engine();
        let id = engine.add_primitive(PrimitiveKind::Box);
        engine.tick();
        assert_eq!(engine.renderer_info().render.calls, 2);

        engine.select(Some(id));
        engine.tick();
        assert_eq!(engine.renderer_info().render.calls, 3);
        assert_eq!(engine.renderer_info().stale_draws, 0);
    }

    #[test]
    fn test_save_and_load_scene() {
        let dir = std::env::temp_dir().join(format!("engine-{}", uuid::Uuid::new_v4()));
        let path = dir.join("scene.ron");

        let mut engine = engine();
        engine.add_primitive(PrimitiveKind::Cylinder);
        engine.add_primitive(PrimitiveKind::Box);
        engine.save_scene(&path).unwrap();
        let saved = engine.export_state();

        engine.clear();
        engine.load_scene(&path).unwrap();
        assert_eq!(engine.export_state(), saved);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_face_map_textures_new_entities() {
        let dir = std::env::temp_dir().join(format!("engine-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("map.png");
        image::RgbaImage::new(4, 4).save(&path).unwrap();

        let mut config = EditorConfig::default();
        config.scene = config.scene.with_face_map(path.to_string_lossy());
        let mut engine = Engine::headless(config).unwrap();
        let id = engine.add_primitive(PrimitiveKind::Sphere);
        assert_eq!(engine.renderer_info().memory.textures, 1);

        engine.remove_object(&id);
        assert_eq!(engine.renderer_info().memory.textures, 0);
        assert_eq!(engine.renderer_info().invalid_releases, 0);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_face_map_is_reported() {
        let config = EditorConfig {
            scene: crate::core::SceneConfig::default().with_face_map("missing/map.png"),
            ..Default::default()
        };
        let err = Engine::headless(config).unwrap_err();
        assert!(matches!(err, EngineError::FaceMap { .. }));
        assert!(err.to_string().contains("missing/map.png"));
    }

    #[test]
    fn test_load_missing_scene_reports_path() {
        let mut engine = engine();
        let err = engine.load_scene("missing/scene.json").unwrap_err();
        assert!(matches!(err, EngineError::SceneFile { .. }));
        assert!(err.to_string().contains("missing/scene.json"));
    }

    #[test]
    fn test_dispose_releases_all_native_state() {
        let mut engine = engine();
        for kind in PrimitiveKind::ALL {
            engine.add_primitive(kind);
        }
        let id = engine.add_primitive(PrimitiveKind::Box);
        engine.select(Some(id));
        engine.tick();

        let shutdown = engine.dispose();
        assert!(shutdown.host.elements().is_empty());
        assert_eq!(shutdown.still_tracked, 0);
        assert_eq!(shutdown.final_info.memory.geometries, 0);
        assert_eq!(shutdown.final_info.memory.textures, 0);
        assert_eq!(shutdown.final_info.programs, 0);
        assert_eq!(shutdown.final_info.invalid_releases, 0);
    }
}
