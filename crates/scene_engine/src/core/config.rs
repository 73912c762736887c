//! # Unified Configuration System
//!
//! All editor configuration lives here, grouped by subsystem:
//!
//! - **Engine Config**: logging
//! - **Renderer Config**: output surface size, pixel ratio, clear color
//! - **Scene Config**: lighting and primitive styling
//! - **Leak Test Config**: defaults for the leak and clear harness runs
//! - **Persistence Config**: where the scene snapshot is stored
//!
//! Every section has serde support so the whole tree can be loaded from
//! TOML, RON or JSON through [`Config`].

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::scene::PrimitiveKind;

/// # Engine Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.log_level
            .parse::<log::LevelFilter>()
            .map(|_| ())
            .map_err(|_| format!("Unknown log level: {}", self.log_level))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Renderer Configuration
///
/// Output surface parameters for the renderer singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
    /// Device pixel ratio; clamped to [`RendererConfig::MAX_PIXEL_RATIO`]
    pub pixel_ratio: f32,
    /// Clear color as `0xRRGGBB`
    pub clear_color: u32,
}

impl RendererConfig {
    /// Upper bound applied to the device pixel ratio
    pub const MAX_PIXEL_RATIO: f32 = 2.0;

    /// Create a new renderer configuration
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            clear_color: 0x1a1a1a,
        }
    }

    /// Set pixel ratio
    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Pixel ratio after clamping
    pub fn effective_pixel_ratio(&self) -> f32 {
        self.pixel_ratio.clamp(0.5, Self::MAX_PIXEL_RATIO)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("Surface dimensions must be non-zero".to_string());
        }
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err("Pixel ratio must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// # Scene Configuration
///
/// Lighting and per-primitive styling applied by the scene manager and the
/// primitive factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directional light position, also fed to every face material
    pub light_position: [f32; 3],
    /// Ambient light color `0xRRGGBB`
    pub ambient_color: u32,
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Directional light intensity
    pub directional_intensity: f32,
    /// Base color of primitive faces
    pub face_color: u32,
    /// Outline color when idle
    pub edge_color: u32,
    /// Outline color when hovered
    pub edge_hover_color: u32,
    /// Minimum dihedral angle (degrees) for an edge to appear in an outline
    pub outline_threshold_deg: f32,
    /// Optional image applied as the albedo map of every face material
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_map: Option<String>,
}

impl SceneConfig {
    /// Create a new scene configuration
    pub fn new() -> Self {
        Self {
            light_position: [10.0, 10.0, 10.0],
            ambient_color: 0x404040,
            ambient_intensity: 2.0,
            directional_intensity: 2.0,
            face_color: 0x4488ff,
            edge_color: 0xffffff,
            edge_hover_color: 0xffaa00,
            outline_threshold_deg: 1.0,
            face_map: None,
        }
    }

    /// Set the directional light position
    pub fn with_light_position(mut self, position: [f32; 3]) -> Self {
        self.light_position = position;
        self
    }

    /// Set face and outline colors
    pub fn with_colors(mut self, face: u32, edge: u32, edge_hover: u32) -> Self {
        self.face_color = face;
        self.edge_color = edge;
        self.edge_hover_color = edge_hover;
        self
    }

    /// Use the image at `path` as the face albedo map
    pub fn with_face_map(mut self, path: impl Into<String>) -> Self {
        self.face_map = Some(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..180.0).contains(&self.outline_threshold_deg) {
            return Err(format!(
                "Outline threshold must be in [0, 180) degrees, got {}",
                self.outline_threshold_deg
            ));
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Leak Test Configuration
///
/// Defaults for the diagnostic add/remove cycle and the clear test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakTestConfig {
    /// Number of add-then-remove cycles
    pub iterations: usize,
    /// Pause after each add and each remove, in milliseconds
    pub delay_ms: u64,
    /// Primitive kind cycled by the harness
    pub kind: PrimitiveKind,
    /// Early sample index compared for convergence
    pub early_sample: usize,
    /// Late sample index compared for convergence
    pub late_sample: usize,
    /// Number of entities added before a clear test
    pub clear_count: usize,
}

impl LeakTestConfig {
    /// Create a new leak test configuration
    pub fn new() -> Self {
        Self {
            iterations: 200,
            delay_ms: 20,
            kind: PrimitiveKind::Box,
            early_sample: 10,
            late_sample: 190,
            clear_count: 12,
        }
    }

    /// Set iteration count and delay
    pub fn with_iterations(mut self, iterations: usize, delay_ms: u64) -> Self {
        self.iterations = iterations;
        self.delay_ms = delay_ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.early_sample >= self.late_sample {
            return Err("Early sample must precede the late sample".to_string());
        }
        Ok(())
    }
}

impl Default for LeakTestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Persistence Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Scene snapshot path; the extension selects the format
    pub scene_path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            scene_path: "scene.json".to_string(),
        }
    }
}

/// # Complete Editor Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Rendering system configuration
    pub renderer: RendererConfig,
    /// Lighting and primitive styling
    pub scene: SceneConfig,
    /// Leak harness defaults
    pub leak_test: LeakTestConfig,
    /// Scene persistence
    pub persistence: PersistenceConfig,
}

impl EditorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()
            .and_then(|()| self.renderer.validate())
            .and_then(|()| self.scene.validate())
            .and_then(|()| self.leak_test.validate())
            .map_err(ConfigError::Invalid)
    }
}

impl Config for EditorConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        let config = RendererConfig::default().with_pixel_ratio(3.0);
        assert_eq!(config.effective_pixel_ratio(), 2.0);
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let config = EditorConfig {
            engine: EngineConfig::new().with_log_level("loud"),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EditorConfig = toml::from_str("[leak_test]\niterations = 50\n").unwrap();
        assert_eq!(config.leak_test.iterations, 50);
        assert_eq!(config.leak_test.delay_ms, 20);
        assert_eq!(config.scene.face_color, 0x4488ff);
        assert_eq!(config.scene.face_map, None);
    }

    #[test]
    fn test_face_map_from_toml() {
        let config: EditorConfig = toml::from_str("[scene]\nface_map = \"textures/checker.png\"\n").unwrap();
        assert_eq!(config.scene.face_map.as_deref(), Some("textures/checker.png"));
    }
}
