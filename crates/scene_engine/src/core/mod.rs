//! Core engine configuration

pub mod config;

pub use config::{
    EditorConfig, EngineConfig, LeakTestConfig, PersistenceConfig, RendererConfig, SceneConfig,
};
