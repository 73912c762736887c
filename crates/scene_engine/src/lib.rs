//! # Scene Engine
//!
//! The resource core of an interactive 3D scene editor: users place, select,
//! transform and delete primitive shapes, and every GPU allocation behind
//! those shapes is pooled, reference counted and released exactly once.
//!
//! ## Features
//!
//! - **Resource Tracking**: reference counts keyed by resource identity, with
//!   native release on the transition to zero
//! - **Resource Pooling**: one canonical geometry and outline per primitive kind
//! - **Scene Lifecycle**: add, remove, clear, load and export through one manager
//! - **Headless Backend**: exact allocation accounting without a device
//! - **Leak Harness**: repeated add/remove cycles with counter sampling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut engine = Engine::headless(EditorConfig::default())?;
//!     let id = engine.add_primitive(PrimitiveKind::Sphere);
//!     engine.tick();
//!     engine.remove_object(&id);
//!     engine.clear();
//!     let shutdown = engine.dispose();
//!     assert_eq!(shutdown.still_tracked, 0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::must_use_candidate
)]

pub mod assets;
pub mod config;
pub mod core;
pub mod debug;
pub mod foundation;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError, Shutdown};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{Resource, ResourceContext, ResourcePool, ResourceTracker},
        config::{Config, ConfigError},
        core::EditorConfig,
        debug::{run_clear_test, run_leak_cycle, ClearReport, LeakReport},
        foundation::math::{Transform, Vec3},
        render::{HeadlessBackend, HostSurface, RenderBackend, RendererInfo},
        scene::{EntityId, PrimitiveKind, SceneManager, SceneState},
        Engine, EngineError, Shutdown,
    };
}
