//! Rendering collaborator
//!
//! The resource layer only sees the [`RenderBackend`] trait. This module
//! holds that trait, the headless backend, geometry generation, the resource
//! types that wrap native handles, and the renderer singleton.

pub mod api;
pub mod backends;
pub mod primitives;
pub mod renderer;
pub mod resources;

pub use api::{NativeHandle, ProgramKey, RenderBackend, RendererInfo};
pub use backends::HeadlessBackend;
pub use renderer::{HostSurface, OutputSurface, Renderer};
pub use resources::{Color, Geometry, Material, OutlineGeometry, ResourceId, Texture};
