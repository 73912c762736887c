//! Public rendering API
//!
//! The backend trait plus the plain data types that cross it.

pub mod render_backend;

pub use render_backend::{
    DrawCall, MemoryInfo, NativeHandle, ProgramKey, RenderBackend, RenderInfo, RendererInfo,
    TextureDesc, TextureFormat, Topology,
};
