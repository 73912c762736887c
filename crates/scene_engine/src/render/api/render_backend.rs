//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait that rendering backends must implement so the
//! resource layer can allocate and free native objects without knowing which
//! device sits underneath.
//!
//! # Handle Discipline
//!
//! Every `create_*` call hands back a [`NativeHandle`]. The caller owns it and
//! must pass it to [`RenderBackend::release`] exactly once. Releasing a handle
//! twice is undefined on a real device; only the resource tracker is allowed to
//! call `release` for pooled resources, which is what keeps that count at one.

use serde::{Deserialize, Serialize};

use crate::render::primitives::GeometryData;

/// Opaque handle to a native allocation owned by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub u64);

/// Shader program families
///
/// Programs are shared between all materials of the same family and are
/// compiled lazily by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramKey {
    /// Lit face shader used by primitive meshes
    Face,
    /// Unlit line shader used by outlines
    LineBasic,
}

/// Pixel formats understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA
    Rgba8,
    /// 8-bit single channel
    R8,
}

impl TextureFormat {
    /// Bytes per texel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::R8 => 1,
        }
    }
}

/// Texture creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
}

impl TextureDesc {
    /// Create an RGBA8 texture description
    pub fn rgba8(width: u32, height: u32) -> Self {
        Self { width, height, format: TextureFormat::Rgba8 }
    }

    /// Size of the texel payload in bytes
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Primitive topology of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Indexed triangle list; payload is the triangle count
    Triangles(u32),
    /// Line segment list; payload is the segment count
    Lines(u32),
}

/// A single draw submitted to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Geometry or line buffer to draw
    pub geometry: NativeHandle,
    /// Material bound for the draw
    pub material: NativeHandle,
    /// Topology and element count
    pub topology: Topology,
}

/// Live allocation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Allocated geometry and line buffers
    pub geometries: usize,
    /// Allocated textures
    pub textures: usize,
}

/// Per-frame draw statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderInfo {
    /// Draw calls issued in the last frame
    pub calls: usize,
    /// Triangles submitted in the last frame
    pub triangles: usize,
    /// Line segments submitted in the last frame
    pub lines: usize,
    /// Frames completed since creation
    pub frame: u64,
}

/// Snapshot of the backend counters, used for observation only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererInfo {
    /// Live allocations
    pub memory: MemoryInfo,
    /// Programs in use by at least one live material
    pub programs: usize,
    /// Last frame statistics
    pub render: RenderInfo,
    /// Releases of handles that were not live
    pub invalid_releases: usize,
    /// Draws that referenced a freed handle
    pub stale_draws: usize,
}

/// Main rendering backend trait
///
/// The resource layer talks to the device only through this trait. A headless
/// implementation lives in [`crate::render::backends`].
pub trait RenderBackend {
    /// Upload an indexed triangle geometry
    fn create_geometry(&mut self, data: &GeometryData) -> NativeHandle;

    /// Upload a line segment buffer; `positions` holds two points per segment
    fn create_line_geometry(&mut self, positions: &[[f32; 3]]) -> NativeHandle;

    /// Allocate a texture
    fn create_texture(&mut self, desc: &TextureDesc) -> NativeHandle;

    /// Allocate a material bound to a shared program
    fn create_material(&mut self, program: ProgramKey) -> NativeHandle;

    /// Free a native allocation
    fn release(&mut self, handle: NativeHandle);

    /// Start a frame; resets the per-frame statistics
    fn begin_frame(&mut self);

    /// Record a draw in the current frame
    fn draw(&mut self, call: DrawCall);

    /// Finish the current frame
    fn end_frame(&mut self);

    /// Current counters
    fn info(&self) -> RendererInfo;

    /// Drop internal render lists and caches held for the output surface
    fn dispose(&mut self);

    /// Force the graphics context to drop driver-level state
    fn lose_context(&mut self);

    /// Whether [`RenderBackend::lose_context`] has been called
    fn is_context_lost(&self) -> bool;
}
