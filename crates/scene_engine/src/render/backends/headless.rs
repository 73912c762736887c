//! Headless render backend
//!
//! Implements [`RenderBackend`] without a device. Allocations live in a slot
//! map so a released handle can never alias a later allocation: the slot's
//! version changes on removal, and any lookup through the old handle misses.
//! That makes double releases and draws through freed handles observable as
//! counters instead of undefined behaviour.

use std::collections::HashMap;

use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use crate::render::api::{
    DrawCall, MemoryInfo, NativeHandle, ProgramKey, RenderBackend, RenderInfo, RendererInfo,
    TextureDesc, Topology,
};
use crate::render::primitives::GeometryData;

/// What a live slot holds
#[derive(Debug, Clone)]
enum Allocation {
    Geometry { triangles: u32 },
    Lines { segments: u32 },
    Texture { bytes: usize },
    Material { program: ProgramKey },
}

/// Device-less backend with exact allocation accounting
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    allocations: SlotMap<DefaultKey, Allocation>,
    /// Live material count per program
    program_users: HashMap<ProgramKey, usize>,
    render: RenderInfo,
    invalid_releases: usize,
    stale_draws: usize,
    context_lost: bool,
    disposed: bool,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a handle still refers to a live allocation
    pub fn is_live(&self, handle: NativeHandle) -> bool {
        self.allocations.contains_key(Self::key(handle))
    }

    /// Number of live allocations of any kind
    pub fn live_allocations(&self) -> usize {
        self.allocations.len()
    }

    /// Whether [`RenderBackend::dispose`] has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn key(handle: NativeHandle) -> DefaultKey {
        KeyData::from_ffi(handle.0).into()
    }

    fn insert(&mut self, allocation: Allocation) -> NativeHandle {
        let key = self.allocations.insert(allocation);
        NativeHandle(key.data().as_ffi())
    }

    fn count(&self, predicate: impl Fn(&Allocation) -> bool) -> usize {
        self.allocations.values().filter(|a| predicate(*a)).count()
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_geometry(&mut self, data: &GeometryData) -> NativeHandle {
        let triangles = data.triangle_count() as u32;
        let handle = self.insert(Allocation::Geometry { triangles });
        log::trace!("Allocated geometry {:?} ({} triangles)", handle, triangles);
        handle
    }

    fn create_line_geometry(&mut self, positions: &[[f32; 3]]) -> NativeHandle {
        let segments = (positions.len() / 2) as u32;
        let handle = self.insert(Allocation::Lines { segments });
        log::trace!("Allocated line buffer {:?} ({} segments)", handle, segments);
        handle
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> NativeHandle {
        let handle = self.insert(Allocation::Texture { bytes: desc.byte_size() });
        log::trace!("Allocated texture {:?} ({}x{})", handle, desc.width, desc.height);
        handle
    }

    fn create_material(&mut self, program: ProgramKey) -> NativeHandle {
        let users = self.program_users.entry(program).or_insert(0);
        if *users == 0 {
            log::debug!("Compiling program {:?}", program);
        }
        *users += 1;
        self.insert(Allocation::Material { program })
    }

    fn release(&mut self, handle: NativeHandle) {
        match self.allocations.remove(Self::key(handle)) {
            Some(Allocation::Material { program }) => {
                if let Some(users) = self.program_users.get_mut(&program) {
                    *users = users.saturating_sub(1);
                    if *users == 0 {
                        self.program_users.remove(&program);
                        log::debug!("Program {:?} no longer in use", program);
                    }
                }
            }
            Some(Allocation::Texture { bytes }) => {
                log::trace!("Freed texture {:?} ({} bytes)", handle, bytes);
            }
            Some(_) => {
                log::trace!("Freed buffer {:?}", handle);
            }
            None => {
                self.invalid_releases += 1;
                log::error!("Release of handle {:?} that is not live", handle);
            }
        }
    }

    fn begin_frame(&mut self) {
        self.render.calls = 0;
        self.render.triangles = 0;
        self.render.lines = 0;
    }

    fn draw(&mut self, call: DrawCall) {
        let geometry_live = self.allocations.contains_key(Self::key(call.geometry));
        let material_live = self.allocations.contains_key(Self::key(call.material));
        if !(geometry_live && material_live) {
            self.stale_draws += 1;
            log::error!("Draw through freed handle {:?} / {:?}", call.geometry, call.material);
            return;
        }

        self.render.calls += 1;
        match call.topology {
            Topology::Triangles(n) => self.render.triangles += n as usize,
            Topology::Lines(n) => self.render.lines += n as usize,
        }
    }

    fn end_frame(&mut self) {
        self.render.frame += 1;
    }

    fn info(&self) -> RendererInfo {
        RendererInfo {
            memory: MemoryInfo {
                geometries: self.count(|a| matches!(a, Allocation::Geometry { .. } | Allocation::Lines { .. })),
                textures: self.count(|a| matches!(a, Allocation::Texture { .. })),
            },
            programs: self.program_users.len(),
            render: self.render,
            invalid_releases: self.invalid_releases,
            stale_draws: self.stale_draws,
        }
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.render = RenderInfo { frame: self.render.frame, ..RenderInfo::default() };
        log::info!("Headless backend disposed ({} allocations still live)", self.allocations.len());
    }

    fn lose_context(&mut self) {
        self.context_lost = true;
        self.program_users.clear();
        log::info!("Graphics context lost");
    }

    fn is_context_lost(&self) -> bool {
        self.context_lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::box_geometry;

    #[test]
    fn test_allocation_counters() {
        let mut backend = HeadlessBackend::new();
        let geometry = backend.create_geometry(&box_geometry(1.0, 1.0, 1.0));
        let lines = backend.create_line_geometry(&[[0.0; 3], [1.0, 0.0, 0.0]]);
        let texture = backend.create_texture(&TextureDesc::rgba8(4, 4));

        let info = backend.info();
        assert_eq!(info.memory.geometries, 2);
        assert_eq!(info.memory.textures, 1);

        backend.release(geometry);
        backend.release(lines);
        backend.release(texture);
        assert_eq!(backend.info().memory, MemoryInfo::default());
        assert_eq!(backend.live_allocations(), 0);
    }

    #[test]
    fn test_double_release_is_counted() {
        let mut backend = HeadlessBackend::new();
        let texture = backend.create_texture(&TextureDesc::rgba8(1, 1));
        backend.release(texture);
        backend.release(texture);
        assert_eq!(backend.info().invalid_releases, 1);
    }

    #[test]
    fn test_released_handle_does_not_alias_new_allocation() {
        let mut backend = HeadlessBackend::new();
        let first = backend.create_texture(&TextureDesc::rgba8(1, 1));
        backend.release(first);
        let second = backend.create_texture(&TextureDesc::rgba8(1, 1));
        assert_ne!(first, second);
        assert!(!backend.is_live(first));
        assert!(backend.is_live(second));
    }

    #[test]
    fn test_programs_shared_per_key() {
        let mut backend = HeadlessBackend::new();
        let a = backend.create_material(ProgramKey::Face);
        let b = backend.create_material(ProgramKey::Face);
        let c = backend.create_material(ProgramKey::LineBasic);
        assert_eq!(backend.info().programs, 2);

        backend.release(a);
        assert_eq!(backend.info().programs, 2);
        backend.release(b);
        backend.release(c);
        assert_eq!(backend.info().programs, 0);
    }

    #[test]
    fn test_frame_statistics_and_stale_draws() {
        let mut backend = HeadlessBackend::new();
        let geometry = backend.create_geometry(&box_geometry(1.0, 1.0, 1.0));
        let material = backend.create_material(ProgramKey::Face);

        backend.begin_frame();
        backend.draw(DrawCall { geometry, material, topology: Topology::Triangles(12) });
        backend.end_frame();
        let info = backend.info();
        assert_eq!(info.render.calls, 1);
        assert_eq!(info.render.triangles, 12);
        assert_eq!(info.render.frame, 1);

        backend.release(geometry);
        backend.begin_frame();
        backend.draw(DrawCall { geometry, material, topology: Topology::Triangles(12) });
        backend.end_frame();
        let info = backend.info();
        assert_eq!(info.render.calls, 0);
        assert_eq!(info.stale_draws, 1);
    }

    #[test]
    fn test_lose_context_drops_programs() {
        let mut backend = HeadlessBackend::new();
        let _material = backend.create_material(ProgramKey::Face);
        backend.lose_context();
        assert!(backend.is_context_lost());
        assert_eq!(backend.info().programs, 0);
    }
}
