//! Asset management
//!
//! Reference-counted ownership of GPU-backed resources and the per-kind pool
//! built on top of it. [`ResourceContext`] bundles the backend, the tracker
//! and the pool into one explicitly constructed object so that independent
//! scenes never share mutable state.

pub mod resource;
pub mod resource_pool;
pub mod resource_tracker;

pub use resource::Resource;
pub use resource_pool::{PoolStats, PurgeReport, ResourcePool};
pub use resource_tracker::{ResourceTracker, TrackerStats};

use std::rc::Rc;

use crate::render::api::{RenderBackend, RendererInfo};
use crate::render::primitives::GeometryData;
use crate::render::resources::{Geometry, OutlineGeometry};
use crate::scene::PrimitiveKind;

/// Backend, tracker and pool for one scene
pub struct ResourceContext {
    backend: Box<dyn RenderBackend>,
    tracker: ResourceTracker,
    pool: ResourcePool<PrimitiveKind>,
}

impl ResourceContext {
    /// Create a context over `backend`
    pub fn new(backend: Box<dyn RenderBackend>, outline_threshold_deg: f32) -> Self {
        Self {
            backend,
            tracker: ResourceTracker::new(),
            pool: ResourcePool::new(outline_threshold_deg),
        }
    }

    /// The backend
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// The backend, mutably
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// The reference-count registry
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// The geometry pool
    pub fn pool(&self) -> &ResourcePool<PrimitiveKind> {
        &self.pool
    }

    /// Backend counters
    pub fn info(&self) -> RendererInfo {
        self.backend.info()
    }

    /// See [`ResourceTracker::acquire`]
    pub fn acquire(&mut self, resource: Option<&Resource>) {
        self.tracker.acquire(resource);
    }

    /// See [`ResourceTracker::release`]
    pub fn release(&mut self, resource: Option<&Resource>) {
        self.tracker.release(self.backend.as_mut(), resource);
    }

    /// See [`ResourcePool::geometry`]
    pub fn geometry(&mut self, kind: PrimitiveKind, factory: impl FnOnce() -> GeometryData) -> Rc<Geometry> {
        self.pool.geometry(&mut self.tracker, self.backend.as_mut(), kind, factory)
    }

    /// See [`ResourcePool::edge_geometry`]
    pub fn edge_geometry(&mut self, kind: PrimitiveKind, base: &Geometry) -> Rc<OutlineGeometry> {
        self.pool.edge_geometry(&mut self.tracker, self.backend.as_mut(), kind, base)
    }

    /// See [`ResourcePool::purge`]
    pub fn purge(&mut self) -> PurgeReport<PrimitiveKind> {
        self.pool.purge(&mut self.tracker, self.backend.as_mut())
    }
}

impl std::fmt::Debug for ResourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceContext")
            .field("tracker", &self.tracker)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
