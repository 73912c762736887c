//! Resource Pool - one canonical geometry and outline per primitive kind
//!
//! The pool holds a standing reference (the *baseline*) on every resource it
//! caches, independent of any scene entity. Each lookup acquires one more
//! reference on behalf of the caller, who must release it independently.
//!
//! Teardown is two-phase: dispose every entity first, then [`purge`] to drop
//! the baselines. Purging earlier does not free anything still borrowed,
//! since borrowers hold their own counts, but the pool forgets the resource
//! and the next lookup builds a second canonical copy. [`PurgeReport`] lists
//! the kinds for which that happened.
//!
//! [`purge`]: ResourcePool::purge

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use crate::assets::{Resource, ResourceTracker};
use crate::render::api::RenderBackend;
use crate::render::primitives::GeometryData;
use crate::render::resources::{Geometry, OutlineGeometry};

/// Outcome of [`ResourcePool::purge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReport<K> {
    /// Baseline references dropped
    pub released: usize,
    /// Resources actually freed by the purge
    pub disposed: usize,
    /// Kinds whose resources were still borrowed when purged
    pub still_borrowed: Vec<K>,
}

impl<K> Default for PurgeReport<K> {
    fn default() -> Self {
        Self { released: 0, disposed: 0, still_borrowed: Vec::new() }
    }
}

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Cached geometries
    pub geometries: usize,
    /// Cached outlines
    pub outlines: usize,
    /// Times a geometry factory has run
    pub geometry_builds: usize,
    /// Times an outline has been derived
    pub outline_builds: usize,
}

/// Keyed cache of shared geometry
#[derive(Debug)]
pub struct ResourcePool<K> {
    geometries: HashMap<K, Rc<Geometry>>,
    outlines: HashMap<K, Rc<OutlineGeometry>>,
    outline_threshold_deg: f32,
    geometry_builds: usize,
    outline_builds: usize,
}

impl<K> ResourcePool<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Create an empty pool; outlines keep edges sharper than `outline_threshold_deg`
    pub fn new(outline_threshold_deg: f32) -> Self {
        Self {
            geometries: HashMap::new(),
            outlines: HashMap::new(),
            outline_threshold_deg,
            geometry_builds: 0,
            outline_builds: 0,
        }
    }

    /// Canonical geometry for `kind`, acquired once for the caller
    ///
    /// `factory` runs only when `kind` has no cached geometry.
    pub fn geometry(
        &mut self,
        tracker: &mut ResourceTracker,
        backend: &mut dyn RenderBackend,
        kind: K,
        factory: impl FnOnce() -> GeometryData,
    ) -> Rc<Geometry> {
        let geometry = match self.geometries.get(&kind) {
            Some(cached) => {
                log::trace!("Pool hit: geometry {:?}", kind);
                Rc::clone(cached)
            }
            None => {
                log::debug!("Pool miss: building geometry {:?}", kind);
                let geometry = Geometry::upload(backend, format!("{kind:?}"), factory());
                self.geometry_builds += 1;
                tracker.acquire(Some(&Resource::Geometry(Rc::clone(&geometry))));
                self.geometries.insert(kind, Rc::clone(&geometry));
                geometry
            }
        };

        tracker.acquire(Some(&Resource::Geometry(Rc::clone(&geometry))));
        geometry
    }

    /// Canonical outline for `kind`, derived from `base` on first use
    pub fn edge_geometry(
        &mut self,
        tracker: &mut ResourceTracker,
        backend: &mut dyn RenderBackend,
        kind: K,
        base: &Geometry,
    ) -> Rc<OutlineGeometry> {
        let outline = match self.outlines.get(&kind) {
            Some(cached) => {
                log::trace!("Pool hit: outline {:?}", kind);
                Rc::clone(cached)
            }
            None => {
                log::debug!("Pool miss: deriving outline {:?}", kind);
                let outline = OutlineGeometry::from_geometry(backend, base, self.outline_threshold_deg);
                self.outline_builds += 1;
                tracker.acquire(Some(&Resource::OutlineGeometry(Rc::clone(&outline))));
                self.outlines.insert(kind, Rc::clone(&outline));
                outline
            }
        };

        tracker.acquire(Some(&Resource::OutlineGeometry(Rc::clone(&outline))));
        outline
    }

    /// Drop the baseline reference on everything cached and forget it
    pub fn purge(&mut self, tracker: &mut ResourceTracker, backend: &mut dyn RenderBackend) -> PurgeReport<K> {
        let mut report = PurgeReport::default();

        let geometries = self.geometries.drain().map(|(k, g)| (k, Resource::Geometry(g)));
        let outlines = self.outlines.drain().map(|(k, o)| (k, Resource::OutlineGeometry(o)));
        for (kind, resource) in geometries.chain(outlines) {
            tracker.release(backend, Some(&resource));
            report.released += 1;
            if tracker.is_tracked(resource.id()) {
                if !report.still_borrowed.contains(&kind) {
                    report.still_borrowed.push(kind);
                }
            } else {
                report.disposed += 1;
            }
        }

        if report.still_borrowed.is_empty() {
            log::debug!("Pool purged: {} baselines released", report.released);
        } else {
            log::warn!(
                "Pool purged while {:?} still borrowed; those resources stay alive until their borrowers release them",
                report.still_borrowed
            );
        }
        report
    }

    /// Cached geometry for `kind` without acquiring it
    pub fn peek_geometry(&self, kind: K) -> Option<&Rc<Geometry>> {
        self.geometries.get(&kind)
    }

    /// Cached outline for `kind` without acquiring it
    pub fn peek_edge_geometry(&self, kind: K) -> Option<&Rc<OutlineGeometry>> {
        self.outlines.get(&kind)
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty() && self.outlines.is_empty()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            geometries: self.geometries.len(),
            outlines: self.outlines.len(),
            geometry_builds: self.geometry_builds,
            outline_builds: self.outline_builds,
        }
    }
}
