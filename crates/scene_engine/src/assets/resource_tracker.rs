//! Resource Tracker - reference-counted ownership of native allocations
//!
//! **ARCHITECTURE PRINCIPLE**: exactly one code path frees a tracked native
//! handle. Everything that shares a resource registers with [`acquire`] and
//! gives it back with [`release`]; the tracker frees the handle on the
//! transition to zero and forgets the entry in the same step, so a second
//! free through the tracker cannot happen.
//!
//! The tracker knows nothing about scenes or pools. It is keyed by
//! [`ResourceId`], never by contents.
//!
//! ## Untracked releases
//!
//! Releasing a resource the tracker has never seen disposes it immediately,
//! treating the call as the sole reference. This tolerates objects created
//! outside the pooling discipline but would also hide a missing `acquire`,
//! so every such release is counted and logged at `warn` level.
//!
//! [`acquire`]: ResourceTracker::acquire
//! [`release`]: ResourceTracker::release

use std::collections::HashMap;

use crate::assets::Resource;
use crate::render::api::RenderBackend;
use crate::render::resources::ResourceId;

/// Tracker statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Resources currently held by at least one referent
    pub tracked: usize,
    /// Native disposals performed so far
    pub disposals: usize,
    /// Releases of resources that were never acquired
    pub untracked_releases: usize,
}

/// Reference-count registry
#[derive(Debug, Default)]
pub struct ResourceTracker {
    /// Resource -> count; an entry exists only while the count is at least 1
    ref_counts: HashMap<ResourceId, usize>,
    disposals: usize,
    untracked_releases: usize,
}

impl ResourceTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more reference to `resource`
    ///
    /// An unseen resource starts at 1. `None` is a no-op. Returns the input
    /// unchanged so calls can be chained at construction sites.
    pub fn acquire<'a>(&mut self, resource: Option<&'a Resource>) -> Option<&'a Resource> {
        let resource = resource?;
        let count = self.ref_counts.entry(resource.id()).or_insert(0);
        *count += 1;
        log::trace!("acquire {} -> {}", resource, count);
        Some(resource)
    }

    /// Drop one reference to `resource`
    ///
    /// At zero the resource is deep-disposed and forgotten. An untracked
    /// resource is disposed immediately. `None` is a no-op.
    pub fn release(&mut self, backend: &mut dyn RenderBackend, resource: Option<&Resource>) {
        let Some(resource) = resource else {
            return;
        };

        let id = resource.id();
        match self.ref_counts.get(&id).copied() {
            None => {
                self.untracked_releases += 1;
                log::warn!("Releasing untracked {}; disposing it as its only reference", resource);
                self.deep_dispose(backend, resource);
            }
            Some(count) if count > 1 => {
                self.ref_counts.insert(id, count - 1);
                log::trace!("release {} -> {}", resource, count - 1);
            }
            Some(_) => {
                self.ref_counts.remove(&id);
                log::trace!("release {} -> 0", resource);
                self.deep_dispose(backend, resource);
            }
        }
    }

    /// Current count for `id`, zero when untracked
    pub fn ref_count(&self, id: ResourceId) -> usize {
        self.ref_counts.get(&id).copied().unwrap_or(0)
    }

    /// Whether `id` is held by at least one referent
    pub fn is_tracked(&self, id: ResourceId) -> bool {
        self.ref_counts.contains_key(&id)
    }

    /// Number of resources currently tracked
    pub fn tracked_len(&self) -> usize {
        self.ref_counts.len()
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            tracked: self.ref_counts.len(),
            disposals: self.disposals,
            untracked_releases: self.untracked_releases,
        }
    }

    /// Free the native allocation, plus every texture a material owns
    ///
    /// Textures are released once each even when referenced from several
    /// slots or uniforms, or wrongly shared with another material.
    fn deep_dispose(&mut self, backend: &mut dyn RenderBackend, resource: &Resource) {
        if let Resource::Material(material) = resource {
            for texture in material.textures() {
                if texture.release(backend) {
                    log::debug!("Disposed texture {} owned by material {}", texture.id(), material.id());
                }
            }
        }

        log::debug!("Disposing {}", resource);
        match resource {
            Resource::Texture(texture) => {
                texture.release(backend);
            }
            other => backend.release(other.native()),
        }
        self.disposals += 1;
    }
}
