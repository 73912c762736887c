//! GPU-backed resources
//!
//! Every resource carries a process-unique [`ResourceId`] and the
//! [`NativeHandle`](crate::render::api::NativeHandle) it was uploaded as.
//! Identity is the id, never the contents: two uploads of the same data are
//! two resources.

pub mod geometry;
pub mod material;
pub mod outline;
pub mod texture;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use geometry::Geometry;
pub use material::{Color, Material, MaterialParams, TextureSlot, UniformValue};
pub use outline::OutlineGeometry;
pub use texture::Texture;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a resource for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ResourceId::next();
        let b = ResourceId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
